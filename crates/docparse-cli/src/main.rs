//! Docparse CLI - Run the document parsing function locally or as a server.

mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::GlobalOpts;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Docparse - Parse stored documents into Markdown or spreadsheets
#[derive(Parser)]
#[command(name = "docparse")]
#[command(author = "Lalo Morales <lalomorales22@github.com>")]
#[command(version)]
#[command(about = "Parse stored documents into Markdown or spreadsheets", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the platform config directory)
    #[arg(short, long, global = true, env = "DOCPARSE_CONFIG")]
    config: Option<String>,

    /// Store results in this SQLite file instead of the Appwrite database
    #[arg(long, global = true, env = "DOCPARSE_SQLITE")]
    sqlite: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the function once and print the JSON response
    Invoke {
        /// Storage file ID
        #[arg(short, long)]
        file_id: Option<String>,

        /// Owner of the result
        #[arg(short, long)]
        user_id: Option<String>,

        /// Raw JSON request body (read from stdin when no flags are given)
        #[arg(short, long, conflicts_with_all = ["file_id", "user_id"])]
        body: Option<String>,

        /// Hide the progress spinner
        #[arg(short, long)]
        quiet: bool,
    },

    /// Serve the function over HTTP (POST /)
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = "0.0.0.0:3000", env = "DOCPARSE_ADDR")]
        addr: String,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Inspect results stored in the local SQLite store
    #[command(subcommand)]
    Records(RecordsCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a template config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration and show the effective values
    Check,
}

#[derive(Subcommand)]
enum RecordsCommands {
    /// List stored results
    List {
        /// Only show results for this user
        #[arg(short, long)]
        user: Option<String>,

        /// Maximum number of records to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Show one result
    Show {
        /// Record ID (or unique prefix)
        id: String,

        /// Write the stored workbook to this file
        #[arg(long)]
        xlsx: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docparse=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docparse=info,warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let opts = GlobalOpts {
        config: cli.config,
        sqlite: cli.sqlite,
    };

    let result = match cli.command {
        Commands::Invoke {
            file_id,
            user_id,
            body,
            quiet,
        } => commands::invoke::run(&opts, file_id, user_id, body, quiet).map(|ok| {
            if !ok {
                std::process::exit(1);
            }
        }),
        Commands::Serve { addr } => commands::serve::run(&opts, &addr),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Init { force } => commands::config::init(&opts, force),
            ConfigCommands::Check => commands::config::check(&opts),
        },
        Commands::Records(cmd) => match cmd {
            RecordsCommands::List { user, limit } => commands::records::list(&opts, user, limit),
            RecordsCommands::Show { id, xlsx } => commands::records::show(&opts, &id, xlsx),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
