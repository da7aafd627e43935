//! Records commands - inspect the local result store.

use super::{expand_path, open_records_store, GlobalOpts};
use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use colored::Colorize;
use docparse_core::StoredRecord;
use docparse_db::Database;

pub fn list(opts: &GlobalOpts, user: Option<String>, limit: i64) -> Result<()> {
    let db = open_records_store(opts)?;
    list_with_db(&db, user.as_deref(), limit)
}

/// List records from an open store.
pub fn list_with_db(db: &Database, user: Option<&str>, limit: i64) -> Result<()> {
    let records = db.list_records(user, Some(limit))?;

    if records.is_empty() {
        println!(
            "{}",
            "No records found. Run 'docparse --sqlite <path> invoke ...' to store some.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Parse Results".cyan().bold());
    println!("{}", "─".repeat(70));

    for record in &records {
        println!(
            "{} {} {} {}",
            format_kind(record),
            record.result.document_id.white().bold(),
            format!("[{}]", short_id(&record.id)).dimmed(),
            record.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        println!("  user: {}", record.result.user_id.dimmed());
    }

    println!();
    println!("{} of {} records", records.len(), db.count_records()?);
    Ok(())
}

pub fn show(opts: &GlobalOpts, id: &str, xlsx: Option<String>) -> Result<()> {
    let db = open_records_store(opts)?;
    let record = db.find_record_by_prefix(id)?;

    println!("{}", "Parse Result".cyan().bold());
    println!("{}", "─".repeat(50));
    println!("  ID:          {}", record.id);
    println!("  Document:    {}", record.result.document_id);
    println!("  User:        {}", record.result.user_id);
    println!("  Destination: {}/{}", record.database_id, record.collection_id);
    println!("  Created:     {}", record.created_at.to_rfc3339());

    match &record.result.xlsx_output {
        Some(encoded) => {
            let bytes = STANDARD
                .decode(encoded)
                .context("Stored workbook is not valid base64")?;
            println!("  Workbook:    {} bytes", bytes.len());

            if let Some(path) = xlsx {
                let path = expand_path(&path)?;
                std::fs::write(&path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("  {} Wrote workbook to {}", "✓".green(), path.display());
            }
        }
        None => {
            if xlsx.is_some() {
                anyhow::bail!("Record {} has no workbook output", record.id);
            }
            println!();
            println!("{}", record.result.markdown_output);
        }
    }

    Ok(())
}

fn format_kind(record: &StoredRecord) -> String {
    if record.result.xlsx_output.is_some() {
        "xlsx".green().to_string()
    } else {
        "html".blue().to_string()
    }
}

fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}
