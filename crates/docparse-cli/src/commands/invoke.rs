//! Invoke command - run the function once and print its response.

use super::{build_handler, GlobalOpts};
use anyhow::{Context, Result};
use docparse_core::{ErrorKind, HandlerResponse, ParseRequest};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::time::Duration;
use tokio::runtime::Runtime;

pub fn run(
    opts: &GlobalOpts,
    file_id: Option<String>,
    user_id: Option<String>,
    body: Option<String>,
    quiet: bool,
) -> Result<bool> {
    let payload = request_body(file_id, user_id, body)?;

    let response = match build_handler(opts) {
        Ok(handler) => {
            let rt = Runtime::new().context("Failed to create async runtime")?;
            let spinner = (!quiet).then(spinner);
            let response = rt.block_on(handler.handle_json(&payload));
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }
            response
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            HandlerResponse::failure(ErrorKind::ConfigurationMissing, format!("{:#}", e))
        }
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.success)
}

/// The JSON request: built from flags, given verbatim, or read from stdin.
fn request_body(file_id: Option<String>, user_id: Option<String>, body: Option<String>) -> Result<Vec<u8>> {
    if let Some(body) = body {
        return Ok(body.into_bytes());
    }

    match (file_id, user_id) {
        (Some(file_id), Some(user_id)) => Ok(serde_json::to_vec(&ParseRequest::new(file_id, user_id))?),
        (None, None) => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read request from stdin")?;
            Ok(buffer)
        }
        _ => anyhow::bail!("--file-id and --user-id must be given together"),
    }
}

fn spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Parsing document...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_from_flags() {
        let body = request_body(Some("f1".into()), Some("u1".into()), None).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({"fileId": "f1", "userId": "u1"}));
    }

    #[test]
    fn test_verbatim_body_wins() {
        let body = request_body(Some("f1".into()), None, Some("{}".into())).unwrap();
        assert_eq!(body, b"{}");
    }

    #[test]
    fn test_partial_flags_rejected() {
        assert!(request_body(Some("f1".into()), None, None).is_err());
    }
}
