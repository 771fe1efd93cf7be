//! promptport: line-delimited JSON-RPC 2.0 over stdio
//!
//! Reads one request per line from stdin and writes one response per line to
//! stdout. Logs go to stderr (`RUST_LOG`, default `info`).

use std::io::{self, BufRead, Write};

use env_logger::Env;
use promptport_core::{
    commands,
    config::Config,
    errors::PromptPortError,
    rpc::{router, Response},
    session::Session,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!(
        "Opening profile in {} ({:?} storage)",
        config.data_dir.display(),
        config.storage
    );
    let mut session = Session::open(config)?;
    log::debug!("Commands: {}", commands::list_commands().join(", "));

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    // Raw bytes, so a line that is not UTF-8 gets an error reply instead of
    // ending the loop
    for line in stdin.lock().split(b'\n') {
        let reply = match String::from_utf8(line?) {
            Ok(text) => {
                let text = text.trim_end_matches('\r');
                if text.trim().is_empty() {
                    continue;
                }
                handle_line(&mut session, text)?
            },
            Err(e) => {
                log::warn!("Message is not UTF-8: {}", e);
                Some(serde_json::to_string(&Response::parse_error(format!(
                    "Parse error: {}",
                    e.utf8_error()
                )))?)
            },
        };

        if let Some(reply) = reply {
            writeln!(stdout, "{}", reply)?;
            stdout.flush()?;
        }
    }

    log::info!("stdin closed, shutting down");
    Ok(())
}

fn handle_line(session: &mut Session, text: &str) -> serde_json::Result<Option<String>> {
    match router::handle_text(session, text) {
        Ok(reply) => Ok(reply),
        Err(PromptPortError::SerdeError(e)) => {
            log::warn!("Unparseable message: {}", e);
            serde_json::to_string(&Response::parse_error(format!("Parse error: {}", e))).map(Some)
        },
        Err(e) => {
            // Notifications have no id to answer
            log::warn!("Notification failed [{}]: {}", e.category(), e);
            Ok(None)
        },
    }
}
