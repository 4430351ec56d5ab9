//! Interactive console: type commands, read replies. Same core as the server.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use friday::services::hub::HubClient;
use friday::{logging, Assistant, Config};

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let _log_guard = logging::init(config.log_dir.as_deref());
    logging::version_banner();

    let hub = HubClient::new(&config.hub_url, &config.hub_token, config.hub_timeout)
        .context("building hub client")?;
    let mut assistant = Assistant::with_hub(&config, Arc::new(hub));

    println!("Type a command ('sair' to quit).");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("sair") {
            break;
        }

        let outcome = assistant.process(text);
        writeln!(stdout, "[{}.{}] {}", outcome.domain, outcome.intent, outcome.response.message)?;
        stdout.flush()?;
    }

    tracing::info!("Console closed.");
    Ok(())
}
