use std::sync::{Arc, Mutex};

use anyhow::Context;
use friday::services::hub::HubClient;
use friday::{logging, server, Assistant, Config};

// The hub client is blocking, so it is built (and dropped) outside the runtime.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let _log_guard = logging::init(config.log_dir.as_deref());
    logging::version_banner();

    let hub = HubClient::new(&config.hub_url, &config.hub_token, config.hub_timeout)
        .context("building hub client")?;
    tracing::info!("Hub: {} | context TTL {:?}", config.hub_url, config.context_ttl);

    let assistant = Arc::new(Mutex::new(Assistant::with_hub(&config, Arc::new(hub))));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    let result = runtime.block_on(server::serve(config.bind, assistant.clone()));

    drop(runtime);
    drop(assistant);
    result
}
