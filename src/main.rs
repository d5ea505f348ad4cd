use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod relay;
mod server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // First argument selects the config file (without extension)
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    // Build the Tokio runtime, sizing worker threads from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;
    let listener = server::create_listener(addr)?;
    let state = Arc::new(config::AppState::new(&cfg)?);

    if !cfg.site.index_path().is_file() {
        logger::log_warning(&format!(
            "Entry document '{}' not found, / will answer 404",
            cfg.site.index_path().display()
        ));
    }

    logger::log_server_start(&addr, &cfg);
    logger::log_info(&format!("Chat relay endpoint: POST {}", handler::router::CHAT_PATH));

    server::run(listener, state, server::signal::shutdown_signal()).await;
    Ok(())
}
