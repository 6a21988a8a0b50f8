use assetd::cli::Cli;
use assetd::config::{AppState, Config};
use assetd::handler::StaticServer;
use assetd::{backend, logger, server};
use clap::Parser;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut cfg = Config::load_from(cli.config.as_deref())?;
    cli.apply(&mut cfg);

    let Some(source) = cfg.assets.source.clone() else {
        Cli::missing_source().exit();
    };
    let backend = match backend::from_source(&source) {
        Ok(backend) => backend,
        Err(e) => Cli::setup_error(e).exit(),
    };
    let static_server = StaticServer::from_backend(backend)
        .with_index_file(cfg.assets.index_file.clone())
        .with_diagnostics(cfg.logging.diagnostics);

    logger::init(&cfg)?;

    // Worker thread count follows server.workers, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, static_server))
}

async fn async_main(
    cfg: Config,
    static_server: StaticServer,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    let state = Arc::new(AppState::new(cfg, static_server));
    server::start_server_loop(listener, state, signals).await;
    Ok(())
}
