use anyhow::Context;
use clap::Parser;
use model_manager::ModelManager;
use tokio::net::TcpListener;
use tracing::info;

use tts_server::cli::Args;
use tts_server::config::ServerConfig;
use tts_server::resolve::resolve_model;
use tts_server::routes::{create_router, with_middleware};
use tts_server::{AppState, Settings, TtsService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    async_main(args).await
}

async fn async_main(args: Args) -> anyhow::Result<()> {
    let config = ServerConfig::from_env(args.port);

    let manager = ModelManager::new(&config.models_file, config.model_cache_dir.clone())
        .with_context(|| format!("cannot open model catalog {}", config.models_file.display()))?;

    if args.list_models {
        manager.print_models();
        return Ok(());
    }

    let resolved = resolve_model(&args, &manager).await?;

    info!("Loading TTS model...");
    let spec = resolved.engine_spec(args.use_cuda);
    let (engine, capabilities) = tokio::task::spawn_blocking(move || tts_core::PiperEngine::load(&spec))
        .await
        .context("model loading task failed")??;

    let service = TtsService::new(Box::new(engine), capabilities, resolved.model_dir());
    let state = AppState::new(service, Settings { args, resolved });

    let app = with_middleware(create_router(state), &config);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!("Failed to bind {addr}: {e}. Try a different --port.")
    })?;

    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
