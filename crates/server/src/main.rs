//! SonoCare Server Entry Point

use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use sonocare_agent::ChatService;
use sonocare_config::{constants, load_settings, Settings};
use sonocare_llm::OpenAIBackend;
use sonocare_pipeline::GeminiTts;
use sonocare_server::{create_router, init_metrics, AppState};
use sonocare_tools::{create_registry, DuckDuckGoSearch};

#[tokio::main]
async fn main() -> sonocare_core::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var(constants::env::ENVIRONMENT).ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            // Tracing not yet initialized
            eprintln!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    init_tracing(&config);

    tracing::info!("Starting SonoCare Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        model = %config.llm.model,
        "Configuration loaded"
    );

    let llm = Arc::new(OpenAIBackend::from_settings(&config.llm)?);
    let search = Arc::new(DuckDuckGoSearch::new(&config.search)?);
    let tools = Arc::new(create_registry(&config, search));
    tracing::info!(tools = ?tools.tool_names(), "Tool registry ready");

    let mut chat = ChatService::from_settings(&config, llm, tools);
    if config.tts.enabled {
        match GeminiTts::new(&config.tts) {
            Ok(tts) => {
                tracing::info!(model = %config.tts.model, voice = %config.tts.voice, "TTS enabled");
                chat = chat.with_tts(Arc::new(tts));
            }
            Err(e) => tracing::warn!(error = %e, "TTS unavailable, continuing without audio"),
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| sonocare_core::Error::Config(format!("Invalid server address: {}", e)))?;

    let mut state = AppState::new(config.clone(), chat);
    if config.observability.metrics_enabled {
        match init_metrics() {
            Ok(handle) => {
                tracing::info!("Initialized Prometheus metrics at /metrics");
                state = state.with_metrics(handle);
            }
            Err(e) => tracing::warn!(error = %e, "Metrics disabled"),
        }
    }

    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("sonocare={},tower_http=debug", level).into()
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
