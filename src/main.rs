use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use opentelemetry::KeyValue;
use opentelemetry_sdk::{trace as sdktrace, Resource};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notebridge::telegram::TelegramClient;
use notebridge::translate::deepl::DeepLTranslator;
use notebridge::translate::Translator;
use notebridge::{api, cli, config, jobs, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env files may carry RUST_LOG and the OTLP endpoint.
    config::load_env_files();

    // OTLP export is opt-in: without an endpoint we only log to stdout.
    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "notebridge"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "notebridge=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(config::load()?, port).await,
        Some(cli::Commands::Translate { to, text }) => translate_once(&to, &text).await,
        None => {
            let port = std::env::var("NOTEBRIDGE_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(cli::DEFAULT_PORT);
            run_server(config::load()?, port).await
        }
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: config::Config, port: u16) -> anyhow::Result<()> {
    tracing::info!(config = ?cfg, "Starting notebridge");

    let telegram = Arc::new(TelegramClient::new(
        &cfg.telegram_api_url,
        &cfg.telegram_bot_token,
    )?);

    tracing::info!("Checking Telegram bot credentials...");
    let me = telegram
        .get_me()
        .await
        .context("Telegram getMe failed; check TELEGRAM_BOT_TOKEN")?;
    tracing::info!(
        bot_id = me.id,
        bot_username = me.username.as_deref().unwrap_or("unknown"),
        "Connected to Telegram"
    );

    let translator = Arc::new(DeepLTranslator::new(
        &cfg.deepl_api_key,
        cfg.deepl_api_url.as_deref(),
    )?);
    tracing::info!(api_url = translator.api_url(), "DeepL translator ready");

    let state = Arc::new(AppState::new(cfg, translator, telegram.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = jobs::poller::spawn(telegram, state.clone(), shutdown_rx);

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("notebridge listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    shutdown_tx.send(true).ok();
    poller.await.ok();

    Ok(())
}

async fn translate_once(target_language: &str, text: &str) -> anyhow::Result<()> {
    let api_key = std::env::var("DEEPL_API_KEY").context("DEEPL_API_KEY must be set")?;
    let api_url = std::env::var("DEEPL_API_URL").ok();

    let translator = DeepLTranslator::new(&api_key, api_url.as_deref())?;
    let translated = translator.translate(text, target_language).await?;
    println!("{}", translated);
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
