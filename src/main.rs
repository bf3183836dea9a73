use folio::{
    cleanup,
    config::{self, Config},
    constants::{FOLIO_EMOJI, SMTP_VERIFY_TIMEOUT_SECS},
    mailer::SmtpMailer,
    rate_limit::SystemClock,
    router, AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env first so RUST_LOG from it reaches the filter
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(config::log_filter("folio=debug,tower_http=debug,axum=trace"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration; refuse to serve on anything missing
    let config = Config::from_env().map_err(|e| {
        tracing::error!("❌ {}", e);
        e
    })?;

    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);

    // Check the relay in the background; the listener does not wait on it
    let checker = mailer.clone();
    let smtp_host = config.smtp.host.clone();
    tokio::spawn(async move {
        match checker.verify_within(Duration::from_secs(SMTP_VERIFY_TIMEOUT_SECS)).await {
            Ok(true) => tracing::info!("✉️  SMTP server {} reachable", smtp_host),
            Ok(false) => tracing::warn!("SMTP server {} refused the handshake", smtp_host),
            Err(e) => tracing::warn!("SMTP check failed: {}", e),
        }
    });

    // Store port before moving config
    let port = config.port;
    let environment = config.environment.clone();

    let state = Arc::new(AppState::new(config, mailer, Arc::new(SystemClock)));

    // Start background sweep of rate limit windows
    tokio::spawn(cleanup::start_sweep_task(state.limiter.clone()));

    let app = router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("{} folio ({}) listening on {}", FOLIO_EMOJI, environment, addr);
    tracing::info!("📖 API docs available at http://{}/docs", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
