use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use triviad::{audit::AuditLog, config::Config, questions::QuestionBank, state::SessionState, ws};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "triviad=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting triviad...");

    let config = Config::from_env();

    let bank =
        match QuestionBank::load(&config.questions_csv, &config.bank_filter(), &config.points_name) {
            Ok(bank) => bank,
            Err(error) => {
                tracing::error!(%error, path = %config.questions_csv.display(), "Could not load questions");
                std::process::exit(1);
            }
        };
    if bank.is_empty() {
        tracing::warn!("Question bank is empty; every request will come up short");
    }

    let audit = match AuditLog::open(&config.history_log, &config.submission_log) {
        Ok(audit) => audit,
        Err(error) => {
            tracing::error!(%error, "Could not open audit logs");
            std::process::exit(1);
        }
    };

    let port = config.port;
    let state = Arc::new(SessionState::new(config, bank, audit));

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
