mod config;
mod protocol;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env();
    let state = state::AppState::new();

    // Optional: evict sessions nobody is playing. Off unless configured.
    if let Some(timeout) = config.idle_session_timeout {
        let _reaper = services::reaper::spawn_reaper(state.clone(), timeout, config.idle_sweep_interval);
    }

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .expect("failed to bind");

    tracing::info!(host = %config.host, port = config.port, "dropfour listening");
    axum::serve(listener, app).await.expect("server failed");
}
