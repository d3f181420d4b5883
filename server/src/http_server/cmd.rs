use std::net::SocketAddr;

use axum::Router;
use color_eyre::{eyre::WrapErr, Result};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{routes, trace::Tracer};
use crate::AppState;

pub(crate) async fn serve() -> Result<()> {
    let app_state = AppState::from_env().await?;

    info!(
        version = app_state.versions.version,
        page_size = app_state.app.page_size,
        "Starting recipes server"
    );

    run_server(routes::make_router().with_state(app_state)).await
}

pub(crate) async fn run_server(routes: Router) -> Result<()> {
    let tracer = Tracer;
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(tracer)
        .on_response(tracer);

    let app = routes.layer(trace_layer);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let port: u16 = port
        .parse()
        .wrap_err_with(|| format!("Invalid PORT {port}"))?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err("Failed to open port")?;

    let addr = listener.local_addr()?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to run server")
}
