mod batch;
mod config;
mod document;
mod errors;
mod html_file;
mod params;
mod report;
mod routes;
mod strip;
mod targets;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use axum::{
  Router,
  extract::DefaultBodyLimit,
  http::{header, HeaderValue},
  routing::{get, post},
};
use tower_http::{
  limit::RequestBodyLimitLayer,
  set_header::SetResponseHeaderLayer,
  trace::TraceLayer,
  timeout::TimeoutLayer,
  cors::CorsLayer
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use config::Config;
use routes::*;
use targets::{load_targets, TargetSpecification};

fn init_tracing() {
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("htmlstripper=info,tower_http=info")))
    .with(tracing_subscriber::fmt::layer())
    .init();
}

fn default_targets(config: &Config) -> TargetSpecification {
  match load_targets(&config.targets_path) {
    Ok(targets) => {
      tracing::info!("loaded {} default targets from {}", targets.len(), config.targets_path.display());
      targets
    }
    Err(error) => {
      tracing::warn!("no default targets ({}), requests must supply their own", error);
      TargetSpecification::new()
    }
  }
}

#[tokio::main]
async fn main() {
  init_tracing();
  let config = Config::from_env();
  let targets = default_targets(&config);
  let port = config.port;
  let timeout_secs = config.request_timeout_secs;
  let max_body_bytes = config.max_body_bytes;
  let state = Arc::new(AppState { config, targets });

  let app = Router::new()
    .route("/strip", post(strip_response))
    .route("/strip-dir", post(strip_dir_response))
    .route("/targets", get(targets_response))
    .fallback(handler_404)
    .layer(CorsLayer::permissive())
    .layer(TimeoutLayer::new(Duration::from_secs(timeout_secs)))
    // html bodies routinely exceed the extractor default
    .layer(DefaultBodyLimit::disable())
    .layer(RequestBodyLimitLayer::new(max_body_bytes))
    .layer(TraceLayer::new_for_http())
    .layer(SetResponseHeaderLayer::if_not_present(
      header::SERVER,
      HeaderValue::from_static("rust-axum"),
    ))
    .with_state(state);

  let addr = SocketAddr::from(([127, 0, 0, 1], port));
  tracing::info!("listening on {}", addr);
  if let Err(error) = axum::Server::bind(&addr).serve(app.into_make_service()).await {
    tracing::error!("server error: {}", error);
  }
}
