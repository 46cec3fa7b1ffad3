use std::path::PathBuf;
use std::sync::Arc;
use serde_json::{json, Value};
use axum::{
  response::IntoResponse,
  http::StatusCode,
  extract::State,
  Json,
};
use tracing::warn;
use crate::batch::strip_directory;
use crate::config::Config;
use crate::document::{DocumentTree, HtmlDocument};
use crate::params::*;
use crate::strip::strip;
use crate::targets::TargetSpecification;

pub struct AppState {
  pub config: Config,
  /// Used whenever a request carries no targets of its own.
  pub targets: TargetSpecification,
}

pub async fn handler_404() -> impl IntoResponse {
  (StatusCode::NOT_FOUND, "nothing to see here")
}

/// Runs the engine over `document` and shapes the outcome for `/strip`.
pub fn strip_result<D: DocumentTree>(document: &mut D, targets: &TargetSpecification) -> Value {
  match strip(document, targets) {
    Ok(report) => json!({
      "valid": true,
      "html": report.result_html,
      "complete": report.all_matched(),
      "matched": report.matched_targets(),
      "unmatched": report.unmatched,
      "summary": report.summary(),
    }),
    Err(error) => {
      warn!("strip request failed: {}", error);
      let unmatched = error.partial_report().map(|report| report.unmatched.clone());
      json!({ "valid": false, "error": error.to_string(), "unmatched": unmatched })
    }
  }
}

pub fn strip_html_result(params: &StripParams, default_targets: &TargetSpecification) -> Value {
  let Some(html) = params.html.as_deref() else {
    return json!({ "valid": false, "error": "html is required" });
  };
  let targets = params.targets.as_ref().unwrap_or(default_targets);
  let mut document = HtmlDocument::parse(html, params.fragment.unwrap_or(true));
  strip_result(&mut document, targets)
}

pub async fn strip_response(State(state): State<Arc<AppState>>, Json(params): Json<StripParams>) -> impl IntoResponse {
  let response = strip_html_result(&params, &state.targets);
  (StatusCode::OK, Json(response))
}

pub async fn strip_dir_response(State(state): State<Arc<AppState>>, Json(params): Json<StripDirParams>) -> impl IntoResponse {
  let mut response = json!({
    "valid": false,
  });
  if let Some(dir) = params.dir {
    let targets = params.targets.unwrap_or_else(|| state.targets.clone());
    let suffix = state.config.output_suffix.clone();
    let dir = PathBuf::from(dir);
    let result = tokio::task::spawn_blocking(move || strip_directory(&dir, &targets, &suffix)).await;
    response = match result {
      Ok(Ok(report)) => json!({ "valid": true, "batch": report }),
      Ok(Err(error)) => json!({ "valid": false, "error": error.to_string() }),
      Err(error) => {
        warn!("batch worker failed: {}", error);
        json!({ "valid": false, "error": "batch worker failed" })
      }
    };
  }
  (StatusCode::OK, Json(response))
}

pub fn targets_result(targets: &TargetSpecification) -> Value {
  json!({
    "valid": true,
    "targets": targets,
    "counts": targets.counts(),
    "count": targets.len(),
  })
}

pub async fn targets_response(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let response = targets_result(&state.targets);
  (StatusCode::OK, Json(response))
}
