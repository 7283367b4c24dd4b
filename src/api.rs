//! HTTP surface for boot parameter resolution
//!
//! - `GET /ping` returns `{"ok": true}`
//! - `GET /bootparams/{mac}` returns the merged boot parameters
//!
//! Resolution failures are upstream failures and map to 502 with the
//! failing stage in the body.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use booter_bootparams::{BootParamsError, BootParamsResolver};
use serde_json::json;
use tracing::error;

/// Build the router around a resolver
pub fn api_router(resolver: BootParamsResolver) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/bootparams/{mac}", get(get_boot_params))
        .with_state(resolver)
}

async fn ping() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn get_boot_params(
    State(resolver): State<BootParamsResolver>,
    Path(mac): Path<String>,
) -> Result<Response, ApiError> {
    let params = resolver.resolve_boot_parameters(&mac).await?;
    Ok(Json(params).into_response())
}

/// Resolution failure as an HTTP response
#[derive(Debug)]
pub struct ApiError(BootParamsError);

impl From<BootParamsError> for ApiError {
    fn from(err: BootParamsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let stage = self.0.stage();
        error!(stage = %stage, error = %self.0, "Boot params request failed");
        (
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "error": self.0.to_string(),
                "stage": stage.to_string(),
            })),
        )
            .into_response()
    }
}
