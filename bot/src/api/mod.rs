//! REST APIハンドラー
//!
//! コマンドの受付と最新ステータスの参照

pub mod commands;
pub mod status;

use crate::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use downdetector_common::error::BotError;
use serde_json::json;
use tower_http::trace::TraceLayer;

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(status::get_status))
        .route("/api/commands", post(commands::run_command))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(BotError);

impl From<BotError> for AppError {
    fn from(err: BotError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BotError::UnknownCommand(_) | BotError::NoChannel | BotError::Common(_) => {
                StatusCode::BAD_REQUEST
            }
            BotError::ChannelNotFound(_) => StatusCode::NOT_FOUND,
            BotError::Chat(_) => StatusCode::BAD_GATEWAY,
            BotError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
