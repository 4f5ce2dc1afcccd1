//! ステータス参照API

use crate::AppState;
use axum::{extract::State, Json};
use downdetector_common::types::ProbeResult;
use serde::Serialize;

/// GET /api/status のレスポンス
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// 監視対象URL
    pub target_url: String,
    /// 最新のプローブ結果（未チェックなら `null`）
    pub latest: Option<ProbeResult>,
}

/// GET /api/status - 最新のプローブ結果
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        target_url: state.config.target_url.clone(),
        latest: state.store.read().await,
    })
}
