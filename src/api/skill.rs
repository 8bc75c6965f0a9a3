//! Voice platform webhook

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};

use super::ApiState;
use crate::skill::{SkillRequest, SkillResponse};

/// Answer one voice turn
async fn skill(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SkillRequest>,
) -> Json<SkillResponse> {
    Json(state.handler.handle(&request).await)
}

/// Build the skill router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/skill", post(skill)).with_state(state)
}
