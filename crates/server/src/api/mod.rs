use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use shared::{
    error::{ApiError, ErrorCode, GameError},
    protocol::{GameCommand, GameView},
};
use tracing::{error, warn};

use crate::app_state::AppState;

pub(crate) type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::InsufficientData => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::ProviderUnavailable => StatusCode::BAD_GATEWAY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(err: GameError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(err.code());
    if status.is_server_error() {
        error!(%err, "game request failed");
    } else {
        warn!(%err, "game request rejected");
    }
    (status, Json(ApiError::from(err)))
}

/// GET /api/game
pub(crate) async fn get_game(State(state): State<Arc<AppState>>) -> ApiResult<Json<GameView>> {
    state.current_view().await.map(Json).map_err(error_response)
}

/// POST /api/game/events
pub(crate) async fn post_event(
    State(state): State<Arc<AppState>>,
    Json(command): Json<GameCommand>,
) -> ApiResult<Json<GameView>> {
    state.dispatch(command).await.map(Json).map_err(error_response)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
