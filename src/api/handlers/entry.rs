//! Entry handler: the "enter" button's backend.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{EnterRequest, EnterResponse, parse_snowflake};
use crate::app_state::AppState;
use crate::domain::{GiveawayEvent, GiveawayId, NotificationSink};
use crate::error::{ErrorResponse, GiveawayError};

/// `POST /giveaways/{id}/entries`: Enter a giveaway.
///
/// Emits an `entry_confirmed` event once the entry is recorded.
///
/// # Errors
///
/// Returns [`GiveawayError::NotActive`] after the giveaway ended and
/// [`GiveawayError::DuplicateEntry`] if the user already entered.
#[utoipa::path(
    post,
    path = "/api/v1/giveaways/{id}/entries",
    tag = "Entries",
    summary = "Enter a giveaway",
    description = "Records one entry per user while the giveaway is active and before its end time.",
    params(
        ("id" = uuid::Uuid, Path, description = "Giveaway UUID"),
    ),
    request_body = EnterRequest,
    responses(
        (status = 201, description = "Entry recorded", body = EnterResponse),
        (status = 400, description = "Invalid user id", body = ErrorResponse),
        (status = 404, description = "Giveaway not found", body = ErrorResponse),
        (status = 409, description = "Giveaway ended or user already entered", body = ErrorResponse),
    )
)]
pub async fn enter_giveaway(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<EnterRequest>,
) -> Result<impl IntoResponse, GiveawayError> {
    let giveaway_id = GiveawayId::from_uuid(id);
    let user_id = parse_snowflake("user_id", &req.user_id)?;

    let entry_count = state
        .entries
        .enter(giveaway_id, user_id, Utc::now())
        .await?;

    state.event_bus.notify(GiveawayEvent::EntryConfirmed {
        giveaway_id,
        user_id,
        entry_count,
    });

    Ok((
        StatusCode::CREATED,
        Json(EnterResponse {
            giveaway_id,
            user_id: user_id.to_string(),
            entry_count,
        }),
    ))
}

/// Entry routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/giveaways/{id}/entries", post(enter_giveaway))
}
