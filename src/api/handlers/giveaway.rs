//! Giveaway handlers: create, list, get, message id, end, reroll, winners.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    ActiveGiveawayDto, CreateGiveawayRequest, EndGiveawayResponse, GiveawayDetailResponse,
    GiveawayDto, GiveawayListResponse, ListActiveParams, RerollResponse, SetMessageRequest,
    WinnerDto, parse_snowflake, snowflakes,
};
use crate::app_state::AppState;
use crate::domain::GiveawayId;
use crate::error::{ErrorResponse, GiveawayError};
use crate::service::{CompletionOutcome, NewGiveaway};

/// `POST /giveaways`: Create a giveaway.
///
/// # Errors
///
/// Returns [`GiveawayError::Validation`] on malformed ids, duration,
/// winner count or prize.
#[utoipa::path(
    post,
    path = "/api/v1/giveaways",
    tag = "Giveaways",
    summary = "Create a giveaway",
    description = "Parses the duration, checks bounds, and stores an active giveaway ending at now + duration.",
    request_body = CreateGiveawayRequest,
    responses(
        (status = 201, description = "Giveaway created", body = GiveawayDto),
        (status = 400, description = "Invalid request", body = ErrorResponse),
    )
)]
pub async fn create_giveaway(
    State(state): State<AppState>,
    Json(req): Json<CreateGiveawayRequest>,
) -> Result<impl IntoResponse, GiveawayError> {
    let request = NewGiveaway {
        guild_id: parse_snowflake("guild_id", &req.guild_id)?,
        channel_id: parse_snowflake("channel_id", &req.channel_id)?,
        creator_id: parse_snowflake("creator_id", &req.creator_id)?,
        prize: req.prize,
        winners: req.winners,
        duration: req.duration,
        requirements: req.requirements,
    };

    let giveaway = state.giveaways.create(request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(GiveawayDto::from(&giveaway))))
}

/// `GET /giveaways?guild_id=`: List a guild's active giveaways.
///
/// # Errors
///
/// Returns [`GiveawayError::Validation`] on a malformed guild id.
#[utoipa::path(
    get,
    path = "/api/v1/giveaways",
    tag = "Giveaways",
    summary = "List active giveaways",
    description = "Returns a guild's active giveaways ordered by end time, each with its entry count.",
    params(ListActiveParams),
    responses(
        (status = 200, description = "Paginated giveaway list", body = GiveawayListResponse),
        (status = 400, description = "Invalid guild id", body = ErrorResponse),
    )
)]
pub async fn list_active(
    State(state): State<AppState>,
    Query(params): Query<ListActiveParams>,
) -> Result<impl IntoResponse, GiveawayError> {
    let guild_id = parse_snowflake("guild_id", &params.guild_id)?;
    let summaries = state.giveaways.list_active(guild_id).await?;

    let (page, pagination) = params.pagination().paginate(summaries);
    Ok(Json(GiveawayListResponse {
        data: page.iter().map(ActiveGiveawayDto::from).collect(),
        pagination,
    }))
}

/// `GET /giveaways/{id}`: Giveaway details with statistics.
///
/// # Errors
///
/// Returns [`GiveawayError::NotFound`] if the giveaway does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/giveaways/{id}",
    tag = "Giveaways",
    summary = "Get giveaway details",
    description = "Returns the giveaway, its entry count, and its current winners.",
    params(
        ("id" = uuid::Uuid, Path, description = "Giveaway UUID"),
    ),
    responses(
        (status = 200, description = "Giveaway details", body = GiveawayDetailResponse),
        (status = 404, description = "Giveaway not found", body = ErrorResponse),
    )
)]
pub async fn get_giveaway(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GiveawayError> {
    let details = state
        .giveaways
        .get_details(GiveawayId::from_uuid(id))
        .await?;
    Ok(Json(GiveawayDetailResponse::from(&details)))
}

/// `PUT /giveaways/{id}/message`: Record the announcement message.
///
/// # Errors
///
/// Returns [`GiveawayError::NotFound`] if the giveaway does not exist.
#[utoipa::path(
    put,
    path = "/api/v1/giveaways/{id}/message",
    tag = "Giveaways",
    summary = "Set announcement message",
    description = "Stores the id of the chat message that renders this giveaway.",
    params(
        ("id" = uuid::Uuid, Path, description = "Giveaway UUID"),
    ),
    request_body = SetMessageRequest,
    responses(
        (status = 204, description = "Message id recorded"),
        (status = 400, description = "Invalid message id", body = ErrorResponse),
        (status = 404, description = "Giveaway not found", body = ErrorResponse),
    )
)]
pub async fn set_message(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<SetMessageRequest>,
) -> Result<impl IntoResponse, GiveawayError> {
    let message_id = parse_snowflake("message_id", &req.message_id)?;
    state
        .giveaways
        .set_message_id(GiveawayId::from_uuid(id), message_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /giveaways/{id}/end`: End a giveaway now.
///
/// # Errors
///
/// Returns [`GiveawayError::NotFound`] if the giveaway does not exist.
#[utoipa::path(
    post,
    path = "/api/v1/giveaways/{id}/end",
    tag = "Giveaways",
    summary = "End a giveaway",
    description = "Completes the giveaway immediately and draws winners. Ending an already completed giveaway is a no-op.",
    params(
        ("id" = uuid::Uuid, Path, description = "Giveaway UUID"),
    ),
    responses(
        (status = 200, description = "Completion result", body = EndGiveawayResponse),
        (status = 404, description = "Giveaway not found", body = ErrorResponse),
    )
)]
pub async fn end_giveaway(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GiveawayError> {
    let giveaway_id = GiveawayId::from_uuid(id);
    let response = match state.completion.complete(giveaway_id, Utc::now()).await? {
        CompletionOutcome::Completed(summary) => EndGiveawayResponse::drawn(&summary),
        CompletionOutcome::AlreadyCompleted => EndGiveawayResponse::already_completed(giveaway_id),
    };
    Ok(Json(response))
}

/// `POST /giveaways/{id}/reroll`: Redraw winners.
///
/// # Errors
///
/// Returns [`GiveawayError::NotCompleted`] for an active giveaway and
/// [`GiveawayError::InsufficientEntries`] when too few entrants remain.
#[utoipa::path(
    post,
    path = "/api/v1/giveaways/{id}/reroll",
    tag = "Giveaways",
    summary = "Reroll winners",
    description = "Replaces the winner set of a completed giveaway with a fresh draw.",
    params(
        ("id" = uuid::Uuid, Path, description = "Giveaway UUID"),
    ),
    responses(
        (status = 200, description = "New winners", body = RerollResponse),
        (status = 404, description = "Giveaway not found", body = ErrorResponse),
        (status = 409, description = "Giveaway still active or too few entries", body = ErrorResponse),
    )
)]
pub async fn reroll_giveaway(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GiveawayError> {
    let giveaway_id = GiveawayId::from_uuid(id);
    let winners = state.reroll.reroll(giveaway_id, Utc::now()).await?;
    Ok(Json(RerollResponse {
        giveaway_id,
        winners: snowflakes(&winners),
    }))
}

/// `GET /giveaways/{id}/winners`: Current winners.
///
/// # Errors
///
/// Returns [`GiveawayError::NotFound`] if the giveaway does not exist.
#[utoipa::path(
    get,
    path = "/api/v1/giveaways/{id}/winners",
    tag = "Giveaways",
    summary = "List winners",
    params(
        ("id" = uuid::Uuid, Path, description = "Giveaway UUID"),
    ),
    responses(
        (status = 200, description = "Winner list", body = Vec<WinnerDto>),
        (status = 404, description = "Giveaway not found", body = ErrorResponse),
    )
)]
pub async fn list_winners(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, GiveawayError> {
    let winners = state
        .giveaways
        .list_winners(GiveawayId::from_uuid(id))
        .await?;
    Ok(Json(winners.iter().map(WinnerDto::from).collect::<Vec<_>>()))
}

/// Giveaway routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/giveaways", post(create_giveaway).get(list_active))
        .route("/giveaways/{id}", get(get_giveaway))
        .route("/giveaways/{id}/message", put(set_message))
        .route("/giveaways/{id}/end", post(end_giveaway))
        .route("/giveaways/{id}/reroll", post(reroll_giveaway))
        .route("/giveaways/{id}/winners", get(list_winners))
}
