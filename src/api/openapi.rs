//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    ActiveGiveawayDto, CreateGiveawayRequest, EndGiveawayResponse, EnterRequest, EnterResponse,
    GiveawayDetailResponse, GiveawayDto, GiveawayListResponse, PaginationMeta, RerollResponse,
    SetMessageRequest, WinnerDto,
};
use super::handlers;
use crate::domain::{GiveawayId, GiveawayStatus};
use crate::error::{ErrorBody, ErrorResponse};

/// Generated OpenAPI specification, served at `/api-docs/openapi.json`
/// when the `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "giveaway-gateway",
        description = "Time-boxed giveaways: entries, expiry sweeps, winner draws and rerolls."
    ),
    paths(
        handlers::giveaway::create_giveaway,
        handlers::giveaway::list_active,
        handlers::giveaway::get_giveaway,
        handlers::giveaway::set_message,
        handlers::giveaway::end_giveaway,
        handlers::giveaway::reroll_giveaway,
        handlers::giveaway::list_winners,
        handlers::entry::enter_giveaway,
        handlers::system::health_handler,
    ),
    components(schemas(
        GiveawayId,
        GiveawayStatus,
        CreateGiveawayRequest,
        GiveawayDto,
        GiveawayDetailResponse,
        ActiveGiveawayDto,
        GiveawayListResponse,
        PaginationMeta,
        SetMessageRequest,
        EndGiveawayResponse,
        RerollResponse,
        WinnerDto,
        EnterRequest,
        EnterResponse,
        ErrorResponse,
        ErrorBody,
        handlers::system::HealthResponse,
    )),
    tags(
        (name = "Giveaways", description = "Giveaway lifecycle"),
        (name = "Entries", description = "User participation"),
        (name = "System", description = "Health"),
    )
)]
pub struct ApiDoc;
