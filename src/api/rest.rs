//! REST route table.

use axum::routing::{get, put};
use axum::Router;

use crate::api::handlers::{appointments, profiles};
use crate::server::AppState;

/// API routes, nested under `/api` by the server.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/profiles", get(profiles::list_profiles))
        .route(
            "/v1/profiles/me",
            get(profiles::get_my_profile).patch(profiles::update_my_profile),
        )
        .route("/v1/profiles/:subject_id/role", put(profiles::set_role))
        .route(
            "/v1/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/v1/appointments/:id",
            get(appointments::get_appointment)
                .patch(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
}
