// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::get,
    Router,
};

use shared_config::AppConfig;

use crate::handlers;
use crate::services::locks::DoctorScheduleLocks;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    // One lock registry per router instance; every booking handler reaches it
    // through the Extension rather than through process-wide state.
    let locks = Arc::new(DoctorScheduleLocks::new());

    Router::new()
        .route(
            "/",
            get(handlers::list_appointments).post(handlers::create_appointment),
        )
        .route(
            "/{appointment_id}",
            get(handlers::get_appointment)
                .patch(handlers::update_appointment)
                .delete(handlers::cancel_appointment),
        )
        .route("/date/{date}", get(handlers::list_appointments_on_date))
        .layer(Extension(locks))
        .with_state(state)
}
