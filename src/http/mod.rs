//! Publish API: a Rocket-based SSE telemetry stream and REST control
//! surface, with no authentication or OpenAPI layer since this plant
//! exposes neither.

mod cors;
mod dto;
mod error;
mod routes;
mod sse;

use std::sync::Arc;
use std::time::Duration;

use rocket::figment::Figment;
use rocket::routes;
use rocket::{Build, Rocket};
use tokio::sync::RwLock;

use crate::state::SimState;
use cors::Cors;

pub fn build_rocket(
    figment: Figment,
    state: Arc<RwLock<SimState>>,
    tick_period: Duration,
) -> Rocket<Build> {
    rocket::custom(figment)
        .attach(Cors)
        .manage(state)
        .manage(tick_period)
        .mount(
            "/",
            routes![sse::events, routes::sync, routes::reset_damage],
        )
}
