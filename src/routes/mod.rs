use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod applications;
pub mod docs;
pub mod games;
pub mod health;
pub mod panel;
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router())
        .merge(applications::router())
        .merge(panel::router(state.clone()))
        .merge(admin::router(state.clone()))
        .merge(sse::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
