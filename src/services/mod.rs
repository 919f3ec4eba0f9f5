/// Application and appeal submission and review.
pub mod application_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Mini-game session lifecycle and timers.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Second-factor unlock of the admin panel.
pub mod panel_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Backend connection supervisor toggling degraded mode.
pub mod storage_supervisor;
