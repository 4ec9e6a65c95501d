//! services/planner/src/web/state.rs
//!
//! Defines the application state shared by every handler.

use crate::web::session::SessionController;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionController,
}
