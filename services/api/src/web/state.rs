//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use crate::config::Config;
use resume_coach_core::ports::{AnalysisService, CoachingService, SessionStore};

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SessionStore>,
    pub analyzer: Arc<dyn AnalysisService>,
    pub coach: Arc<dyn CoachingService>,
    pub config: Arc<Config>,
}
