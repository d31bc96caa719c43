//! A deterministic training-prescription engine: given a user profile, a
//! training plan, a history of completed sessions, and a readiness score,
//! produces a fully set-by-set session prescription, and folds a logged
//! session back into per-lift state. Every public entry point is a pure
//! function of its inputs -- no wall-clock, no I/O, no global mutable
//! state -- so identical inputs always yield byte-identical outputs.

pub mod calendar;
pub mod config;
pub mod deload;
pub mod direction;
pub mod error;
pub mod insession;
pub mod insights;
pub mod logging;
pub mod model;
pub mod planner;
pub mod progression;
pub mod scheduler;
pub mod state_update;
pub mod substitution;
pub mod value;

pub use calendar::{Calendar, GregorianCalendar};
pub use error::{EngineError, Result};
pub use insession::adjust_during_session;
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
pub use model::*;
pub use planner::{next_prescription, recommend_session, recommend_session_for_template};
pub use state_update::update_lift_state;
