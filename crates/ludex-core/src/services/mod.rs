//! Application services.
//!
//! Services orchestrate ports and the search/sync building blocks. They are
//! constructed with injected dependencies and hold no global state.

mod app_core;
mod game_service;

pub use app_core::LudexCore;
pub use game_service::{GameService, GameServiceDeps};
