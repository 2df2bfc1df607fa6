//! KeepTrack Core Library
//!
//! This crate provides the core of the KeepTrack project board:
//! - Entity model (projects and their status columns)
//! - Local cache (offline-first shadow copy of the project list)
//! - Remote data gateway (REST over HTTP with translated errors)
//! - Reorder engine (pure drag-and-drop order computation)
//! - Board state controller (optimistic updates with per-project rollback)

pub mod board;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod project;
pub mod reorder;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::board::{BoardController, LoadState};
    pub use crate::cache::{FileStore, MemoryStore, ProjectCache};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::gateway::{HttpProjectGateway, ProjectGateway};
    pub use crate::project::{Project, ProjectStatus};
    pub use crate::reorder::{DropTarget, MoveEvent, plan_move};
}
