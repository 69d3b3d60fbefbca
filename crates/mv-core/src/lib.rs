//! Core functionality for the matrix viewer
//!
//! This crate provides the canonical matrix model and the application state
//! shared between the transport layer and the views.

pub mod matrix;
pub mod state;

// Re-export commonly used types
pub use matrix::{Matrix, MatrixError, RowLabel};
pub use state::{Notice, NoticeLevel, RequestTicket, ViewerState};
