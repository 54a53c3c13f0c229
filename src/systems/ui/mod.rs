//! Shared UI primitives.
pub mod grid_popup;
