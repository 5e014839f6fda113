//! Dashboard UI
//!
//! Presentation layer over the scan controller: reads its state, renders
//! it, and invokes its operations. No orchestration state lives here.

pub mod app;
pub mod state;
pub mod theme;
pub mod views;

pub use app::run_dashboard;
