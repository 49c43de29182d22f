//! Snapboard Application
//!
//! Headless shell that drives the constraint engine from pointer-event
//! scripts.

mod app;

pub use app::{demo_script, load_script, App, AppConfig, AppError, ScriptStep};
