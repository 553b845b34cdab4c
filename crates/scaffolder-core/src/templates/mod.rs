//! Project templates: planning and writing
//!
//! This module provides:
//! - Embedded React + Vite template texts
//! - Project planning (feature composition, version resolution, rendering)
//! - Writing a planned project to disk

pub mod planner;
pub mod texts;
pub mod writer;

pub use planner::{plan_project, PlanRequest, ProjectPlan, Selection, UiLibrary};
pub use writer::write_project;
