//! fittrack - Local-first workout tracker
//!
//! Workouts live in a local SQLite store, are listed grouped by calendar
//! day, and two external lookup services find nearby gyms and tutorial
//! videos.

pub mod auth;
pub mod db;
pub mod error;
pub mod grouping;
pub mod lookup;
pub mod tui;

pub use db::{Workout, WorkoutStore};
pub use error::Error;
