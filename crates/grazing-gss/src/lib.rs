//! Grazing suitability scoring for rangeland plot surveys.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
