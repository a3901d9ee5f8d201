//! Stroke risk prediction service.
//!
//! Serves an XGBoost classifier over HTTP: [`inference`] evaluates the tree
//! ensemble, [`api`] exposes it with axum, and [`config`] reads deployment
//! settings from the environment.

pub mod api;
pub mod config;
pub mod inference;
pub mod models;
