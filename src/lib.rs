//! Library entrypoint for pricewatch.
//!
//! This file exists mainly to make pipeline tests easy (integration tests
//! under `tests/` can import the config, models, services and scheduler).

pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod scheduler;
