//! Library entrypoint for the stock alerts client.
//!
//! The binary in `main.rs` is a thin command line front end; everything it
//! drives (store, controllers, notifications) lives here so integration tests
//! under `tests/` can exercise it against a mock alert service.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;

pub mod services;

pub mod controllers;

pub use error::{AlertError, ValidationError};
