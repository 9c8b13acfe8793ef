//! Utility modules - error type, logging, validation, money math
//!
//! # Contents
//!
//! - [`AppError`] / [`AppResult`] - application error type and result alias
//! - [`logger`] - tracing setup (console + rotating file)
//! - [`validation`] - input limits and checks
//! - [`money`] - rust_decimal helpers for monetary values

pub mod error;
pub mod logger;
pub mod money;
pub mod validation;

pub use error::{AppError, AppResult, ErrorBody};
pub use logger::{init_logger, init_logger_with_file};
