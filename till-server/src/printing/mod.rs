//! Receipt generation
//!
//! Turns hydrated sales into printable output via `till-printer`.

pub mod receipt;

pub use receipt::{RECEIPT_WIDTH, render_escpos, render_text};
