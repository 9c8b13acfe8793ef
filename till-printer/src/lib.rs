//! # till-printer
//!
//! ESC/POS receipt printing primitives - low-level capabilities only.
//!
//! ## Scope
//!
//! This crate handles HOW to print:
//! - ESC/POS command building
//! - Fixed-width text layout (column padding, left/right lines)
//! - Network printing (TCP port 9100)
//!
//! Business logic (WHAT to print) stays in application code: the server's
//! receipt renderer decides layout and content.
//!
//! ## Example
//!
//! ```ignore
//! use till_printer::{EscPosBuilder, NetworkPrinter, Printer};
//!
//! // Build ESC/POS content (58mm paper = 32 columns)
//! let mut builder = EscPosBuilder::new(32);
//! builder.center();
//! builder.bold();
//! builder.line("MY STORE");
//! builder.bold_off();
//! builder.left();
//! builder.line_lr("Subtotal:", "$12.50");
//! builder.cut_feed(3);
//!
//! // Send to network printer
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&builder.build()).await?;
//! ```

mod error;
mod escpos;
mod layout;
mod printer;

// Re-exports
pub use error::{PrintError, PrintResult};
pub use escpos::{EscPosBuilder, TextBuilder};
pub use layout::{pad_text, text_width, truncate_text};
pub use printer::{NetworkPrinter, Printer};
