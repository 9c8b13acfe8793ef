//! Receipt rendering
//!
//! Renders a hydrated sale into a 58mm (32-column) receipt, either as
//! ESC/POS bytes for a thermal printer or as a plain-text preview.
//!
//! Line totals, subtotal and tax are recomputed with `rust_decimal` for
//! display only; the stored sale total stays authoritative. The tax line is
//! derived as `total - subtotal`, so a receipt reprints identically even
//! after the tax rate changes.

use rust_decimal::Decimal;
use shared::models::{Sale, Settings};
use till_printer::{EscPosBuilder, TextBuilder, truncate_text};

use crate::utils::money;

/// 58mm thermal paper fits 32 normal-width columns.
pub const RECEIPT_WIDTH: usize = 32;

const FALLBACK_APP_NAME: &str = "POS SYSTEM";

/// Precomputed strings shared by both render targets.
struct ReceiptLayout {
    app_name: String,
    receipt_no: String,
    date: String,
    time: String,
    cashier: String,
    payment: Option<String>,
    table: Option<String>,
    /// (name, qty-x-price column, line total column)
    lines: Vec<(String, String, String)>,
    subtotal: String,
    tax: Option<(String, String)>,
    total: String,
    item_count: i64,
}

impl ReceiptLayout {
    fn new(sale: &Sale, settings: &Settings) -> Self {
        let symbol = settings.currency_symbol.as_str();

        let timestamp = chrono::DateTime::from_timestamp_millis(sale.created_at)
            .unwrap_or_else(chrono::Utc::now);

        let mut lines = Vec::with_capacity(sale.items.len());
        let mut subtotal = Decimal::ZERO;
        let mut item_count = 0;
        for line in &sale.items {
            let name = line
                .item
                .as_ref()
                .map(|i| i.name.as_str())
                .unwrap_or("Unknown Item");
            let line_total = money::line_total(line.price, line.quantity);
            subtotal += line_total;
            item_count += line.quantity;
            lines.push((
                truncate_text(name, RECEIPT_WIDTH),
                format!("  {} x {}", line.quantity, fmt_amount(symbol, money::to_decimal(line.price))),
                fmt_amount(symbol, line_total),
            ));
        }

        // Tax is whatever the stored total carries beyond the line items
        let total = money::to_decimal(sale.total);
        let tax = total - subtotal;
        let tax_line = (settings.tax_enabled && tax > Decimal::ZERO).then(|| {
            (
                format!("{} ({}%):", settings.tax_name, settings.tax_rate),
                fmt_amount(symbol, tax),
            )
        });

        Self {
            app_name: settings
                .app_name
                .clone()
                .unwrap_or_else(|| FALLBACK_APP_NAME.to_string()),
            receipt_no: format!("Receipt #: {}", sale.id),
            date: format!("Date: {}", timestamp.format("%Y-%m-%d")),
            time: format!("Time: {}", timestamp.format("%H:%M")),
            cashier: format!(
                "Cashier: {}",
                sale.user.as_ref().map(|u| u.name.as_str()).unwrap_or("-")
            ),
            payment: sale
                .payment_method
                .as_ref()
                .map(|m| format!("Payment: {}", m.name)),
            table: sale.table.as_ref().map(|t| format!("Table: {}", t.name)),
            lines,
            subtotal: fmt_amount(symbol, subtotal),
            tax: tax_line,
            total: fmt_amount(symbol, total),
            item_count,
        }
    }
}

fn fmt_amount(symbol: &str, value: Decimal) -> String {
    format!("{symbol}{:.2}", money::to_f64(value))
}

/// Render a sale as ESC/POS bytes for a 58mm thermal printer.
pub fn render_escpos(sale: &Sale, settings: &Settings) -> Vec<u8> {
    let layout = ReceiptLayout::new(sale, settings);
    let mut b = EscPosBuilder::new(RECEIPT_WIDTH);

    b.center()
        .font_large()
        .bold()
        .line(&layout.app_name)
        .bold_off()
        .font_normal()
        .line("SALES RECEIPT")
        .sep_single();

    b.left().line(&layout.receipt_no).line(&layout.date).line(&layout.time).line(&layout.cashier);
    if let Some(payment) = &layout.payment {
        b.line(payment);
    }
    if let Some(table) = &layout.table {
        b.line(table);
    }
    b.sep_single();

    for (name, qty_price, line_total) in &layout.lines {
        b.bold().line(name).bold_off();
        b.line_lr(qty_price, line_total);
    }
    b.sep_single();

    b.line_lr("Subtotal:", &layout.subtotal);
    if let Some((label, amount)) = &layout.tax {
        b.line_lr(label, amount);
    }
    b.bold().font_large();
    b.line_lr("TOTAL:", &layout.total);
    b.font_normal().bold_off();
    b.sep_single();

    b.center()
        .line(&format!("Items: {}", layout.item_count))
        .newline()
        .line("Thank you for your purchase!")
        .line("Please come again!");

    b.cut_feed(3);
    b.build()
}

/// Render a sale as a plain-text preview with the same column layout.
pub fn render_text(sale: &Sale, settings: &Settings) -> String {
    let layout = ReceiptLayout::new(sale, settings);
    let mut b = TextBuilder::new(RECEIPT_WIDTH);

    b.line_center(&layout.app_name)
        .line_center("SALES RECEIPT")
        .sep_single();

    b.line(&layout.receipt_no).line(&layout.date).line(&layout.time).line(&layout.cashier);
    if let Some(payment) = &layout.payment {
        b.line(payment);
    }
    if let Some(table) = &layout.table {
        b.line(table);
    }
    b.sep_single();

    for (name, qty_price, line_total) in &layout.lines {
        b.line(name);
        b.line_lr(qty_price, line_total);
    }
    b.sep_single();

    b.line_lr("Subtotal:", &layout.subtotal);
    if let Some((label, amount)) = &layout.tax {
        b.line_lr(label, amount);
    }
    b.line_lr("TOTAL:", &layout.total);
    b.sep_single();

    b.line_center(&format!("Items: {}", layout.item_count))
        .newline()
        .line_center("Thank you for your purchase!")
        .line_center("Please come again!");

    b.build()
}
