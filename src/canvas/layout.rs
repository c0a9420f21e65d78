//! Label layout: where the symbol and text fields go.
//!
//! ```text
//! ┌─────────────── label ───────────────┐
//! │ pad                                 │
//! │   ┌───────── barcode area ────────┐ │
//! │   │      symbol, centered         │ │
//! │   └───────────────────────────────┘ │
//! │   gap                               │
//! │   Title line 1 (bold)               │
//! │   Title line 2...                   │
//! │   Condition                   SKU   │
//! │                                 pad │
//! └─────────────────────────────────────┘
//! ```

use serde::Serialize;

use super::font::{self, TextStyle};
use super::{Canvas, Element, Rect, RenderMode, TextRole};
use crate::barcode::{self, BarcodeSymbol, RenderOptions};
use crate::error::EncodingError;
use crate::label::{LabelRecord, LabelSize};

/// Shown instead of the label body when there is no identifier.
pub const PLACEHOLDER_TEXT: &str = "Enter FNSKU to generate label";

/// Drawn in the title slot when the title is empty.
pub const TITLE_FALLBACK: &str = "Product Title";

/// Title is clamped to this many lines.
const TITLE_MAX_LINES: usize = 2;

/// Size-dependent spacing and type sizes, all in dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayoutMetrics {
    pub padding: u32,
    pub gap: u32,
    pub title_size: u32,
    pub detail_size: u32,
}

impl LayoutMetrics {
    pub fn for_label(size: LabelSize, dpi: u32) -> Self {
        match size {
            LabelSize::Standard => Self {
                padding: dpi / 6,
                gap: dpi / 12,
                title_size: dpi * 14 / 96,
                detail_size: dpi * 12 / 96,
            },
            LabelSize::Compact => Self {
                padding: dpi / 16,
                gap: dpi / 48,
                title_size: dpi * 7 / 96,
                detail_size: dpi * 6 / 96,
            },
        }
    }
}

/// Widest barcode, in dots, the layout can place on this label.
pub fn barcode_max_width(size: LabelSize, dpi: u32) -> u32 {
    let (width, _) = size.dots(dpi);
    width.saturating_sub(LayoutMetrics::for_label(size, dpi).padding * 2)
}

/// Render the record's barcode for its label size, refusing symbols that
/// cannot be drawn without clipping.
pub fn label_symbol(record: &LabelRecord, dpi: u32) -> Result<BarcodeSymbol, EncodingError> {
    barcode::render_within(
        &record.identifier,
        &RenderOptions::for_label(record.label_size, dpi),
        barcode_max_width(record.label_size, dpi),
    )
}

/// Compose a label onto a fresh canvas.
///
/// `symbol` is the identifier's rendered barcode, or `None` to draw the
/// placeholder. The layout does not depend on `mode`; only the safe-zone
/// guide does.
pub fn compose(
    record: &LabelRecord,
    symbol: Option<&BarcodeSymbol>,
    dpi: u32,
    mode: RenderMode,
) -> Canvas {
    let mut canvas = Canvas::for_label(record.label_size, dpi, mode);
    let metrics = LayoutMetrics::for_label(record.label_size, dpi);
    let inner = inset(canvas.bounds(), metrics.padding);

    match symbol {
        Some(symbol) if record.has_identifier() => {
            draw_body(&mut canvas, record, symbol, inner, &metrics);
        }
        _ => {
            let style = TextStyle::regular(metrics.detail_size);
            let lines = font::wrap(PLACEHOLDER_TEXT, style, inner.width, 2);
            let line_height = style.metrics().char_height;
            let block = line_height * lines.len() as u32;
            let mut y = inner.y + inner.height.saturating_sub(block) / 2;
            for line in &lines {
                let rect = canvas.draw_text_centered(inner, y, line, style);
                canvas.record_text(TextRole::Placeholder, line, rect);
                y += line_height;
            }
        }
    }

    if mode.shows_safe_zone() {
        let zone = inset(canvas.bounds(), metrics.padding / 2);
        canvas.draw_dashed_rect(zone);
        canvas.record(Element::SafeZone { rect: zone });
    }

    tracing::debug!(
        size = %record.label_size,
        dpi,
        width = canvas.width(),
        height = canvas.height(),
        placeholder = !canvas.has_barcode(),
        "composed label"
    );

    canvas
}

fn draw_body(
    canvas: &mut Canvas,
    record: &LabelRecord,
    symbol: &BarcodeSymbol,
    inner: Rect,
    metrics: &LayoutMetrics,
) {
    let title_style = TextStyle::bold(metrics.title_size);
    let detail_style = TextStyle::regular(metrics.detail_size);
    let title_height = title_style.metrics().char_height;
    let detail_height = detail_style.metrics().char_height;

    let title = if record.title.trim().is_empty() {
        TITLE_FALLBACK
    } else {
        record.title.as_str()
    };
    let title_lines = font::wrap(title, title_style, inner.width, TITLE_MAX_LINES);

    // Text block sits at the bottom of the inner area.
    let text_block = title_height * title_lines.len() as u32 + metrics.gap / 2 + detail_height;
    let text_top = inner.bottom().saturating_sub(text_block);

    // Barcode fills what is left above it.
    let barcode_area = Rect::new(
        inner.x,
        inner.y,
        inner.width,
        text_top.saturating_sub(inner.y + metrics.gap),
    );
    let fitted = symbol.fit(barcode_area.width, barcode_area.height);
    if fitted.width() > barcode_area.width {
        tracing::warn!(
            needed = fitted.width(),
            available = barcode_area.width,
            "barcode clipped"
        );
    }
    let symbol_x = barcode_area.x + barcode_area.width.saturating_sub(fitted.width()) / 2;
    let symbol_y = barcode_area.y + barcode_area.height.saturating_sub(fitted.height()) / 2;
    canvas.draw_symbol(symbol_x, symbol_y, &fitted);

    let mut y = text_top;
    for line in &title_lines {
        let rect = canvas.draw_text(inner.x, y, line, title_style);
        canvas.record_text(TextRole::Title, line, rect);
        y += title_height;
    }
    y += metrics.gap / 2;

    let condition = font::truncate(record.condition.label(), detail_style, inner.width);
    let condition_rect = canvas.draw_text(inner.x, y, &condition, detail_style);
    canvas.record_text(TextRole::Condition, &condition, condition_rect);

    // SKU is right-aligned in whatever the condition leaves free.
    let sku_room = inner
        .right()
        .saturating_sub(condition_rect.right() + metrics.gap);
    let sku = font::truncate(&record.sku, detail_style, sku_room);
    if !sku.is_empty() {
        let sku_x = inner.right().saturating_sub(font::measure(&sku, detail_style));
        let rect = canvas.draw_text(sku_x, y, &sku, detail_style);
        canvas.record_text(TextRole::Sku, &sku, rect);
    }
}

fn inset(rect: Rect, by: u32) -> Rect {
    Rect::new(
        rect.x + by,
        rect.y + by,
        rect.width.saturating_sub(by * 2),
        rect.height.saturating_sub(by * 2),
    )
}
