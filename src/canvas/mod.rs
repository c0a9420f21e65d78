//! # Label Canvas
//!
//! A fixed-size 1-bit drawing surface whose dimensions equal one physical
//! label at a given printer resolution.
//!
//! ## Preview == Print
//!
//! The same [`compose`] call produces the preview and the print canvas. The
//! only difference a [`RenderMode`] is allowed to make is the dashed
//! safe-zone guide, which exists in preview mode only:
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │ ┌ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─┐ │   │                          │
//! │   ║│║││║║│║│║║││║│║║│   │   │   ║│║││║║│║│║║││║│║║│    │
//! │ │      X001234567      │ │   │       X001234567         │
//! │   Silicone Spatula Set   │   │   Silicone Spatula Set   │
//! │ │ Used - Good    ABC-1 │ │   │   Used - Good    ABC-1   │
//! │ └ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─┘ │   │                          │
//! └──────────────────────────┘   └──────────────────────────┘
//!        preview (guide)                  print
//! ```
//!
//! Content is clipped to the canvas; the canvas never grows.

pub mod font;
mod layout;

pub use font::TextStyle;
pub use layout::{
    LayoutMetrics, PLACEHOLDER_TEXT, TITLE_FALLBACK, barcode_max_width, compose, label_symbol,
};

use image::{GrayImage, ImageEncoder, Luma};
use serde::Serialize;

use crate::barcode::{BarcodeSymbol, TEXT_MARGIN};
use crate::error::LabelKitError;
use crate::label::LabelSize;

/// Default resolution of thermal label printers.
pub const DEFAULT_DPI: u32 = 203;

/// Supported printer resolutions.
pub const MIN_DPI: u32 = 100;
pub const MAX_DPI: u32 = 600;

/// Whether a canvas is for on-screen preview or for the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RenderMode {
    Preview { safe_zone: bool },
    Print,
}

impl RenderMode {
    pub fn shows_safe_zone(&self) -> bool {
        matches!(self, Self::Preview { safe_zone: true })
    }
}

/// Axis-aligned rectangle in canvas dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Which label field a text element shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Identifier,
    Title,
    Condition,
    Sku,
    Placeholder,
}

/// Something drawn on the canvas, with where it landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Barcode { rect: Rect, modules: usize },
    Text { role: TextRole, text: String, rect: Rect },
    SafeZone { rect: Rect },
}

/// # Label Canvas
///
/// Pixels are stored one byte per dot (1 = black) like the preview
/// renderer's buffer, and converted on output.
#[derive(Debug, Clone)]
pub struct Canvas {
    size: LabelSize,
    dpi: u32,
    width: u32,
    height: u32,
    mode: RenderMode,
    pixels: Vec<u8>,
    elements: Vec<Element>,
}

impl Canvas {
    /// Blank canvas for a label size at a resolution.
    pub fn for_label(size: LabelSize, dpi: u32, mode: RenderMode) -> Self {
        let (width, height) = size.dots(dpi);
        Self {
            size,
            dpi,
            width,
            height,
            mode,
            pixels: vec![0; width as usize * height as usize],
            elements: Vec::new(),
        }
    }

    pub fn label_size(&self) -> LabelSize {
        self.size
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Physical size in inches, exact.
    pub fn physical_size(&self) -> (f64, f64) {
        self.size.inches()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Text of every element with the given role.
    pub fn texts(&self, role: TextRole) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { role: r, text, .. } if *r == role => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_barcode(&self) -> bool {
        self.elements
            .iter()
            .any(|e| matches!(e, Element::Barcode { .. }))
    }

    pub fn is_black(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[(y * self.width + x) as usize] != 0
    }

    /// Raw pixel buffer, one byte per dot, row-major, 1 = black.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Set a pixel; out-of-bounds writes are dropped.
    pub fn set_pixel(&mut self, x: u32, y: u32, black: bool) {
        if x < self.width && y < self.height {
            self.pixels[(y * self.width + x) as usize] = black as u8;
        }
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        for y in rect.y..rect.bottom().min(self.height) {
            for x in rect.x..rect.right().min(self.width) {
                self.pixels[(y * self.width + x) as usize] = 1;
            }
        }
    }

    /// Draw one line of text with its top-left corner at `(x, y)`.
    /// Returns the covered rectangle (before clipping).
    pub fn draw_text(&mut self, x: u32, y: u32, text: &str, style: TextStyle) -> Rect {
        let metrics = style.metrics();
        let scale = metrics.scale;
        let (cell_w, cell_h) = (metrics.char_width / scale, metrics.char_height / scale);

        for (i, ch) in text.chars().enumerate() {
            let origin_x = x + i as u32 * metrics.char_width;
            let bitmap = font::glyph(&metrics, ch);
            for gy in 0..cell_h {
                for gx in 0..cell_w {
                    if !bitmap[(gy * cell_w + gx) as usize] {
                        continue;
                    }
                    let px = origin_x + gx * scale;
                    let py = y + gy * scale;
                    let stroke = scale + style.bold as u32;
                    self.fill_rect(Rect::new(px, py, stroke, scale));
                }
            }
        }

        Rect::new(x, y, font::measure(text, style), metrics.char_height)
    }

    /// Draw text horizontally centered inside `area`, starting at `y`.
    pub fn draw_text_centered(&mut self, area: Rect, y: u32, text: &str, style: TextStyle) -> Rect {
        let width = font::measure(text, style);
        let x = area.x + area.width.saturating_sub(width) / 2;
        self.draw_text(x, y, text, style)
    }

    /// Draw a symbol with its top-left corner at `(x, y)`: bars, then the
    /// human-readable line centered underneath when enabled.
    pub fn draw_symbol(&mut self, x: u32, y: u32, symbol: &BarcodeSymbol) -> Rect {
        let options = symbol.options();
        let bars_x = x + options.margin;
        let bars_y = y + options.margin;

        let mut cursor = bars_x;
        for bar in symbol.bars() {
            if bar.is_bar {
                self.fill_rect(Rect::new(cursor, bars_y, bar.width, options.height));
            }
            cursor += bar.width;
        }

        let rect = Rect::new(x, y, symbol.width(), symbol.height());
        self.elements.push(Element::Barcode {
            rect,
            modules: symbol.modules().len(),
        });

        if options.display_value {
            let text_area = Rect::new(bars_x, 0, symbol.bars_width(), 0);
            let text_y = bars_y + options.height + TEXT_MARGIN;
            let text = symbol.human_readable_text();
            let drawn =
                self.draw_text_centered(text_area, text_y, text, TextStyle::regular(options.font_size));
            self.record_text(TextRole::Identifier, text, drawn);
        }

        rect
    }

    /// Dashed rectangle outline, 8 dots on, 4 off.
    pub fn draw_dashed_rect(&mut self, rect: Rect) {
        let dash = |i: u32| (i % 12) < 8;
        let (right, bottom) = (rect.right().saturating_sub(1), rect.bottom().saturating_sub(1));
        for x in rect.x..rect.right() {
            if dash(x - rect.x) {
                self.set_pixel(x, rect.y, true);
                self.set_pixel(x, bottom, true);
            }
        }
        for y in rect.y..rect.bottom() {
            if dash(y - rect.y) {
                self.set_pixel(rect.x, y, true);
                self.set_pixel(right, y, true);
            }
        }
    }

    pub(crate) fn record_text(&mut self, role: TextRole, text: &str, rect: Rect) {
        self.elements.push(Element::Text {
            role,
            text: text.to_string(),
            rect,
        });
    }

    pub(crate) fn record(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Grayscale image (black = 0, white = 255).
    pub fn to_gray_image(&self) -> GrayImage {
        let mut img = GrayImage::new(self.width, self.height);
        for (i, &px) in self.pixels.iter().enumerate() {
            let (x, y) = (i as u32 % self.width, i as u32 / self.width);
            let color = if px != 0 { 0u8 } else { 255u8 };
            img.put_pixel(x, y, Luma([color]));
        }
        img
    }

    /// Encode as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>, LabelKitError> {
        let img = self.to_gray_image();
        let mut png_bytes = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                img.as_raw(),
                self.width,
                self.height,
                image::ExtendedColorType::L8,
            )
            .map_err(|e: image::ImageError| LabelKitError::Image(e.to_string()))?;
        Ok(png_bytes)
    }

    /// Bytes per packed row.
    pub fn width_bytes(&self) -> u32 {
        self.width.div_ceil(8)
    }

    /// Pack rows MSB-first, 1 = black, rows padded to whole bytes.
    pub fn to_row_bytes(&self) -> Vec<u8> {
        let width_bytes = self.width_bytes() as usize;
        let mut data = vec![0u8; width_bytes * self.height as usize];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_black(x, y) {
                    let idx = y as usize * width_bytes + x as usize / 8;
                    data[idx] |= 0x80 >> (x % 8);
                }
            }
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::{RenderOptions, render};

    fn blank(size: LabelSize) -> Canvas {
        Canvas::for_label(size, DEFAULT_DPI, RenderMode::Print)
    }

    #[test]
    fn test_canvas_dimensions() {
        let standard = blank(LabelSize::Standard);
        assert_eq!((standard.width(), standard.height()), (812, 1218));
        assert_eq!(standard.physical_size(), (4.0, 6.0));

        let compact = blank(LabelSize::Compact);
        assert_eq!((compact.width(), compact.height()), (457, 254));
        assert_eq!(compact.physical_size(), (2.25, 1.25));
    }

    #[test]
    fn test_out_of_bounds_dropped() {
        let mut canvas = blank(LabelSize::Compact);
        canvas.set_pixel(10_000, 10_000, true);
        canvas.fill_rect(Rect::new(450, 250, 100, 100));
        assert!(canvas.is_black(456, 253));
        assert_eq!(canvas.pixels().len(), 457 * 254);
    }

    #[test]
    fn test_draw_symbol_bars() {
        let mut canvas = blank(LabelSize::Standard);
        let symbol = render("X00", &RenderOptions::default()).unwrap();
        canvas.draw_symbol(0, 0, &symbol);

        let columns = symbol.columns();
        for (x, &bar) in columns.iter().enumerate() {
            assert_eq!(canvas.is_black(x as u32, 10), bar, "column {}", x);
        }
        assert!(canvas.has_barcode());
        assert_eq!(canvas.texts(TextRole::Identifier), vec!["X00"]);
    }

    #[test]
    fn test_draw_text_leaves_ink() {
        let mut canvas = blank(LabelSize::Compact);
        let rect = canvas.draw_text(5, 5, "AB", TextStyle::regular(12));
        assert_eq!(rect, Rect::new(5, 5, 12, 12));
        assert!(canvas.pixels().iter().any(|&p| p != 0));
    }

    #[test]
    fn test_row_bytes_packing() {
        let mut canvas = blank(LabelSize::Compact);
        canvas.set_pixel(0, 0, true);
        canvas.set_pixel(9, 0, true);
        let bytes = canvas.to_row_bytes();
        assert_eq!(canvas.width_bytes(), 58);
        assert_eq!(bytes.len(), 58 * 254);
        assert_eq!(bytes[0], 0x80);
        assert_eq!(bytes[1], 0x40);
    }

    #[test]
    fn test_png_output() {
        let png = blank(LabelSize::Compact).to_png().unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[test]
    fn test_dashed_rect() {
        let mut canvas = blank(LabelSize::Compact);
        canvas.draw_dashed_rect(Rect::new(10, 10, 100, 50));
        assert!(canvas.is_black(10, 10));
        assert!(!canvas.is_black(10 + 9, 10));
        assert!(canvas.is_black(109, 10));
        assert!(!canvas.is_black(50, 30));
    }
}
