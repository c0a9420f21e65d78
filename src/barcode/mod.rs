//! # Barcode Renderer
//!
//! Maps an identifier to a CODE128 symbol and lays it out in printer dots.
//!
//! ## Pipeline
//!
//! ```text
//! identifier ──► code128::encode ──► modules (Vec<bool>)
//!                                        │
//!                      RenderOptions ────┤
//!                                        ▼
//!                                  BarcodeSymbol
//!                          bars: [(width, is_bar), ...]
//!                          human-readable text
//! ```
//!
//! Rendering is a pure function: the same identifier and options always give
//! the same geometry. Failures are returned as [`EncodingError`] and never
//! touch previously rendered symbols (see [`crate::preview`]).
//!
//! ## Example
//!
//! ```
//! use labelkit::barcode::{render, RenderOptions};
//!
//! let symbol = render("X001234567", &RenderOptions::default()).unwrap();
//! assert_eq!(symbol.human_readable_text(), "X001234567");
//! assert!(symbol.width() > 0);
//! ```

pub mod code128;

use serde::Serialize;

use crate::error::EncodingError;
use crate::label::LabelSize;

/// Gap between the bars and the human-readable text, in dots.
pub const TEXT_MARGIN: u32 = 2;

/// # Rendering Options
///
/// All sizes are in printer dots.
///
/// | Option | Default | Meaning |
/// |--------|---------|---------|
/// | module_width | 2 | width of the narrowest bar |
/// | height | 50 | bar height |
/// | display_value | true | draw the identifier under the bars |
/// | font_size | 14 | text height |
/// | margin | 0 | quiet area around the symbol |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderOptions {
    pub module_width: u32,
    pub height: u32,
    pub display_value: bool,
    pub font_size: u32,
    pub margin: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            module_width: 2,
            height: 50,
            display_value: true,
            font_size: 14,
            margin: 0,
        }
    }
}

impl RenderOptions {
    /// Options scaled for a physical label at the given resolution.
    ///
    /// ```text
    /// Standard: 2/96in modules, 0.75in bars, 14/96in text
    /// Compact:  1/96in modules, 0.35in bars,  8/96in text
    /// ```
    pub fn for_label(size: LabelSize, dpi: u32) -> Self {
        let scaled = |css_px: u32| ((css_px * dpi + 48) / 96).max(1);
        match size {
            LabelSize::Standard => Self {
                module_width: scaled(2),
                height: dpi * 3 / 4,
                font_size: scaled(14),
                ..Self::default()
            },
            LabelSize::Compact => Self {
                module_width: scaled(1),
                height: dpi * 35 / 100,
                font_size: scaled(8),
                ..Self::default()
            },
        }
    }

    /// Height taken by the human-readable line, zero when hidden.
    pub fn text_height(&self) -> u32 {
        if self.display_value {
            self.font_size + TEXT_MARGIN
        } else {
            0
        }
    }
}

/// One run of equal modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    /// Width in dots.
    pub width: u32,
    /// True for a printed bar, false for a space.
    pub is_bar: bool,
}

/// A rendered CODE128 symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarcodeSymbol {
    modules: Vec<bool>,
    bars: Vec<Bar>,
    text: String,
    options: RenderOptions,
}

impl BarcodeSymbol {
    fn from_modules(text: &str, modules: Vec<bool>, options: RenderOptions) -> Self {
        let bars = run_lengths(&modules, options.module_width.max(1));
        Self {
            modules,
            bars,
            text: text.to_string(),
            options,
        }
    }

    /// The encoded module pattern (one entry per module).
    pub fn modules(&self) -> &[bool] {
        &self.modules
    }

    /// Run-length bar geometry in dots, left to right.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn human_readable_text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Width of the bar area only.
    pub fn bars_width(&self) -> u32 {
        self.modules.len() as u32 * self.options.module_width.max(1)
    }

    /// Total width including margins.
    pub fn width(&self) -> u32 {
        self.bars_width() + self.options.margin * 2
    }

    /// Width at one dot per module, the narrowest this symbol can be drawn.
    pub fn min_width(&self) -> u32 {
        self.modules.len() as u32 + self.options.margin * 2
    }

    /// Total height including text and margins.
    pub fn height(&self) -> u32 {
        self.options.height + self.options.text_height() + self.options.margin * 2
    }

    /// Shrink the symbol to fit a region without distorting it.
    ///
    /// The module width drops to the largest value that fits `max_width`
    /// (never below one dot, so a symbol wider than the region at one dot
    /// per module stays at one dot). Bar height is capped so bars plus text
    /// fit `max_height`. Nothing ever grows.
    pub fn fit(&self, max_width: u32, max_height: u32) -> Self {
        let mut options = self.options;
        let modules = self.modules.len() as u32;
        let usable_width = max_width.saturating_sub(options.margin * 2);

        if modules > 0 {
            let fitting = (usable_width / modules).max(1);
            options.module_width = options.module_width.min(fitting);
        }

        let fixed = options.text_height() + options.margin * 2;
        options.height = options
            .height
            .min(max_height.saturating_sub(fixed))
            .max(1);

        Self::from_modules(&self.text, self.modules.clone(), options)
    }

    /// Module states per dot column across the bar area.
    pub fn columns(&self) -> Vec<bool> {
        self.bars
            .iter()
            .flat_map(|bar| std::iter::repeat_n(bar.is_bar, bar.width as usize))
            .collect()
    }
}

/// Collapse modules into runs scaled by `module_width`.
fn run_lengths(modules: &[bool], module_width: u32) -> Vec<Bar> {
    let mut bars: Vec<Bar> = Vec::new();
    for &is_bar in modules {
        match bars.last_mut() {
            Some(last) if last.is_bar == is_bar => last.width += module_width,
            _ => bars.push(Bar {
                width: module_width,
                is_bar,
            }),
        }
    }
    bars
}

/// Render an identifier as a CODE128 symbol.
pub fn render(identifier: &str, options: &RenderOptions) -> Result<BarcodeSymbol, EncodingError> {
    let modules = code128::encode(identifier)?;
    Ok(BarcodeSymbol::from_modules(identifier, modules, *options))
}

/// Like [`render`], for a region `max_width` dots wide. Fails with
/// [`EncodingError::TooWide`] when even the narrowest drawing would be
/// clipped, since a clipped symbol does not scan.
pub fn render_within(
    identifier: &str,
    options: &RenderOptions,
    max_width: u32,
) -> Result<BarcodeSymbol, EncodingError> {
    let symbol = render(identifier, options)?;
    let needed = symbol.min_width();
    if needed > max_width {
        return Err(EncodingError::TooWide {
            needed,
            available: max_width,
        });
    }
    Ok(symbol)
}
