//! # Live Preview State
//!
//! Keeps the last successfully rendered barcode so that a bad keystroke
//! never blanks the preview.
//!
//! | Identifier | Encoding | Symbol shown |
//! |------------|----------|--------------|
//! | empty | skipped | none (placeholder) |
//! | valid | ok | new symbol |
//! | invalid | error (logged) | previous symbol, unchanged |
//! | too wide for the label | error (logged) | previous symbol, unchanged |
//!
//! Recomputation happens only when the identifier or the label size differs
//! from the previous call.

use serde::Serialize;

use crate::barcode::BarcodeSymbol;
use crate::canvas::{self, Canvas, RenderMode};
use crate::error::EncodingError;
use crate::label::{LabelRecord, LabelSize};

/// Outcome of the latest refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PreviewState {
    /// No identifier: placeholder is shown.
    Placeholder,
    /// Symbol matches the current identifier.
    Current,
    /// Current identifier failed to encode; the previous symbol (if any) stays.
    Stale {
        #[serde(serialize_with = "serialize_error")]
        error: EncodingError,
    },
}

fn serialize_error<S: serde::Serializer>(error: &EncodingError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Barcode preview with explicit last-good state.
#[derive(Debug, Clone)]
pub struct LivePreview {
    dpi: u32,
    inputs: Option<(String, LabelSize)>,
    symbol: Option<BarcodeSymbol>,
    state: PreviewState,
}

impl LivePreview {
    pub fn new(dpi: u32) -> Self {
        Self {
            dpi,
            inputs: None,
            symbol: None,
            state: PreviewState::Placeholder,
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// The symbol currently on screen.
    pub fn last_symbol(&self) -> Option<&BarcodeSymbol> {
        self.symbol.as_ref()
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    /// Re-derive the symbol if the identifier or size changed.
    pub fn refresh(&mut self, record: &LabelRecord) -> &PreviewState {
        let inputs = (record.identifier.clone(), record.label_size);
        if self.inputs.as_ref() == Some(&inputs) {
            return &self.state;
        }
        self.inputs = Some(inputs);

        if !record.has_identifier() {
            self.symbol = None;
            self.state = PreviewState::Placeholder;
            return &self.state;
        }

        match canvas::label_symbol(record, self.dpi) {
            Ok(symbol) => {
                self.symbol = Some(symbol);
                self.state = PreviewState::Current;
            }
            Err(error) => {
                tracing::warn!(fnsku = %record.identifier, error = %error, "invalid barcode data");
                self.state = PreviewState::Stale { error };
            }
        }
        &self.state
    }

    /// Refresh and compose the canvas for `record`.
    pub fn canvas(&mut self, record: &LabelRecord, mode: RenderMode) -> Canvas {
        self.refresh(record);
        let symbol = if record.has_identifier() {
            self.symbol.as_ref()
        } else {
            None
        };
        canvas::compose(record, symbol, self.dpi, mode)
    }

    /// Canvas for the printer.
    ///
    /// Unlike [`LivePreview::canvas`], this never falls back to a previous
    /// symbol: a label whose identifier does not encode is not printable.
    pub fn print_canvas(&mut self, record: &LabelRecord) -> Result<Canvas, EncodingError> {
        self.refresh(record);
        match &self.state {
            PreviewState::Placeholder => Err(EncodingError::Empty),
            PreviewState::Stale { error } => Err(error.clone()),
            PreviewState::Current => Ok(canvas::compose(
                record,
                self.symbol.as_ref(),
                self.dpi,
                RenderMode::Print,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DEFAULT_DPI;

    fn record(identifier: &str) -> LabelRecord {
        let mut record = LabelRecord::default();
        record.set_identifier(identifier);
        record
    }

    #[test]
    fn test_empty_is_placeholder() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        assert_eq!(preview.refresh(&record("")), &PreviewState::Placeholder);
        assert!(preview.last_symbol().is_none());
    }

    #[test]
    fn test_valid_renders() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        assert_eq!(preview.refresh(&record("X001234567")), &PreviewState::Current);
        assert_eq!(
            preview.last_symbol().unwrap().human_readable_text(),
            "X001234567"
        );
    }

    #[test]
    fn test_invalid_keeps_last_good() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        preview.refresh(&record("X001234567"));
        let good = preview.last_symbol().cloned();

        let state = preview.refresh(&record("X00123456É")).clone();
        assert!(matches!(
            state,
            PreviewState::Stale {
                error: EncodingError::UnsupportedCharacter { ch: 'É', .. }
            }
        ));
        assert_eq!(preview.last_symbol().cloned(), good);
    }

    #[test]
    fn test_empty_clears_symbol() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        preview.refresh(&record("X001234567"));
        preview.refresh(&record(""));
        assert!(preview.last_symbol().is_none());
    }

    #[test]
    fn test_size_change_recomputes() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        let mut rec = record("X001234567");
        preview.refresh(&rec);
        let standard_height = preview.last_symbol().unwrap().options().height;

        rec.set_label_size(LabelSize::Compact);
        preview.refresh(&rec);
        let compact_height = preview.last_symbol().unwrap().options().height;
        assert!(compact_height < standard_height);
    }

    #[test]
    fn test_too_wide_is_stale_and_unprintable() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        let mut rec = record("X001234567");
        rec.set_label_size(LabelSize::Compact);
        preview.refresh(&rec);
        let good = preview.last_symbol().cloned();

        rec.set_identifier(&"X".repeat(44));
        assert!(matches!(
            preview.refresh(&rec),
            PreviewState::Stale {
                error: EncodingError::TooWide { .. }
            }
        ));
        assert_eq!(preview.last_symbol().cloned(), good);
        assert!(preview.print_canvas(&rec).is_err());

        // Fits on the larger label
        rec.set_label_size(LabelSize::Standard);
        assert_eq!(preview.refresh(&rec), &PreviewState::Current);
    }

    #[test]
    fn test_print_canvas_never_uses_stale_symbol() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        assert!(preview.print_canvas(&record("X001234567")).is_ok());

        let bad = record("X00123456É");
        assert!(preview.canvas(&bad, RenderMode::Print).has_barcode());
        assert!(matches!(
            preview.print_canvas(&bad),
            Err(EncodingError::UnsupportedCharacter { .. })
        ));
        assert_eq!(preview.print_canvas(&record("")).err(), Some(EncodingError::Empty));
    }

    #[test]
    fn test_canvas_uses_placeholder_when_empty() {
        let mut preview = LivePreview::new(DEFAULT_DPI);
        let canvas = preview.canvas(&record(""), RenderMode::Print);
        assert!(!canvas.has_barcode());
    }
}
