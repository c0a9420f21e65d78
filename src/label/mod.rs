//! # Label Model
//!
//! The editable data for one label: the FNSKU identifier that becomes the
//! barcode, the display text, and the physical label size.
//!
//! ## Normalization
//!
//! | Field | On set |
//! |-------|--------|
//! | identifier | trimmed, upper-cased |
//! | title | verbatim |
//! | sku | verbatim |
//! | condition | closed set, unknown values ignored |
//! | label size | closed set, unknown values ignored |
//!
//! Identifier length is never enforced. Short identifiers only produce an
//! [`IdentifierAdvisory::TooShort`] hint.
//!
//! ## Example
//!
//! ```
//! use labelkit::label::{LabelRecord, LabelSize};
//!
//! let mut record = LabelRecord::default();
//! record.set_identifier(" x00abc123 ");
//! record.set_label_size(LabelSize::Compact);
//!
//! assert_eq!(record.identifier, "X00ABC123");
//! assert_eq!(record.label_size.inches(), (2.25, 1.25));
//! ```

mod editor;

pub use editor::LabelEditor;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifiers shorter than this get an advisory warning (FNSKUs are 10 chars).
pub const ADVISORY_MIN_LEN: usize = 10;

/// Normalize a raw identifier: trim surrounding whitespace and upper-case.
///
/// Idempotent: `normalize_identifier(&normalize_identifier(s)) == normalize_identifier(s)`.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// ============================================================================
// CONDITION
// ============================================================================

/// Item condition printed on the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Condition {
    #[default]
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Used - Like New")]
    UsedLikeNew,
    #[serde(rename = "Used - Very Good")]
    UsedVeryGood,
    #[serde(rename = "Used - Good")]
    UsedGood,
    #[serde(rename = "Used - Acceptable")]
    UsedAcceptable,
}

impl Condition {
    pub const ALL: [Condition; 5] = [
        Condition::New,
        Condition::UsedLikeNew,
        Condition::UsedVeryGood,
        Condition::UsedGood,
        Condition::UsedAcceptable,
    ];

    /// Text as printed on the label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::UsedLikeNew => "Used - Like New",
            Self::UsedVeryGood => "Used - Very Good",
            Self::UsedGood => "Used - Good",
            Self::UsedAcceptable => "Used - Acceptable",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = String;

    /// Accepts the display text ("Used - Good") as well as compact spellings
    /// ("used-good", "UsedGood").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "new" => Ok(Self::New),
            "usedlikenew" => Ok(Self::UsedLikeNew),
            "usedverygood" => Ok(Self::UsedVeryGood),
            "usedgood" => Ok(Self::UsedGood),
            "usedacceptable" => Ok(Self::UsedAcceptable),
            _ => Err(format!("Unknown condition '{}'", s)),
        }
    }
}

// ============================================================================
// LABEL SIZE
// ============================================================================

/// # Physical Label Size
///
/// | Size | Tag | Inches |
/// |------|-----|--------|
/// | Standard | `4x6` | 4 × 6 |
/// | Compact | `2.25x1.25` | 2.25 × 1.25 |
///
/// Dimensions are stored in hundredths of an inch so the physical size is
/// exact; dot dimensions are derived per printer resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LabelSize {
    #[default]
    #[serde(rename = "4x6")]
    Standard,
    #[serde(rename = "2.25x1.25")]
    Compact,
}

impl LabelSize {
    pub const ALL: [LabelSize; 2] = [LabelSize::Standard, LabelSize::Compact];

    /// Storage / wire tag.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Standard => "4x6",
            Self::Compact => "2.25x1.25",
        }
    }

    /// Human-readable name as shown in the size selector.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Standard => "4\" x 6\" (Standard)",
            Self::Compact => "2.25\" x 1.25\" (Address)",
        }
    }

    /// Width and height in hundredths of an inch.
    pub fn hundredths(&self) -> (u32, u32) {
        match self {
            Self::Standard => (400, 600),
            Self::Compact => (225, 125),
        }
    }

    /// Width and height in inches.
    pub fn inches(&self) -> (f64, f64) {
        let (w, h) = self.hundredths();
        (w as f64 / 100.0, h as f64 / 100.0)
    }

    /// Width and height in printer dots at the given resolution.
    ///
    /// ```text
    /// Standard @ 203 DPI: 812 × 1218
    /// Compact  @ 203 DPI: 457 × 254
    /// ```
    pub fn dots(&self, dpi: u32) -> (u32, u32) {
        let (w, h) = self.hundredths();
        (hundredths_to_dots(w, dpi), hundredths_to_dots(h, dpi))
    }
}

/// Round-half-up conversion of hundredths of an inch to dots.
fn hundredths_to_dots(hundredths: u32, dpi: u32) -> u32 {
    let dots = (u64::from(hundredths) * u64::from(dpi) + 50) / 100;
    u32::try_from(dots).unwrap_or(u32::MAX)
}

impl fmt::Display for LabelSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for LabelSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "4x6" | "standard" => Ok(Self::Standard),
            "2.25x1.25" | "compact" | "address" => Ok(Self::Compact),
            other => Err(format!(
                "Unknown label size '{}'. Use '4x6' or '2.25x1.25'",
                other
            )),
        }
    }
}

// ============================================================================
// RECORD
// ============================================================================

/// Advisory feedback on the identifier. Never blocks rendering or printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierAdvisory {
    Empty,
    TooShort { len: usize },
    Ok,
}

/// One in-progress label.
///
/// Serialized with the storage schema `{ fnsku, title, condition, sku, labelSize }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRecord {
    #[serde(rename = "fnsku")]
    pub identifier: String,
    pub title: String,
    pub condition: Condition,
    pub sku: String,
    #[serde(rename = "labelSize")]
    pub label_size: LabelSize,
}

impl LabelRecord {
    /// Store an identifier, trimmed and upper-cased.
    pub fn set_identifier(&mut self, raw: &str) {
        self.identifier = normalize_identifier(raw);
    }

    pub fn set_title(&mut self, raw: &str) {
        self.title = raw.to_string();
    }

    pub fn set_sku(&mut self, raw: &str) {
        self.sku = raw.to_string();
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.condition = condition;
    }

    /// Set the condition from its text form. Returns `false` (and leaves the
    /// record unchanged) when the value is not one of the known conditions.
    pub fn set_condition_str(&mut self, value: &str) -> bool {
        match value.parse() {
            Ok(condition) => {
                self.condition = condition;
                true
            }
            Err(_) => false,
        }
    }

    pub fn set_label_size(&mut self, size: LabelSize) {
        self.label_size = size;
    }

    /// Set the label size from its tag. Returns `false` on unknown tags.
    pub fn set_label_size_str(&mut self, value: &str) -> bool {
        match value.parse() {
            Ok(size) => {
                self.label_size = size;
                true
            }
            Err(_) => false,
        }
    }

    /// Clear identifier, title and SKU and restore the `New` condition.
    ///
    /// The label size is kept: it describes the loaded label stock, not the
    /// item being labelled.
    pub fn reset(&mut self) {
        self.identifier.clear();
        self.title.clear();
        self.sku.clear();
        self.condition = Condition::New;
    }

    /// Whether there is anything to encode.
    pub fn has_identifier(&self) -> bool {
        !self.identifier.is_empty()
    }

    pub fn advisory(&self) -> IdentifierAdvisory {
        let len = self.identifier.chars().count();
        if len == 0 {
            IdentifierAdvisory::Empty
        } else if len < ADVISORY_MIN_LEN {
            IdentifierAdvisory::TooShort { len }
        } else {
            IdentifierAdvisory::Ok
        }
    }

    /// Re-apply identifier normalization (used after deserializing).
    pub fn normalized(mut self) -> Self {
        self.identifier = normalize_identifier(&self.identifier);
        self
    }
}
