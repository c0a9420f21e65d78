//! CODE128 encoding.
//!
//! Uses the barcoders crate for the symbol tables and checksum. This module
//! validates the input and chooses the code set for each character:
//!
//! | Set | Prefix | Used for |
//! |-----|--------|----------|
//! | A | `À` (U+00C0) | control characters 0x00-0x1F |
//! | B | `Ɓ` (U+0181) | printable ASCII and DEL |
//!
//! barcoders spells DEL as `÷` (U+00F7) in Set B, so it is translated while
//! planning.
//!
//! Set B covers every character an FNSKU can contain, so typical labels are
//! a single Set B run. Set A runs only appear for embedded control codes.

use barcoders::sym::code128::Code128;

use crate::error::EncodingError;

const SET_A: char = '\u{00C0}';
const SET_B: char = '\u{0181}';
const SET_B_DEL: char = '\u{00F7}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
}

impl CodeSet {
    fn prefix(self) -> char {
        match self {
            Self::A => SET_A,
            Self::B => SET_B,
        }
    }

    fn for_char(ch: char) -> CodeSet {
        if (ch as u32) < 0x20 { Self::A } else { Self::B }
    }
}

/// Check that every character is representable in CODE128 (7-bit ASCII).
pub fn validate(data: &str) -> Result<(), EncodingError> {
    if data.is_empty() {
        return Err(EncodingError::Empty);
    }
    match data.chars().enumerate().find(|(_, ch)| !ch.is_ascii()) {
        Some((position, ch)) => Err(EncodingError::UnsupportedCharacter { ch, position }),
        None => Ok(()),
    }
}

/// Build the barcoders input: each run of characters is preceded by the
/// prefix of its code set.
fn plan(data: &str) -> String {
    let mut planned = String::with_capacity(data.len() + 2);
    let mut current: Option<CodeSet> = None;

    for ch in data.chars() {
        let set = CodeSet::for_char(ch);
        if current != Some(set) {
            planned.push(set.prefix());
            current = Some(set);
        }
        planned.push(if ch == '\x7f' { SET_B_DEL } else { ch });
    }

    planned
}

/// Encode data as CODE128 modules.
/// Returns a Vec<bool> where true = bar (black), false = space (white),
/// one entry per module (start code through stop pattern).
pub fn encode(data: &str) -> Result<Vec<bool>, EncodingError> {
    validate(data)?;

    let planned = plan(data);
    let barcode = Code128::new(&planned)
        .map_err(|e| EncodingError::Symbology(format!("{:?}", e)))?;

    Ok(barcode.encode().into_iter().map(|module| module == 1).collect())
}
