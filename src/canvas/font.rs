//! Bitmap text for label rendering.
//!
//! Uses the Spleen bitmap font family. Requested pixel sizes snap to an
//! integer multiple of one of two faces so glyph edges stay crisp on 1-bit
//! thermal output:
//!
//! | Requested | Face | Cell |
//! |-----------|------|------|
//! | < 24 | Spleen 6x12 | 6k × 12k |
//! | ≥ 24 | Spleen 12x24 | 12k × 24k |

use spleen_font::{FONT_6X12, FONT_12X24, PSF2Font};

/// Text drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    /// Requested text height in dots.
    pub size: u32,
    /// Draw with a one-dot horizontal stroke offset.
    pub bold: bool,
}

impl TextStyle {
    pub fn regular(size: u32) -> Self {
        Self { size, bold: false }
    }

    pub fn bold(size: u32) -> Self {
        Self { size, bold: true }
    }

    pub fn metrics(&self) -> FontMetrics {
        FontMetrics::for_size(self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Face {
    Small,
    Large,
}

impl Face {
    fn cell(self) -> (u32, u32) {
        match self {
            Self::Small => (6, 12),
            Self::Large => (12, 24),
        }
    }

    fn data(self) -> &'static [u8] {
        match self {
            Self::Small => FONT_6X12,
            Self::Large => FONT_12X24,
        }
    }
}

/// Effective glyph cell after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    face: Face,
    pub scale: u32,
    pub char_width: u32,
    pub char_height: u32,
}

impl FontMetrics {
    pub fn for_size(size: u32) -> Self {
        let (face, base) = if size >= 24 {
            (Face::Large, 24)
        } else {
            (Face::Small, 12)
        };
        let scale = (size / base).max(1);
        let (w, h) = face.cell();
        Self {
            face,
            scale,
            char_width: w * scale,
            char_height: h * scale,
        }
    }

    /// Characters that fit in `width` dots.
    pub fn chars_in(&self, width: u32) -> usize {
        (width / self.char_width) as usize
    }
}

/// Width of a single line of text in dots.
pub fn measure(text: &str, style: TextStyle) -> u32 {
    let metrics = style.metrics();
    let bold_extra = if style.bold && !text.is_empty() { 1 } else { 0 };
    text.chars().count() as u32 * metrics.char_width + bold_extra
}

/// Glyph bitmap at the face's native cell size (row-major, true = ink).
///
/// Characters missing from the font render as an outlined box.
pub(crate) fn glyph(metrics: &FontMetrics, ch: char) -> Vec<bool> {
    let (w, h) = metrics.face.cell();
    let (w, h) = (w as usize, h as usize);
    let mut bitmap = vec![false; w * h];

    let found = match PSF2Font::new(metrics.face.data()) {
        Ok(mut font) => {
            let utf8 = ch.to_string();
            match font.glyph_for_utf8(utf8.as_bytes()) {
                Some(rows) => {
                    for (row_y, row) in rows.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if row_y < h && col_x < w {
                                bitmap[row_y * w + col_x] = on;
                            }
                        }
                    }
                    true
                }
                None => false,
            }
        }
        Err(_) => false,
    };

    if !found && ch != ' ' {
        for x in 0..w {
            bitmap[x] = true;
            bitmap[(h - 1) * w + x] = true;
        }
        for y in 0..h {
            bitmap[y * w] = true;
            bitmap[y * w + w - 1] = true;
        }
    }

    bitmap
}

/// Cut `text` to a single line of `max_width` dots, ending with `...` when
/// anything was dropped.
pub fn truncate(text: &str, style: TextStyle, max_width: u32) -> String {
    let per_line = style.metrics().chars_in(max_width.saturating_sub(style.bold as u32));
    if text.chars().count() <= per_line {
        return text.to_string();
    }
    if per_line < 3 {
        return ".".repeat(per_line);
    }

    let mut shortened: String = text.chars().take(per_line - 3).collect();
    shortened.truncate(shortened.trim_end().len());
    shortened.push_str("...");
    shortened
}

/// Word-wrap `text` into at most `max_lines` lines of `max_width` dots.
///
/// Words longer than a line are broken. When the text does not fit, the last
/// line ends with `...`.
pub fn wrap(text: &str, style: TextStyle, max_width: u32, max_lines: usize) -> Vec<String> {
    let per_line = style.metrics().chars_in(max_width.saturating_sub(style.bold as u32));
    if per_line == 0 || max_lines == 0 {
        return Vec::new();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut truncated = false;

    'words: for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let used = current.chars().count();
            let needed = if used == 0 { word.len() } else { used + 1 + word.len() };

            if needed <= per_line {
                if used > 0 {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }

            if used > 0 {
                lines.push(std::mem::take(&mut current));
            } else {
                // Break an overlong word
                let rest = word.split_off(per_line);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if lines.len() == max_lines {
                truncated = true;
                break 'words;
            }
        }
    }

    if !truncated && !current.is_empty() {
        lines.push(current);
    }

    if truncated && let Some(last) = lines.last_mut() {
        let keep = per_line.saturating_sub(3);
        let mut shortened: String = last.chars().take(keep).collect();
        shortened.truncate(shortened.trim_end().len());
        shortened.push_str("...");
        *last = shortened;
    }

    lines
}
