//! # EPL2 Label Jobs
//!
//! Builds a complete EPL2 job that prints one label from a composed canvas
//! as a single `GW` (direct graphic write) bitmap.
//!
//! ```text
//! N\r\n                         clear image buffer
//! q812\r\n                      label width (dots)
//! Q1218,24\r\n                  label length (dots), gap 24 dots
//! GW0,0,102,1218\r\n<bytes>\r\n bitmap at origin
//! P1\r\n                        print one copy
//! ```
//!
//! GW data is MSB-first with `0` meaning black, so the canvas rows
//! (1 = black) are inverted before they are appended.

use crate::canvas::Canvas;

/// Gap between labels in dots.
pub const LABEL_GAP_DOTS: u32 = 24;

fn epl_line(buf: &mut Vec<u8>, line: &str) {
    buf.extend_from_slice(line.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Bitmap payload for `GW`: packed rows with EPL2 polarity.
pub fn gw_rows(canvas: &Canvas) -> Vec<u8> {
    let mut rows = canvas.to_row_bytes();
    for byte in &mut rows {
        *byte = !*byte;
    }
    rows
}

/// Full print job for one copy of `canvas`.
pub fn label_job(canvas: &Canvas) -> Vec<u8> {
    let rows = gw_rows(canvas);
    let mut buf = Vec::with_capacity(rows.len() + 64);

    epl_line(&mut buf, "N");
    epl_line(&mut buf, &format!("q{}", canvas.width()));
    epl_line(&mut buf, &format!("Q{},{}", canvas.height(), LABEL_GAP_DOTS));
    epl_line(
        &mut buf,
        &format!("GW0,0,{},{}", canvas.width_bytes(), canvas.height()),
    );
    buf.extend_from_slice(&rows);
    buf.extend_from_slice(b"\r\n");
    epl_line(&mut buf, "P1");

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DEFAULT_DPI, Rect, RenderMode};
    use crate::label::LabelSize;

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_job_header() {
        let canvas = Canvas::for_label(LabelSize::Standard, DEFAULT_DPI, RenderMode::Print);
        let job = label_job(&canvas);
        assert!(job.starts_with(b"N\r\nq812\r\nQ1218,24\r\nGW0,0,102,1218\r\n"));
        assert!(job.ends_with(b"\r\nP1\r\n"));
    }

    #[test]
    fn test_payload_length() {
        let canvas = Canvas::for_label(LabelSize::Compact, DEFAULT_DPI, RenderMode::Print);
        let job = label_job(&canvas);
        let header = b"GW0,0,58,254\r\n";
        let start = find(&job, header).unwrap() + header.len();
        let rows = &job[start..job.len() - b"\r\nP1\r\n".len()];
        assert_eq!(rows.len(), 58 * 254);
    }

    #[test]
    fn test_blank_canvas_is_all_white() {
        let canvas = Canvas::for_label(LabelSize::Compact, DEFAULT_DPI, RenderMode::Print);
        assert!(gw_rows(&canvas).iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_black_dot_is_cleared_bit() {
        let mut canvas = Canvas::for_label(LabelSize::Compact, DEFAULT_DPI, RenderMode::Print);
        canvas.fill_rect(Rect::new(0, 0, 1, 1));
        let rows = gw_rows(&canvas);
        assert_eq!(rows[0], 0x7F);
        assert_eq!(rows[1], 0xFF);
    }
}
