//! # Print Handoff
//!
//! Sends a composed label to a printer or file.
//!
//! | Target | Parsed from | Output |
//! |--------|-------------|--------|
//! | [`PrintTarget::Device`] | `/dev/usb/lp0` | EPL2 job, raw bytes |
//! | [`PrintTarget::Spooler`] | `lp:<printer>` (`lp:` = default) | PNG piped into `lp` |
//! | [`PrintTarget::Png`] | `png:<path>` | PNG file |
//!
//! Only canvases composed in [`RenderMode::Print`] are accepted, so the
//! preview safe-zone guide can never reach paper.

pub mod epl2;

use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::canvas::{Canvas, RenderMode};
use crate::error::PrintError;
use crate::label::LabelSize;
use crate::transport::DeviceTransport;

/// Where a label goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintTarget {
    /// Raw EPL2 to a printer device node.
    Device(PathBuf),
    /// Host print spooler. `None` uses the default destination.
    Spooler { printer: Option<String> },
    /// Write the label image to a file.
    Png(PathBuf),
}

impl Default for PrintTarget {
    fn default() -> Self {
        Self::Device(PathBuf::from(crate::transport::device::DEFAULT_DEVICE))
    }
}

impl fmt::Display for PrintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device(path) => write!(f, "{}", path.display()),
            Self::Spooler { printer } => write!(f, "lp:{}", printer.as_deref().unwrap_or("")),
            Self::Png(path) => write!(f, "png:{}", path.display()),
        }
    }
}

impl FromStr for PrintTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty print target".into());
        }
        if let Some(path) = s.strip_prefix("png:") {
            if path.is_empty() {
                return Err("png: target needs a path".into());
            }
            return Ok(Self::Png(PathBuf::from(path)));
        }
        if let Some(printer) = s.strip_prefix("lp:") {
            let printer = printer.trim();
            return Ok(Self::Spooler {
                printer: (!printer.is_empty()).then(|| printer.to_string()),
            });
        }
        Ok(Self::Device(PathBuf::from(s)))
    }
}

/// Print one copy of `canvas` on `target`.
///
/// Blocking; call from `spawn_blocking` in async contexts.
pub fn print(canvas: &Canvas, target: &PrintTarget) -> Result<(), PrintError> {
    if canvas.mode() != RenderMode::Print {
        return Err(PrintError::PreviewCanvas);
    }
    if !canvas.has_barcode() {
        return Err(PrintError::EmptyLabel);
    }

    tracing::info!(
        print_target = %target,
        size = %canvas.label_size(),
        width = canvas.width(),
        height = canvas.height(),
        "printing label"
    );

    match target {
        PrintTarget::Device(path) => {
            let mut transport = DeviceTransport::open(path)?;
            transport.write_all(&epl2::label_job(canvas))
        }
        PrintTarget::Spooler { printer } => {
            let png = to_png(canvas)?;
            spool(printer.as_deref(), canvas.label_size(), &png)
        }
        PrintTarget::Png(path) => {
            let png = to_png(canvas)?;
            std::fs::write(path, png)?;
            Ok(())
        }
    }
}

fn to_png(canvas: &Canvas) -> Result<Vec<u8>, PrintError> {
    canvas.to_png().map_err(|e| PrintError::Image(e.to_string()))
}

/// CUPS media name for a label size.
pub fn media_option(size: LabelSize) -> String {
    format!("media=Custom.{}in", size.tag())
}

/// Arguments for `lp`, reading the document from stdin.
pub fn spooler_args(printer: Option<&str>, size: LabelSize) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(printer) = printer {
        args.push("-d".to_string());
        args.push(printer.to_string());
    }
    args.push("-o".to_string());
    args.push(media_option(size));
    args.push("-o".to_string());
    args.push("fit-to-page".to_string());
    args.push("-".to_string());
    args
}

fn spool(printer: Option<&str>, size: LabelSize, png: &[u8]) -> Result<(), PrintError> {
    let mut child = Command::new("lp")
        .args(spooler_args(printer, size))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PrintError::Spooler(format!("Failed to run 'lp': {}", e)))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin
            .write_all(png)
            .map_err(|e| PrintError::Spooler(format!("Failed to send job to 'lp': {}", e)))?;
    }

    let output = child
        .wait_with_output()
        .map_err(|e| PrintError::Spooler(format!("'lp' did not finish: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PrintError::Spooler(format!(
            "'lp' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    tracing::debug!(
        response = %String::from_utf8_lossy(&output.stdout).trim(),
        "job queued"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barcode::{RenderOptions, render};
    use crate::canvas::{DEFAULT_DPI, compose};
    use crate::label::LabelRecord;

    fn record() -> LabelRecord {
        let mut record = LabelRecord::default();
        record.set_identifier("X001234567");
        record.set_title("Silicone Spatula Set");
        record
    }

    fn canvas(record: &LabelRecord, mode: RenderMode) -> Canvas {
        let symbol = render(
            &record.identifier,
            &RenderOptions::for_label(record.label_size, DEFAULT_DPI),
        )
        .unwrap();
        compose(record, Some(&symbol), DEFAULT_DPI, mode)
    }

    #[test]
    fn test_target_from_str() {
        assert_eq!(
            "/dev/usb/lp0".parse(),
            Ok(PrintTarget::Device(PathBuf::from("/dev/usb/lp0")))
        );
        assert_eq!(
            "png:/tmp/label.png".parse(),
            Ok(PrintTarget::Png(PathBuf::from("/tmp/label.png")))
        );
        assert_eq!(
            "lp:Zebra_LP2844".parse(),
            Ok(PrintTarget::Spooler {
                printer: Some("Zebra_LP2844".into())
            })
        );
        assert_eq!("lp:".parse(), Ok(PrintTarget::Spooler { printer: None }));
        assert!("".parse::<PrintTarget>().is_err());
        assert!("png:".parse::<PrintTarget>().is_err());
    }

    #[test]
    fn test_target_display_round_trip() {
        for s in ["/dev/usb/lp0", "png:out.png", "lp:Zebra", "lp:"] {
            let target: PrintTarget = s.parse().unwrap();
            assert_eq!(target.to_string(), s);
        }
    }

    #[test]
    fn test_spooler_args() {
        assert_eq!(
            spooler_args(Some("Zebra"), LabelSize::Compact),
            vec!["-d", "Zebra", "-o", "media=Custom.2.25x1.25in", "-o", "fit-to-page", "-"]
        );
        assert_eq!(
            spooler_args(None, LabelSize::Standard),
            vec!["-o", "media=Custom.4x6in", "-o", "fit-to-page", "-"]
        );
    }

    #[test]
    fn test_refuses_preview_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        let preview = canvas(&record(), RenderMode::Preview { safe_zone: false });
        let result = print(&preview, &PrintTarget::Png(path.clone()));
        assert!(matches!(result, Err(PrintError::PreviewCanvas)));
        assert!(!path.exists());
    }

    #[test]
    fn test_refuses_empty_label() {
        let dir = tempfile::tempdir().unwrap();
        let empty = compose(&LabelRecord::default(), None, DEFAULT_DPI, RenderMode::Print);
        let result = print(&empty, &PrintTarget::Png(dir.path().join("label.png")));
        assert!(matches!(result, Err(PrintError::EmptyLabel)));
    }

    #[test]
    fn test_print_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        print(&canvas(&record(), RenderMode::Print), &PrintTarget::Png(path.clone())).unwrap();

        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (812, 1218));
    }

    #[test]
    fn test_print_to_device_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lp0");
        std::fs::write(&path, b"").unwrap();

        let label = canvas(&record(), RenderMode::Print);
        print(&label, &PrintTarget::Device(path.clone())).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), epl2::label_job(&label));
    }
}
