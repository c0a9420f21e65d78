//! # labelkit - FBA Label Designer
//!
//! labelkit builds Amazon FBA item labels: a CODE128 barcode of the FNSKU
//! with the product title, condition and SKU, laid out on a fixed-size label
//! at thermal printer resolution. It provides:
//!
//! - **Label model**: normalization, advisory checks, autosaving editor
//! - **Barcodes**: CODE128 encoding and bar/text geometry
//! - **Canvas**: 1-bit label compositor shared by preview and print
//! - **Storage**: persisted editor state behind a key-value trait
//! - **Session**: optional sign-in gate behind a provider trait
//! - **Printing**: EPL2 raw device output, `lp` spooler and PNG
//!
//! ## Quick Start
//!
//! ```no_run
//! use labelkit::{
//!     canvas::{DEFAULT_DPI, RenderMode},
//!     label::{Condition, LabelRecord},
//!     preview::LivePreview,
//!     print::{self, PrintTarget},
//! };
//!
//! let mut record = LabelRecord::default();
//! record.set_identifier("x001234567");
//! record.set_title("Silicone Spatula Set");
//! record.set_condition(Condition::UsedGood);
//!
//! let mut preview = LivePreview::new(DEFAULT_DPI);
//!
//! // What the editor shows
//! let png = preview.canvas(&record, RenderMode::Preview { safe_zone: true }).to_png()?;
//!
//! // What the printer gets: the same layout, without the guide
//! let canvas = preview.print_canvas(&record)?;
//! print::print(&canvas, &PrintTarget::Device("/dev/usb/lp0".into()))?;
//!
//! # let _ = png;
//! # Ok::<(), labelkit::LabelKitError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Label record, sizes, conditions, editor |
//! | [`barcode`] | CODE128 symbol rendering |
//! | [`canvas`] | Label compositor and bitmap output |
//! | [`preview`] | Last-good preview state |
//! | [`storage`] | Persistence backends and layouts |
//! | [`session`] | Identity provider boundary and access policy |
//! | [`print`] | Print targets and EPL2 jobs |
//! | [`transport`] | Raw device output |
//! | [`server`] | HTTP editor and JSON API |
//! | [`config`] | Environment configuration |
//! | [`error`] | Error types |

pub mod barcode;
pub mod canvas;
pub mod config;
pub mod error;
pub mod label;
pub mod preview;
pub mod print;
pub mod server;
pub mod session;
pub mod storage;
pub mod transport;

// Re-exports for convenience
pub use barcode::BarcodeSymbol;
pub use canvas::Canvas;
pub use error::LabelKitError;
pub use label::{LabelEditor, LabelRecord};
pub use print::PrintTarget;
