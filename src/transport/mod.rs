//! # Printer Transport Layer
//!
//! Communication backends for sending raw print jobs to label printers.
//!
//! ## Available Transports
//!
//! - [`device`]: raw writes to a printer device node (USB `lp`, serial,
//!   Bluetooth RFCOMM) or any file

pub mod device;

pub use device::DeviceTransport;
