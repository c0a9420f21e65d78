//! Runtime configuration.
//!
//! Values come from `LABELKIT_*` environment variables (a `.env` file is
//! read first if present). Command-line flags override them.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `LABELKIT_LISTEN_ADDR` | `127.0.0.1:8080` |
//! | `LABELKIT_STORE_PATH` | `labelkit.json` |
//! | `LABELKIT_STORAGE_LAYOUT` | `blob` |
//! | `LABELKIT_DPI` | `203` |
//! | `LABELKIT_DEVICE` | `/dev/usb/lp0` |
//! | `LABELKIT_PRINTER` | unset |
//! | `LABELKIT_REQUIRE_SIGN_IN` | `false` |
//! | `LABELKIT_ALLOWED_EMAILS` | empty (comma-separated) |

use serde::Deserialize;
use std::path::PathBuf;

use crate::canvas::{DEFAULT_DPI, MAX_DPI, MIN_DPI};
use crate::error::LabelKitError;
use crate::print::PrintTarget;
use crate::session::AccessPolicy;
use crate::storage::StorageLayout;
use crate::transport::device::DEFAULT_DEVICE;

pub const ENV_PREFIX: &str = "LABELKIT_";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// JSON file holding the persisted label
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,

    /// `blob` or `per_field`
    #[serde(default = "default_storage_layout")]
    pub storage_layout: String,

    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Device path, or any print target string (`png:...`, `lp:...`)
    #[serde(default = "default_device")]
    pub device: String,

    /// Spooler destination; takes precedence over `device` when set
    #[serde(default)]
    pub printer: Option<String>,

    #[serde(default)]
    pub require_sign_in: bool,

    #[serde(default)]
    pub allowed_emails: Vec<String>,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_store_path() -> PathBuf {
    PathBuf::from("labelkit.json")
}

fn default_storage_layout() -> String {
    "blob".to_string()
}

fn default_dpi() -> u32 {
    DEFAULT_DPI
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            store_path: default_store_path(),
            storage_layout: default_storage_layout(),
            dpi: default_dpi(),
            device: default_device(),
            printer: None,
            require_sign_in: false,
            allowed_emails: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, LabelKitError> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env()
            .map_err(|e| LabelKitError::Config(e.to_string()))
    }

    /// Load from explicit `(name, value)` pairs instead of the process env.
    pub fn from_vars<I>(vars: I) -> Result<Self, LabelKitError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(vars)
            .map_err(|e| LabelKitError::Config(e.to_string()))
    }

    pub fn layout(&self) -> Result<StorageLayout, LabelKitError> {
        self.storage_layout.parse().map_err(LabelKitError::Config)
    }

    pub fn print_target(&self) -> Result<PrintTarget, LabelKitError> {
        if let Some(printer) = &self.printer {
            let printer = printer.trim();
            return Ok(PrintTarget::Spooler {
                printer: (!printer.is_empty()).then(|| printer.to_string()),
            });
        }
        self.device.parse().map_err(LabelKitError::Config)
    }

    pub fn access_policy(&self) -> AccessPolicy {
        if self.require_sign_in {
            AccessPolicy::SignInRequired
        } else {
            AccessPolicy::Open
        }
    }

    /// Checks that need more than deserialization.
    pub fn validate(&self) -> Result<(), LabelKitError> {
        if !(MIN_DPI..=MAX_DPI).contains(&self.dpi) {
            return Err(LabelKitError::Config(format!(
                "dpi must be between {} and {}, got {}",
                MIN_DPI, MAX_DPI, self.dpi
            )));
        }
        self.layout()?;
        self.print_target()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(vars(&[])).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.dpi, 203);
        assert_eq!(config.layout().unwrap(), StorageLayout::default());
        assert_eq!(
            config.print_target().unwrap(),
            PrintTarget::Device(PathBuf::from("/dev/usb/lp0"))
        );
        assert_eq!(config.access_policy(), AccessPolicy::Open);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_prefixed_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("LABELKIT_DPI", "300"),
            ("LABELKIT_STORAGE_LAYOUT", "per_field"),
            ("LABELKIT_REQUIRE_SIGN_IN", "true"),
            ("LABELKIT_ALLOWED_EMAILS", "a@example.com,b@example.com"),
            ("UNRELATED_DPI", "50"),
        ]))
        .unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.layout().unwrap(), StorageLayout::per_field());
        assert_eq!(config.access_policy(), AccessPolicy::SignInRequired);
        assert_eq!(config.allowed_emails, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn test_printer_wins_over_device() {
        let config = AppConfig::from_vars(vars(&[
            ("LABELKIT_DEVICE", "png:out.png"),
            ("LABELKIT_PRINTER", "Zebra"),
        ]))
        .unwrap();
        assert_eq!(
            config.print_target().unwrap(),
            PrintTarget::Spooler {
                printer: Some("Zebra".into())
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(AppConfig::from_vars(vars(&[("LABELKIT_DPI", "lots")])).is_err());

        for dpi in [0, 20, 20_000] {
            let config = AppConfig {
                dpi,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "dpi {}", dpi);
        }

        let config = AppConfig {
            storage_layout: "sqlite".into(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
