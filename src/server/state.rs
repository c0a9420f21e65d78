//! Server state shared across handlers.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::error::LabelKitError;
use crate::label::LabelEditor;
use crate::preview::LivePreview;
use crate::print::PrintTarget;
use crate::session::{AccessPolicy, LocalSessionProvider, SessionProvider, SessionTokens};
use crate::storage::{FileStore, KeyValueStore, LabelStore};

/// Application state shared across handlers.
pub struct AppState {
    pub config: AppConfig,
    pub editor: RwLock<LabelEditor>,
    pub preview: RwLock<LivePreview>,
    pub sessions: Arc<dyn SessionProvider>,
    /// Signed-in clients, by token.
    pub tokens: SessionTokens,
    pub policy: AccessPolicy,
    pub print_target: PrintTarget,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        editor: LabelEditor,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, LabelKitError> {
        config.validate()?;
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();

        Ok(Self {
            preview: RwLock::new(LivePreview::new(config.dpi)),
            editor: RwLock::new(editor),
            sessions,
            tokens: SessionTokens::new(),
            policy: config.access_policy(),
            print_target: config.print_target()?,
            boot_time,
            config,
        })
    }

    /// File-backed editor and a local session provider, as configured.
    pub fn from_config(config: AppConfig) -> Result<Self, LabelKitError> {
        let backend: Box<dyn KeyValueStore> = Box::new(FileStore::new(&config.store_path));
        let editor = LabelEditor::with_store(LabelStore::new(backend, config.layout()?));

        let sessions: Arc<dyn SessionProvider> = if config.allowed_emails.is_empty() {
            Arc::new(LocalSessionProvider::new())
        } else {
            Arc::new(LocalSessionProvider::with_allowed_emails(&config.allowed_emails))
        };

        Self::new(config, editor, sessions)
    }
}
