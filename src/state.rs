use std::sync::Arc;

use crate::config::PlatformSettings;
use crate::db::{DbPool, OrmConn};
use crate::notify::{LogNotifier, Notifier};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub settings: PlatformSettings,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, settings: PlatformSettings) -> Self {
        Self {
            pool,
            orm,
            settings,
            notifier: Arc::new(LogNotifier),
        }
    }
}
