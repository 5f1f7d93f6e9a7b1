use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::db;
use crate::mail::{self, MailTransport};

/// Everything the handlers share. The store connection sits behind one
/// async mutex; each handler takes the lock for the duration of its reads
/// and writes and releases it before any mail goes out.
pub struct AppState {
    pub db: Mutex<Connection>,
    pub mailer: Arc<dyn MailTransport>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let conn = db::open_store(&config.db_dir)?;
        let mailer = mail::from_config(config.mail.as_ref())?;
        Ok(Self::with_parts(conn, mailer, config))
    }

    /// Assembles state from already-built parts. Lets tests swap in a
    /// scratch store and a recording transport.
    pub fn with_parts(
        conn: Connection,
        mailer: Arc<dyn MailTransport>,
        config: Config,
    ) -> Arc<Self> {
        Arc::new(Self {
            db: Mutex::new(conn),
            mailer,
            config,
        })
    }
}
