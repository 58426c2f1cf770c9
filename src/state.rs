use std::sync::Arc;

use axum::extract::FromRef;

use crate::auth::sessions::Sessions;
use crate::config::AppConfig;
use crate::store::{self, AttendanceStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AttendanceStore>,
    pub sessions: Arc<Sessions>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let store = store::init_store(&config).await?;
        Ok(Self {
            store,
            sessions: Arc::new(Sessions::default()),
            config,
        })
    }

    /// State backed by a throwaway local store, for handler tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        let dir = std::env::temp_dir().join(format!("rollcall-state-{}", uuid::Uuid::new_v4()));
        Self {
            store: Arc::new(store::LocalStore::new(dir)),
            sessions: Arc::new(Sessions::default()),
            config: Arc::new(AppConfig {
                database_url: None,
                dev_mode: true,
                local_data_dir: std::path::PathBuf::from("./data"),
            }),
        }
    }
}

impl FromRef<AppState> for Arc<Sessions> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
