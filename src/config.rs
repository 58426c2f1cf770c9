use std::path::PathBuf;

/// Application configuration, resolved once at startup.
///
/// Backend selection is the one decision that matters here: development mode
/// (explicit `DEV_MODE=true`, or simply no `DATABASE_URL` configured) runs
/// against the file-backed local store; anything else connects to Postgres.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub dev_mode: bool,
    /// Directory holding the local store's collection files.
    pub local_data_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            dev_mode: std::env::var("DEV_MODE")
                .map(|v| v == "true")
                .unwrap_or(false),
            local_data_dir: std::env::var("LOCAL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./data")),
        })
    }

    pub fn development_mode(&self) -> bool {
        self.dev_mode || self.database_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_mode_when_no_database_configured() {
        let config = AppConfig {
            database_url: None,
            dev_mode: false,
            local_data_dir: PathBuf::from("./data"),
        };
        assert!(config.development_mode());
    }

    #[test]
    fn explicit_dev_flag_wins_over_database_url() {
        let config = AppConfig {
            database_url: Some("postgres://localhost/rollcall".into()),
            dev_mode: true,
            local_data_dir: PathBuf::from("./data"),
        };
        assert!(config.development_mode());
    }

    #[test]
    fn database_url_without_flag_selects_remote() {
        let config = AppConfig {
            database_url: Some("postgres://localhost/rollcall".into()),
            dev_mode: false,
            local_data_dir: PathBuf::from("./data"),
        };
        assert!(!config.development_mode());
    }
}
