use config::{Config, ConfigError as BaseConfigError, File};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_file_size_bytes: u64,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct SessionConfig {
    pub cookie_name: String,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct SecurityConfig {
    pub password_pepper: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct UiConfig {
    pub brand_name: String,
}

#[derive(Debug, Deserialize, Clone, Serialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Config(#[from] BaseConfigError),
    #[error("Upload directory error: {0}")]
    UploadDir(String),
    #[error("Invalid configuration: {0}")]
    Validation(String),
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut settings = Config::builder();

        // Add default settings
        settings = settings.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        settings = settings.add_source(File::with_name("config").required(false));

        // Add environment variables with explicit mapping for nested fields
        settings = settings
            .set_override(
                "server.bind_addr",
                std::env::var("SERVER_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string()),
            )?
            .set_override(
                "server.port",
                std::env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse::<u16>()
                    .unwrap_or(8080),
            )?
            .set_override(
                "storage.upload_dir",
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
            )?
            .set_override(
                "storage.max_file_size_bytes",
                std::env::var("MAX_FILE_SIZE_BYTES")
                    .unwrap_or_else(|_| "52428800".to_string())
                    .parse::<u64>()
                    .unwrap_or(52_428_800),
            )?
            .set_override(
                "session.cookie_name",
                std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "username".to_string()),
            )?
            .set_override(
                "security.password_pepper",
                std::env::var("PASSWORD_PEPPER").ok(),
            )?
            .set_override(
                "ui.brand_name",
                std::env::var("UI_BRAND_NAME").unwrap_or_else(|_| "JamHub".to_string()),
            )?;

        let settings = settings.build()?;

        let config: AppConfig = settings.try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.storage.max_file_size_bytes < 1024 {
            return Err(ConfigError::Validation(
                "MAX_FILE_SIZE_BYTES must be at least 1KB".to_string(),
            ));
        }
        if self.storage.max_file_size_bytes > 5 * 1024 * 1024 * 1024 {
            return Err(ConfigError::Validation(
                "MAX_FILE_SIZE_BYTES cannot exceed 5GB".to_string(),
            ));
        }

        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Validation(
                "SESSION_COOKIE_NAME must be a non-empty token".to_string(),
            ));
        }

        // Ensure the upload directory exists or can be created
        if let Err(e) = fs::create_dir_all(&self.storage.upload_dir) {
            return Err(ConfigError::UploadDir(format!(
                "Cannot create upload directory {}: {}",
                self.storage.upload_dir.display(),
                e
            )));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "0.0.0.0".to_string(),
                port: 8080,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from("./uploads"),
                max_file_size_bytes: 50 * 1024 * 1024, // 50MB
            },
            // The session cookie keeps the historical `username` name; its
            // value is an opaque token, never the username itself.
            session: SessionConfig {
                cookie_name: "username".to_string(),
            },
            security: SecurityConfig {
                password_pepper: None,
            },
            ui: UiConfig {
                brand_name: "JamHub".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes_validation() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.cookie_name, "username");
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn cookie_name_must_be_a_token() {
        let mut config = AppConfig::default();
        config.storage.upload_dir = std::env::temp_dir().join("jamhub-config-test");
        config.session.cookie_name = "bad name;".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn tiny_size_limit_is_rejected() {
        let mut config = AppConfig::default();
        config.storage.max_file_size_bytes = 16;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation(_))
        ));
    }
}
