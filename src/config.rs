use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::composer::{DEFAULT_LOGO_RATIO, DEFAULT_QR_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub vietqr: VietQrConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VietQrConfig {
    /// Directory holding templates and logos
    pub assets_dir: PathBuf,
    /// Template used for `style=template`
    pub template: String,
    pub qr_size: u32,
    pub logo_ratio: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            vietqr: VietQrConfig {
                assets_dir: PathBuf::from("assets"),
                template: "VietQR.png".to_string(),
                qr_size: DEFAULT_QR_SIZE,
                logo_ratio: DEFAULT_LOGO_RATIO,
            },
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let defaults = Config::default();

        let config = Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: env_parse("PORT", defaults.server.port),
            },
            vietqr: VietQrConfig {
                assets_dir: env::var("VIETQR_ASSETS_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.vietqr.assets_dir),
                template: env::var("VIETQR_TEMPLATE").unwrap_or(defaults.vietqr.template),
                qr_size: env_parse("VIETQR_QR_SIZE", defaults.vietqr.qr_size),
                logo_ratio: env_parse("VIETQR_LOGO_RATIO", defaults.vietqr.logo_ratio),
            },
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.vietqr.qr_size == 0 {
            anyhow::bail!("QR size must be positive");
        }

        if !(self.vietqr.logo_ratio > 0.0 && self.vietqr.logo_ratio <= 1.0) {
            anyhow::bail!(
                "Logo ratio must be in (0, 1], got: {}",
                self.vietqr.logo_ratio
            );
        }

        if self.vietqr.template.is_empty() {
            anyhow::bail!("Template name must not be empty");
        }

        if !self.vietqr.assets_dir.is_dir() {
            log::warn!(
                "Assets directory {} does not exist, templates and logos will be skipped",
                self.vietqr.assets_dir.display()
            );
        }

        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.vietqr.qr_size, 360);
        assert_eq!(config.vietqr.template, "VietQR.png");
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = Config::default();
        config.vietqr.qr_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.vietqr.logo_ratio = 0.0;
        assert!(config.validate().is_err());

        config.vietqr.logo_ratio = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_parse_falls_back_on_garbage() {
        assert_eq!(env_parse("VIETQR_TEST_UNSET_KEY", 42u16), 42);
    }
}
