//! Dashboard configuration.
//!
//! Priority: environment variables > config file > defaults.

use crate::error::{ConfigError, Result};
use crate::transport::Endpoint;
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default display host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default display port.
pub const DEFAULT_PORT: u16 = 9838;

/// Config file probed in the working directory.
pub const CONFIG_FILE: &str = "fob-dashboard.json";

/// Prefix of the environment variables that override the config file.
pub const ENV_PREFIX: &str = "FOB_DASHBOARD_";

/// File name of the cache under the home directory.
pub const CACHE_FILENAME: &str = ".fob-dashboard-cache.db";

/// Where the display lives and which project it reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardConfig {
    /// Display host
    #[serde(default = "default_host")]
    pub host: String,

    /// Display port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Explicit project root, skips root inference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            root: None,
        }
    }
}

impl DashboardConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// `config_path` replaces the `fob-dashboard.json` probe when given.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = config_path.map(Path::to_path_buf).or_else(|| {
            let default_path = Path::new(CONFIG_FILE);
            default_path.exists().then(|| default_path.to_path_buf())
        });

        if let Some(path) = config_file {
            figment = figment.merge(Json::file(path));
        }

        // FOB_DASHBOARD_HOST, FOB_DASHBOARD_PORT, FOB_DASHBOARD_ROOT
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment
            .extract()
            .map_err(|e| ConfigError::Extract(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field values.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "host".to_string(),
                value: self.host.clone(),
                hint: format!("Use a host name or IP address, e.g. {}", DEFAULT_HOST),
            }
            .into());
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "port".to_string(),
                value: "0".to_string(),
                hint: format!("Use a port between 1 and 65535 (default {})", DEFAULT_PORT),
            }
            .into());
        }

        Ok(())
    }

    /// Address of the display.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }

    /// Location of the on-disk cache, if a home directory exists.
    pub fn cache_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CACHE_FILENAME))
    }
}
