//! # Configuration Module
//!
//! Router settings, loaded from defaults, a YAML file or environment variables.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `SWITCHYARD_SEPARATOR` | `#` | splits `controller#action` endpoint names |
//! | `SWITCHYARD_NAMESPACE` | empty | scope prepended to endpoint names |
//! | `SWITCHYARD_PREFIX` | empty | path prefix prepended to every template |
//! | `SWITCHYARD_BASE_URL` | `http://localhost` | origin used by `url_for` |
//!
//! ## Usage
//!
//! ```rust
//! use switchyard::config::RouterConfig;
//!
//! let config = RouterConfig::from_env();
//! assert!(!config.separator.is_empty());
//! ```
//!
//! A YAML file may set any subset of the fields:
//!
//! ```yaml
//! separator: "#"
//! namespace: Web
//! prefix: /api
//! base_url: https://books.example.com
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Router settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Separator between controller and action in endpoint names
    pub separator: String,
    /// Namespace applied to endpoint names when a route does not give one
    pub namespace: String,
    /// Path prefix for every registered template and mount
    pub prefix: String,
    /// Scheme, host and optional base path for `url_for`
    pub base_url: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            separator: "#".to_string(),
            namespace: String::new(),
            prefix: String::new(),
            base_url: "http://localhost".to_string(),
        }
    }
}

impl RouterConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults. Values the router cannot use are
    /// replaced by the default and logged at `warn`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let separator = match lookup("SWITCHYARD_SEPARATOR") {
            Some(v) if v.is_empty() => {
                warn!(var = "SWITCHYARD_SEPARATOR", "Empty separator - using default");
                defaults.separator
            }
            Some(v) => v,
            None => defaults.separator,
        };

        let prefix = match lookup("SWITCHYARD_PREFIX") {
            Some(v) if !v.is_empty() && !v.starts_with('/') => {
                warn!(var = "SWITCHYARD_PREFIX", value = %v, "Prefix must start with '/' - using default");
                defaults.prefix
            }
            Some(v) => v,
            None => defaults.prefix,
        };

        let base_url = match lookup("SWITCHYARD_BASE_URL") {
            Some(v) if url::Url::parse(v.trim()).is_err() => {
                warn!(var = "SWITCHYARD_BASE_URL", value = %v, "Invalid base URL - using default");
                defaults.base_url
            }
            Some(v) => v.trim().to_string(),
            None => defaults.base_url,
        };

        Self {
            separator,
            namespace: lookup("SWITCHYARD_NAMESPACE").unwrap_or(defaults.namespace),
            prefix,
            base_url,
        }
    }

    /// Load and validate a YAML configuration file
    ///
    /// # Errors
    ///
    /// I/O, YAML and validation failures, with the file path as context.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&data)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Reject settings the router cannot work with
    ///
    /// # Errors
    ///
    /// Empty separator, a prefix not starting with `/`, or a base URL that
    /// does not parse.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            bail!("separator must not be empty");
        }
        if !self.prefix.is_empty() && !self.prefix.starts_with('/') {
            bail!("prefix '{}' must start with '/'", self.prefix);
        }
        url::Url::parse(&self.base_url)
            .with_context(|| format!("base_url '{}' is not a valid URL", self.base_url))?;
        Ok(())
    }
}
