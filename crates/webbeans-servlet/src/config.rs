//! # Environment Configuration
//!
//! Layered with `figment`, lowest precedence first:
//!
//! 1. [`EnvironmentConfig::default`] - enabled, container auto-detected.
//! 2. Environment variables prefixed with `WEBBEANS_` (`WEBBEANS_ENABLED`,
//!    `WEBBEANS_CONTAINER`).
//! 3. The servlet init parameter [`CONTAINER_INIT_PARAMETER`], applied with
//!    [`EnvironmentConfig::with_servlet_context`].

use crate::context::ServletContext;
use crate::error::EnvironmentError;
use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "WEBBEANS_";
pub const CONTAINER_INIT_PARAMETER: &str = "webbeans.environment.container";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// When false the listener never initializes a container.
    pub enabled: bool,
    /// Name of the container to use instead of probing, e.g. `jetty`.
    pub container: Option<String>,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            container: None,
        }
    }
}

impl EnvironmentConfig {
    /// Defaults merged with `WEBBEANS_*` environment variables.
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, EnvironmentError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, EnvironmentError> {
        Ok(figment.extract()?)
    }

    /// Applies the container init parameter, if the host set one.
    pub fn with_servlet_context(mut self, servlet_context: &dyn ServletContext) -> Self {
        if let Some(container) = servlet_context.init_parameter(CONTAINER_INIT_PARAMETER) {
            self.container = Some(container);
        }
        self
    }
}
