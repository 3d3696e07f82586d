//! # Bootstrap Listener
//!
//! Hooks the injection runtime into the host's context lifecycle. On
//! [`context_initialized`](Listener::context_initialized) it selects one
//! container and initializes it; on
//! [`context_destroyed`](Listener::context_destroyed) it tears that container
//! down again.
//!
//! ## Selection
//!
//! 1. Disabled by configuration: nothing is initialized.
//! 2. A container named by configuration: that container, without probing.
//! 3. Otherwise the first container whose `touch` answers `true`, in
//!    registration order. A failing probe is logged and skipped.
//!
//! Each listener initializes at most one container, at most once.

use crate::config::EnvironmentConfig;
use crate::container::{Container, ResourceLoader, StaticResourceLoader};
use crate::context::ContainerContext;
use crate::jetty::{JettyContainer, JettyLegacyContainer};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

enum State {
    Pending,
    Started(Option<Arc<dyn Container>>),
    Stopped,
}

pub struct Listener {
    containers: Vec<Arc<dyn Container>>,
    loader: Arc<dyn ResourceLoader>,
    config: EnvironmentConfig,
    state: Mutex<State>,
}

impl Listener {
    pub fn new(
        containers: Vec<Arc<dyn Container>>,
        loader: Arc<dyn ResourceLoader>,
        config: EnvironmentConfig,
    ) -> Self {
        Self {
            containers,
            loader,
            config,
            state: Mutex::new(State::Pending),
        }
    }

    /// A listener knowing the Jetty containers, probing with an empty resource loader.
    pub fn with_defaults(config: EnvironmentConfig) -> Self {
        Self::new(
            vec![Arc::new(JettyContainer), Arc::new(JettyLegacyContainer)],
            Arc::new(StaticResourceLoader::default()),
            config,
        )
    }

    pub fn with_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Selects and initializes a container. Returns its name, or `None` if none applies.
    ///
    /// Calls after the first return the first call's outcome without doing anything.
    pub async fn context_initialized(&self, context: &ContainerContext) -> Option<String> {
        let mut state = self.state.lock().await;
        match &*state {
            State::Started(active) => {
                debug!("Listener already initialized");
                return active.as_ref().map(|c| c.name().to_string());
            }
            State::Stopped => {
                debug!("Listener already destroyed");
                return None;
            }
            State::Pending => {}
        }

        let config = self
            .config
            .clone()
            .with_servlet_context(context.servlet_context());
        let selected = if config.enabled {
            self.select(&config, context).await
        } else {
            info!("Servlet environment disabled");
            None
        };

        if let Some(container) = &selected {
            info!(container = container.name(), "Initializing container");
            container.initialize(context).await;
        }
        let name = selected.as_ref().map(|c| c.name().to_string());
        *state = State::Started(selected);
        name
    }

    /// Destroys the container chosen by [`context_initialized`](Self::context_initialized), once.
    pub async fn context_destroyed(&self, context: &ContainerContext) {
        let mut state = self.state.lock().await;
        if let State::Started(Some(container)) = &*state {
            info!(container = container.name(), "Destroying container");
            container.destroy(context).await;
        }
        *state = State::Stopped;
    }

    async fn select(
        &self,
        config: &EnvironmentConfig,
        context: &ContainerContext,
    ) -> Option<Arc<dyn Container>> {
        if let Some(forced) = &config.container {
            let found = self
                .containers
                .iter()
                .find(|c| c.name().eq_ignore_ascii_case(forced))
                .cloned();
            if found.is_none() {
                warn!(container = %forced, "Configured container is unknown");
            }
            return found;
        }

        for container in &self.containers {
            match container.touch(self.loader.as_ref(), context).await {
                Ok(true) => {
                    info!(container = container.name(), "Container detected");
                    return Some(container.clone());
                }
                Ok(false) => debug!(container = container.name(), "Container not detected"),
                Err(error) => {
                    warn!(container = container.name(), error = %error, "Container probe failed")
                }
            }
        }
        info!("No supported container detected, injection into host objects is unavailable");
        None
    }
}
