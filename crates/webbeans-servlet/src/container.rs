//! # Container Contract
//!
//! A [`Container`] adapts the injection runtime to one servlet host. The
//! [`Listener`](crate::listener::Listener) asks every known container whether
//! it recognizes the current host (`touch`) and initializes the first one that
//! does.

use crate::context::ContainerContext;
use crate::error::EnvironmentError;
use async_trait::async_trait;
use std::collections::HashSet;

/// Answers whether a named class or resource is available to the web application.
pub trait ResourceLoader: Send + Sync {
    fn has_class(&self, name: &str) -> bool;
}

/// A loader backed by a fixed set of names.
#[derive(Debug, Default, Clone)]
pub struct StaticResourceLoader {
    names: HashSet<String>,
}

impl StaticResourceLoader {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceLoader for StaticResourceLoader {
    fn has_class(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

#[async_trait]
pub trait Container: Send + Sync {
    /// Name used for logging and for selecting a container through configuration.
    fn name(&self) -> &str;

    /// Whether this container recognizes the host.
    async fn touch(
        &self,
        loader: &dyn ResourceLoader,
        context: &ContainerContext,
    ) -> Result<bool, EnvironmentError>;

    /// Installs whatever the host needs to inject into the objects it creates.
    ///
    /// Failures are logged, not returned; a failed integration leaves the
    /// application running without injection.
    async fn initialize(&self, context: &ContainerContext);

    async fn destroy(&self, _context: &ContainerContext) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_loader() {
        let loader = StaticResourceLoader::new(["a.B", "c.D"]);
        assert!(loader.has_class("a.B"));
        assert!(!loader.has_class("e.F"));
    }
}
