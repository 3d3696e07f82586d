//! # Jetty Containers
//!
//! [`JettyContainer`] targets hosts whose `decorate` module registers a
//! decorating listener. The module advertises itself by setting
//! [`JETTY_DECORATING_ATTRIBUTE`] to the name of the attribute it watches; a
//! decorator stored under that name is applied to every object the host creates.
//!
//! A host may instead run its own `cdi-spi` integration, advertised by
//! [`JETTY_CDI_ATTRIBUTE`] = [`JETTY_CDI_VALUE`]. The container is still
//! selected in that case but installs nothing.
//!
//! [`JettyLegacyContainer`] covers hosts without the decorating listener; it
//! is detected by the presence of the servlet handler class and only installs
//! the injector.

use crate::container::{Container, ResourceLoader};
use crate::context::{ContainerContext, ServletContext};
use crate::error::EnvironmentError;
use crate::injector::{Decorator, JettyInjector};
use async_trait::async_trait;
use tracing::{info, warn};

pub const JETTY_DECORATING_ATTRIBUTE: &str = "org.eclipse.jetty.webapp.DecoratingListener";
pub const JETTY_CDI_ATTRIBUTE: &str = "org.eclipse.jetty.cdi";
pub const JETTY_CDI_VALUE: &str = "CdiDecorator";

/// Class whose presence identifies a legacy Jetty host.
pub const JETTY_LEGACY_PROBE_CLASS: &str = "org.eclipse.jetty.servlet.ServletHandler";

fn cdi_spi_enabled(servlet_context: &dyn ServletContext) -> bool {
    servlet_context.string_attribute(JETTY_CDI_ATTRIBUTE).as_deref() == Some(JETTY_CDI_VALUE)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JettyContainer;

impl JettyContainer {
    pub const NAME: &'static str = "jetty";

    fn integrate(&self, context: &ContainerContext) -> Result<(), EnvironmentError> {
        JettyInjector::install(context);
        Decorator::process(context.servlet_context())?;
        Ok(())
    }
}

#[async_trait]
impl Container for JettyContainer {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn touch(
        &self,
        _loader: &dyn ResourceLoader,
        context: &ContainerContext,
    ) -> Result<bool, EnvironmentError> {
        let servlet_context = context.servlet_context();
        Ok(servlet_context
            .string_attribute(JETTY_DECORATING_ATTRIBUTE)
            .is_some()
            || cdi_spi_enabled(servlet_context))
    }

    async fn initialize(&self, context: &ContainerContext) {
        if cdi_spi_enabled(context.servlet_context()) {
            info!(container = Self::NAME, "Jetty CDI SPI is supported, skipping injector installation");
            return;
        }
        if let Err(error) = self.integrate(context) {
            warn!(container = Self::NAME, error = %error, "Unable to create Jetty injector");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JettyLegacyContainer;

impl JettyLegacyContainer {
    pub const NAME: &'static str = "jetty-legacy";
}

#[async_trait]
impl Container for JettyLegacyContainer {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn touch(
        &self,
        loader: &dyn ResourceLoader,
        _context: &ContainerContext,
    ) -> Result<bool, EnvironmentError> {
        Ok(loader.has_class(JETTY_LEGACY_PROBE_CLASS))
    }

    async fn initialize(&self, context: &ContainerContext) {
        JettyInjector::install(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::StaticResourceLoader;
    use crate::context::InMemoryServletContext;
    use crate::injector::INJECTOR_ATTRIBUTE_NAME;
    use crate::mock::RecordingServletContext;
    use std::sync::Arc;
    use webbeans::BeanManager;

    fn container_context(servlet_context: Arc<dyn ServletContext>) -> ContainerContext {
        ContainerContext::new(servlet_context, Arc::new(BeanManager::new()))
    }

    #[tokio::test]
    async fn test_touch_detects_decorating_listener() {
        let context = container_context(Arc::new(
            InMemoryServletContext::new()
                .with_attribute(JETTY_DECORATING_ATTRIBUTE, "jetty.decorator".to_string()),
        ));
        let loader = StaticResourceLoader::default();
        assert!(JettyContainer.touch(&loader, &context).await.unwrap());
    }

    #[tokio::test]
    async fn test_touch_detects_cdi_spi() {
        let context = container_context(Arc::new(
            InMemoryServletContext::new()
                .with_attribute(JETTY_CDI_ATTRIBUTE, JETTY_CDI_VALUE.to_string()),
        ));
        let loader = StaticResourceLoader::default();
        assert!(JettyContainer.touch(&loader, &context).await.unwrap());
    }

    #[tokio::test]
    async fn test_touch_rejects_non_string_attribute() {
        let context = container_context(Arc::new(
            InMemoryServletContext::new()
                .with_attribute(JETTY_DECORATING_ATTRIBUTE, 42u32)
                .with_attribute(JETTY_CDI_ATTRIBUTE, "SomethingElse".to_string()),
        ));
        let loader = StaticResourceLoader::default();
        assert!(!JettyContainer.touch(&loader, &context).await.unwrap());
    }

    #[tokio::test]
    async fn test_initialize_installs_injector_and_decorator() {
        let servlet_context = Arc::new(RecordingServletContext::new(
            InMemoryServletContext::new()
                .with_attribute(JETTY_DECORATING_ATTRIBUTE, "jetty.decorator".to_string()),
        ));
        let context = container_context(servlet_context.clone());

        JettyContainer.initialize(&context).await;

        assert_eq!(servlet_context.set_count(INJECTOR_ATTRIBUTE_NAME), 1);
        assert_eq!(servlet_context.set_count("jetty.decorator"), 1);
        assert!(Decorator::lookup(&*servlet_context).is_some());
    }

    #[tokio::test]
    async fn test_initialize_twice_registers_once() {
        let servlet_context = Arc::new(RecordingServletContext::new(
            InMemoryServletContext::new()
                .with_attribute(JETTY_DECORATING_ATTRIBUTE, "jetty.decorator".to_string()),
        ));
        let context = container_context(servlet_context.clone());

        JettyContainer.initialize(&context).await;
        JettyContainer.initialize(&context).await;

        assert_eq!(servlet_context.set_count(INJECTOR_ATTRIBUTE_NAME), 1);
        assert_eq!(servlet_context.set_count("jetty.decorator"), 1);
        assert_eq!(servlet_context.total_sets(), 2);
    }

    #[tokio::test]
    async fn test_initialize_with_cdi_spi_installs_nothing() {
        let servlet_context = Arc::new(RecordingServletContext::new(
            InMemoryServletContext::new()
                .with_attribute(JETTY_CDI_ATTRIBUTE, JETTY_CDI_VALUE.to_string())
                .with_attribute(JETTY_DECORATING_ATTRIBUTE, "jetty.decorator".to_string()),
        ));
        let context = container_context(servlet_context.clone());

        JettyContainer.initialize(&context).await;

        assert_eq!(servlet_context.total_sets(), 0);
    }

    #[tokio::test]
    async fn test_legacy_container() {
        let servlet_context = Arc::new(RecordingServletContext::new(InMemoryServletContext::new()));
        let context = container_context(servlet_context.clone());

        let absent = StaticResourceLoader::default();
        assert!(!JettyLegacyContainer.touch(&absent, &context).await.unwrap());

        let present = StaticResourceLoader::new([JETTY_LEGACY_PROBE_CLASS]);
        assert!(JettyLegacyContainer.touch(&present, &context).await.unwrap());

        JettyLegacyContainer.initialize(&context).await;
        JettyLegacyContainer.initialize(&context).await;
        assert_eq!(servlet_context.set_count(INJECTOR_ATTRIBUTE_NAME), 1);
        assert_eq!(servlet_context.total_sets(), 1);
    }
}
