//! # Injector and Decorator
//!
//! The host creates servlets, filters and listeners itself. To get their
//! fields injected it calls a *decorator* on every object it instantiates. The
//! [`Decorator`] forwards to the [`JettyInjector`], which asks the bean manager
//! to inject the object through its registered injection target.
//!
//! Both objects live in the servlet context as attributes:
//!
//! | Attribute | Value |
//! |-----------|-------|
//! | [`INJECTOR_ATTRIBUTE_NAME`] | `Arc<JettyInjector>` |
//! | the name held by [`JETTY_DECORATING_ATTRIBUTE`](crate::jetty::JETTY_DECORATING_ATTRIBUTE) | `Arc<Decorator>` |

use crate::context::{ContainerContext, ServletContext};
use crate::error::EnvironmentError;
use crate::jetty::JETTY_DECORATING_ATTRIBUTE;
use std::any::Any;
use std::sync::Arc;
use tracing::{debug, info};
use webbeans::BeanManager;

pub const INJECTOR_ATTRIBUTE_NAME: &str = "org.jboss.weld.environment.jetty.JettyWeldInjector";

/// Performs non-contextual injection into host-created objects.
pub struct JettyInjector {
    manager: Arc<BeanManager>,
}

impl JettyInjector {
    pub fn new(manager: Arc<BeanManager>) -> Self {
        Self { manager }
    }

    /// Injects `object`. Returns `false` if the manager has no injection target for its type.
    pub fn inject(&self, object: &mut dyn Any) -> Result<bool, EnvironmentError> {
        Ok(self.manager.inject(object)?)
    }

    /// Stores a new injector in the servlet context unless one is already there.
    ///
    /// Returns `true` if an injector was installed by this call.
    pub fn install(context: &ContainerContext) -> bool {
        let servlet_context = context.servlet_context();
        if servlet_context.attribute(INJECTOR_ATTRIBUTE_NAME).is_some() {
            debug!("Injector already installed");
            return false;
        }
        let injector = Arc::new(JettyInjector::new(context.manager().clone()));
        servlet_context.set_attribute(INJECTOR_ATTRIBUTE_NAME, injector);
        info!(attribute = INJECTOR_ATTRIBUTE_NAME, "Injector installed");
        true
    }

    /// The injector installed in `servlet_context`.
    pub fn lookup(servlet_context: &dyn ServletContext) -> Result<Arc<JettyInjector>, EnvironmentError> {
        servlet_context
            .attribute(INJECTOR_ATTRIBUTE_NAME)
            .ok_or_else(|| EnvironmentError::attribute(INJECTOR_ATTRIBUTE_NAME, "is not set"))?
            .downcast::<JettyInjector>()
            .map_err(|_| EnvironmentError::attribute(INJECTOR_ATTRIBUTE_NAME, "is not an injector"))
    }
}

/// The hook the host applies to each object it creates.
pub struct Decorator {
    injector: Arc<JettyInjector>,
}

impl Decorator {
    pub fn new(injector: Arc<JettyInjector>) -> Self {
        Self { injector }
    }

    pub fn decorate(&self, object: &mut dyn Any) -> Result<bool, EnvironmentError> {
        self.injector.inject(object)
    }

    /// Called when the host discards an object. Injected values are shared
    /// beans, so nothing is released here.
    pub fn destroy(&self, _object: &mut dyn Any) {}

    /// Publishes a decorator under the attribute name the host's decorating
    /// listener watches.
    ///
    /// Returns `false` when the host does not advertise a decorating listener
    /// or when a decorator is already published.
    pub fn process(servlet_context: &dyn ServletContext) -> Result<bool, EnvironmentError> {
        let Some(watched) = servlet_context.string_attribute(JETTY_DECORATING_ATTRIBUTE) else {
            return Ok(false);
        };
        if servlet_context
            .attribute(&watched)
            .is_some_and(|existing| existing.is::<Decorator>())
        {
            debug!(attribute = %watched, "Decorator already installed");
            return Ok(false);
        }
        let injector = JettyInjector::lookup(servlet_context)?;
        servlet_context.set_attribute(&watched, Arc::new(Decorator::new(injector)));
        info!(attribute = %watched, "Decorator installed");
        Ok(true)
    }

    /// The decorator published in `servlet_context`, if any.
    pub fn lookup(servlet_context: &dyn ServletContext) -> Option<Arc<Decorator>> {
        let watched = servlet_context.string_attribute(JETTY_DECORATING_ATTRIBUTE)?;
        servlet_context.attribute(&watched)?.downcast::<Decorator>().ok()
    }
}
