//! # WebBeans Servlet Environment
//!
//! Attaches a [`webbeans::BeanManager`] to a servlet host so that objects the
//! host creates itself (servlets, filters, listeners) get their fields
//! injected.
//!
//! ## Lifecycle
//!
//! ```text
//! host starts ──► Listener::context_initialized
//!                   ├─ Container::touch  (probe each container in order)
//!                   └─ Container::initialize  (the selected one, once)
//!                        ├─ JettyInjector stored in the servlet context
//!                        └─ Decorator stored under the watched attribute
//! host creates an object ──► Decorator::decorate ──► BeanManager::inject
//! host stops ──► Listener::context_destroyed ──► Container::destroy
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use webbeans::{BeanManager, FieldTarget, InjectionTarget};
//! use webbeans_servlet::config::EnvironmentConfig;
//! use webbeans_servlet::context::{ContainerContext, InMemoryServletContext};
//! use webbeans_servlet::injector::Decorator;
//! use webbeans_servlet::jetty::JETTY_DECORATING_ATTRIBUTE;
//! use webbeans_servlet::listener::Listener;
//!
//! #[derive(Default)]
//! struct HelloServlet { greeting: Option<Arc<String>> }
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = Arc::new(BeanManager::new());
//!     manager.register_instance("Hello".to_string(), []);
//!     manager.add_injection_target(
//!         InjectionTarget::new()
//!             .field(FieldTarget::new("greeting", [], |s: &mut HelloServlet, v: Arc<String>| {
//!                 s.greeting = Some(v)
//!             }))
//!             .unwrap(),
//!     );
//!
//!     let servlet_context = Arc::new(
//!         InMemoryServletContext::new()
//!             .with_attribute(JETTY_DECORATING_ATTRIBUTE, "jetty.decorator".to_string()),
//!     );
//!     let context = ContainerContext::new(servlet_context.clone(), manager);
//!
//!     let listener = Listener::with_defaults(EnvironmentConfig::default());
//!     assert_eq!(listener.context_initialized(&context).await.as_deref(), Some("jetty"));
//!
//!     let decorator = Decorator::lookup(&*servlet_context).unwrap();
//!     let mut servlet = HelloServlet::default();
//!     decorator.decorate(&mut servlet).unwrap();
//!     assert_eq!(servlet.greeting.unwrap().as_str(), "Hello");
//! }
//! ```

pub mod config;
pub mod container;
pub mod context;
pub mod error;
pub mod injector;
pub mod jetty;
pub mod listener;
pub mod mock;

// Re-export core types for convenience
pub use config::EnvironmentConfig;
pub use container::{Container, ResourceLoader, StaticResourceLoader};
pub use context::{ContainerContext, InMemoryServletContext, ServletContext};
pub use error::EnvironmentError;
pub use injector::{Decorator, JettyInjector};
pub use jetty::{JettyContainer, JettyLegacyContainer};
pub use listener::Listener;
