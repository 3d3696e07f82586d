//! # Servlet Context
//!
//! The host-facing side of the environment: a named attribute store plus
//! read-only init parameters, shaped after the servlet API. Containers probe
//! it to detect the host and write their injector and decorator into it.

use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use webbeans::BeanManager;

/// A type-erased attribute value.
pub type Attribute = Arc<dyn Any + Send + Sync>;

pub trait ServletContext: Send + Sync {
    fn attribute(&self, name: &str) -> Option<Attribute>;

    fn set_attribute(&self, name: &str, value: Attribute);

    fn remove_attribute(&self, name: &str) -> Option<Attribute>;

    fn init_parameter(&self, name: &str) -> Option<String>;

    /// The attribute's value if it is a `String`.
    fn string_attribute(&self, name: &str) -> Option<String> {
        self.attribute(name)
            .and_then(|value| value.downcast_ref::<String>().cloned())
    }
}

/// A [`ServletContext`] kept entirely in memory.
#[derive(Default)]
pub struct InMemoryServletContext {
    attributes: DashMap<String, Attribute>,
    init_parameters: HashMap<String, String>,
}

impl InMemoryServletContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_init_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.init_parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_attribute<V: Any + Send + Sync>(self, name: impl Into<String>, value: V) -> Self {
        self.attributes.insert(name.into(), Arc::new(value));
        self
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl ServletContext for InMemoryServletContext {
    fn attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes.get(name).map(|entry| entry.value().clone())
    }

    fn set_attribute(&self, name: &str, value: Attribute) {
        self.attributes.insert(name.to_string(), value);
    }

    fn remove_attribute(&self, name: &str) -> Option<Attribute> {
        self.attributes.remove(name).map(|(_, value)| value)
    }

    fn init_parameter(&self, name: &str) -> Option<String> {
        self.init_parameters.get(name).cloned()
    }
}

/// What a container sees while probing and initializing: the host's servlet
/// context and the bean manager backing injection.
#[derive(Clone)]
pub struct ContainerContext {
    servlet_context: Arc<dyn ServletContext>,
    manager: Arc<BeanManager>,
}

impl ContainerContext {
    pub fn new(servlet_context: Arc<dyn ServletContext>, manager: Arc<BeanManager>) -> Self {
        Self {
            servlet_context,
            manager,
        }
    }

    pub fn servlet_context(&self) -> &dyn ServletContext {
        self.servlet_context.as_ref()
    }

    pub fn manager(&self) -> &Arc<BeanManager> {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        let context = InMemoryServletContext::new().with_attribute("greeting", "hi".to_string());
        assert_eq!(context.string_attribute("greeting").as_deref(), Some("hi"));

        context.set_attribute("count", Arc::new(3u8));
        assert!(context.string_attribute("count").is_none());
        assert_eq!(
            context.attribute("count").and_then(|v| v.downcast_ref::<u8>().copied()),
            Some(3)
        );

        assert!(context.remove_attribute("count").is_some());
        assert!(context.attribute("count").is_none());
    }

    #[test]
    fn test_init_parameters() {
        let context = InMemoryServletContext::new().with_init_parameter("mode", "dev");
        assert_eq!(context.init_parameter("mode").as_deref(), Some("dev"));
        assert!(context.init_parameter("other").is_none());
    }
}
