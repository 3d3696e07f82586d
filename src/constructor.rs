//! # Component Constructors
//!
//! [`SimpleConstructor`] is the canonical [`ComponentConstructor`]: it asks the
//! manager for one bean per constructor parameter, in declaration order, and
//! calls the constructor with the results.
//!
//! It is built once and holds no mutable state, so a single constructor may be
//! shared across threads and invoked concurrently.

use crate::annotated::AnnotatedConstructor;
use crate::error::{InjectionError, InstantiationError, MetadataError};
use crate::injection_point::InjectionPoint;
use crate::manager::Manager;
use crate::member::ConstructorTarget;
use crate::unit::Unit;
use std::any::Any;
use tracing::{debug, trace, warn};

/// Something that can produce a `T` by resolving its dependencies from a manager.
pub trait ComponentConstructor<T>: Send + Sync {
    /// Resolves all parameters and constructs a new `T`.
    ///
    /// # Errors
    ///
    /// * [`InjectionError::Resolution`] when a parameter has zero or several
    ///   matching beans. The constructor body is not called.
    /// * [`InjectionError::Instantiation`] when the body fails; the original
    ///   failure is available through [`InstantiationError::cause`].
    fn invoke(&self, manager: &dyn Manager) -> Result<T, InjectionError>;

    fn annotated_item(&self) -> &AnnotatedConstructor<T>;
}

pub struct SimpleConstructor<T> {
    unit: Unit<T, ConstructorTarget<T>>,
}

impl<T: Any> SimpleConstructor<T> {
    pub fn new(constructor: ConstructorTarget<T>) -> Result<Self, MetadataError> {
        let unit = Unit::from_member(constructor)?;
        trace!(
            target_type = unit.annotated_item().declaring_type().short_name(),
            parameters = unit.parameters().len(),
            "Initialized constructor metadata"
        );
        Ok(Self { unit })
    }

    pub fn parameters(&self) -> &[InjectionPoint] {
        self.unit.parameters()
    }
}

impl<T: Any> ComponentConstructor<T> for SimpleConstructor<T> {
    fn invoke(&self, manager: &dyn Manager) -> Result<T, InjectionError> {
        let item = self.unit.annotated_item();
        let target_type = item.declaring_type();
        debug!(
            target_type = target_type.short_name(),
            parameters = self.unit.parameters().len(),
            "Creating new instance with injected parameters"
        );

        let args = self.unit.parameter_values(manager)?;
        item.member().new_instance(&args).map_err(|cause| {
            warn!(target_type = target_type.short_name(), error = %cause, "Instantiation failed");
            InstantiationError::new(
                target_type,
                format!("Error instantiating {}", target_type),
                cause,
            )
            .into()
        })
    }

    fn annotated_item(&self) -> &AnnotatedConstructor<T> {
        self.unit.annotated_item()
    }
}

impl<T> std::fmt::Debug for SimpleConstructor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimpleConstructor")
            .field("unit", &self.unit)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, InvocationFailure};
    use crate::member::Arguments;
    use crate::mock::MockManager;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("invalid port {0}")]
    struct InvalidPort(u16);

    #[derive(Debug)]
    struct Listener {
        port: u16,
    }

    fn listener_constructor(calls: Arc<AtomicUsize>) -> ConstructorTarget<Listener> {
        ConstructorTarget::new(move |args: &Arguments| -> Result<Listener, BoxError> {
            calls.fetch_add(1, Ordering::SeqCst);
            let port = *args.get::<u16>(0)?;
            if port == 0 {
                return Err(Box::new(InvalidPort(port)));
            }
            Ok(Listener { port })
        })
        .parameter::<u16>([])
    }

    #[test]
    fn test_invoke_resolves_and_constructs() {
        let mut manager = MockManager::new();
        manager.expect_resolve::<u16>().return_instance(Arc::new(8080u16));

        let calls = Arc::new(AtomicUsize::new(0));
        let constructor = SimpleConstructor::new(listener_constructor(calls.clone())).unwrap();
        let listener = constructor.invoke(&manager).unwrap();

        assert_eq!(listener.port, 8080);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        manager.verify();
    }

    #[test]
    fn test_invoke_does_not_call_body_when_unsatisfied() {
        let mut manager = MockManager::new();
        manager.expect_resolve::<u16>().return_none();

        let calls = Arc::new(AtomicUsize::new(0));
        let constructor = SimpleConstructor::new(listener_constructor(calls.clone())).unwrap();
        let err = constructor.invoke(&manager).unwrap_err();

        assert!(matches!(err, InjectionError::Resolution(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invoke_wraps_target_error() {
        let mut manager = MockManager::new();
        manager.expect_resolve::<u16>().return_instance(Arc::new(0u16));

        let constructor =
            SimpleConstructor::new(listener_constructor(Arc::new(AtomicUsize::new(0)))).unwrap();
        let err = constructor.invoke(&manager).unwrap_err();

        let InjectionError::Instantiation(err) = err else {
            panic!("expected instantiation error");
        };
        assert_eq!(err.target(), crate::annotation::TypeKey::of::<Listener>());
        assert!(err.message().starts_with("Error instantiating"));
        match err.cause() {
            InvocationFailure::Target(source) => {
                assert_eq!(source.to_string(), "invalid port 0");
                assert!(source.downcast_ref::<InvalidPort>().is_some());
            }
            other => panic!("unexpected cause: {other:?}"),
        }
    }

    #[test]
    fn test_annotated_item_exposes_metadata() {
        let constructor =
            SimpleConstructor::new(listener_constructor(Arc::new(AtomicUsize::new(0)))).unwrap();
        let item = constructor.annotated_item();
        assert_eq!(item.name(), "Listener");
        assert_eq!(item.parameter_types().len(), 1);
        assert_eq!(constructor.parameters()[0].position(), 0);
    }
}
