//! Injectable methods: parameters resolved from the manager, receiver supplied by the caller.

use crate::annotated::{AnnotatedInitializer, AnnotatedMethod};
use crate::error::{InjectionError, InstantiationError, MetadataError};
use crate::injection_point::InjectionPoint;
use crate::manager::Manager;
use crate::member::{InitializerTarget, Member, MethodTarget};
use crate::unit::Unit;
use std::any::Any;
use tracing::{debug, warn};

pub struct InjectableMethod<T, R> {
    unit: Unit<T, MethodTarget<T, R>>,
}

impl<T: Any, R> InjectableMethod<T, R> {
    pub fn new(method: MethodTarget<T, R>) -> Result<Self, MetadataError> {
        Ok(Self {
            unit: Unit::from_member(method)?,
        })
    }

    pub fn annotated_item(&self) -> &AnnotatedMethod<T, R> {
        self.unit.annotated_item()
    }

    pub fn parameters(&self) -> &[InjectionPoint] {
        self.unit.parameters()
    }

    /// Resolves the parameters and calls the method on `receiver`.
    pub fn invoke(&self, receiver: &T, manager: &dyn Manager) -> Result<R, InjectionError> {
        let method = self.unit.annotated_item().member();
        let declaring = method.declaring_type();
        debug!(
            target_type = declaring.short_name(),
            method = method.name(),
            "Invoking method with injected parameters"
        );

        let args = self.unit.parameter_values(manager)?;
        method.invoke(receiver, &args).map_err(|cause| {
            warn!(target_type = declaring.short_name(), method = method.name(), error = %cause, "Invocation failed");
            InstantiationError::new(
                declaring,
                format!("Error invoking {}::{}", declaring, method.name()),
                cause,
            )
            .into()
        })
    }
}

/// An initializer method: like [`InjectableMethod`] but free to modify its receiver.
pub struct InjectableInitializer<T> {
    unit: Unit<T, InitializerTarget<T>>,
}

impl<T: Any> InjectableInitializer<T> {
    pub fn new(method: InitializerTarget<T>) -> Result<Self, MetadataError> {
        Ok(Self {
            unit: Unit::from_member(method)?,
        })
    }

    pub fn annotated_item(&self) -> &AnnotatedInitializer<T> {
        self.unit.annotated_item()
    }

    pub fn parameters(&self) -> &[InjectionPoint] {
        self.unit.parameters()
    }

    pub fn invoke(&self, receiver: &mut T, manager: &dyn Manager) -> Result<(), InjectionError> {
        let method = self.unit.annotated_item().member();
        let declaring = method.declaring_type();
        debug!(
            target_type = declaring.short_name(),
            method = method.name(),
            "Calling initializer"
        );

        let args = self.unit.parameter_values(manager)?;
        method.invoke(receiver, &args).map_err(|cause| {
            warn!(target_type = declaring.short_name(), method = method.name(), error = %cause, "Initializer failed");
            InstantiationError::new(
                declaring,
                format!("Error invoking {}::{}", declaring, method.name()),
                cause,
            )
            .into()
        })
    }
}
