//! # Field and Initializer Injection
//!
//! After a bean is constructed, its [`InjectionTarget`] fills the injectable
//! fields and then calls the initializer methods, each with their own
//! resolved parameters.
//!
//! Order is fixed: every field in registration order, then every initializer
//! in registration order. An initializer can therefore rely on all fields
//! being set.

use crate::annotated::AnnotatedField;
use crate::annotation::TypeKey;
use crate::error::{InjectionError, InstantiationError, InvocationFailure, MetadataError};
use crate::injection_point::InjectionPoint;
use crate::manager::Manager;
use crate::member::{FieldTarget, InitializerTarget, Member};
use crate::method::InjectableInitializer;
use crate::unit::Unit;
use std::any::Any;
use tracing::{debug, trace};

pub struct InjectableField<T> {
    unit: Unit<T, FieldTarget<T>>,
}

impl<T: Any> InjectableField<T> {
    pub fn new(field: FieldTarget<T>) -> Result<Self, MetadataError> {
        Ok(Self {
            unit: Unit::from_member(field)?,
        })
    }

    pub fn annotated_item(&self) -> &AnnotatedField<T> {
        self.unit.annotated_item()
    }

    pub fn injection_point(&self) -> &InjectionPoint {
        // a field always has exactly one parameter
        &self.unit.parameters()[0]
    }

    /// Resolves the field's value and stores it on `receiver`.
    pub fn inject(&self, receiver: &mut T, manager: &dyn Manager) -> Result<(), InjectionError> {
        let field = self.unit.annotated_item().member();
        let declaring = field.declaring_type();
        trace!(target_type = declaring.short_name(), field = field.name(), "Injecting field");

        let args = self.unit.parameter_values(manager)?;
        let result = match args.raw(0) {
            Some(value) => field.set(receiver, value.clone()),
            None => Err(InvocationFailure::ArgumentCount {
                expected: 1,
                actual: 0,
            }),
        };
        result.map_err(|cause| {
            InstantiationError::new(
                declaring,
                format!("Error setting field {}::{}", declaring, field.name()),
                cause,
            )
            .into()
        })
    }
}

/// The fields and initializer methods injected into an already-constructed `T`.
pub struct InjectionTarget<T> {
    fields: Vec<InjectableField<T>>,
    initializers: Vec<InjectableInitializer<T>>,
}

impl<T: Any> InjectionTarget<T> {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            initializers: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldTarget<T>) -> Result<Self, MetadataError> {
        self.fields.push(InjectableField::new(field)?);
        Ok(self)
    }

    pub fn initializer(mut self, method: InitializerTarget<T>) -> Result<Self, MetadataError> {
        self.initializers.push(InjectableInitializer::new(method)?);
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.initializers.is_empty()
    }

    pub fn fields(&self) -> &[InjectableField<T>] {
        &self.fields
    }

    pub fn initializers(&self) -> &[InjectableInitializer<T>] {
        &self.initializers
    }

    /// Injects every field, then calls every initializer. Stops at the first failure.
    pub fn inject(&self, instance: &mut T, manager: &dyn Manager) -> Result<(), InjectionError> {
        if self.is_empty() {
            return Ok(());
        }
        debug!(
            target_type = TypeKey::of::<T>().short_name(),
            fields = self.fields.len(),
            initializers = self.initializers.len(),
            "Injecting members"
        );
        for field in &self.fields {
            field.inject(instance, manager)?;
        }
        for initializer in &self.initializers {
            initializer.invoke(instance, manager)?;
        }
        Ok(())
    }
}

impl<T: Any> Default for InjectionTarget<T> {
    fn default() -> Self {
        Self::new()
    }
}
