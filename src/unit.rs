//! # Injection Units
//!
//! A [`Unit`] pairs an [`AnnotatedItem`] with the [`InjectionPoint`]s derived
//! from its parameters. The points are computed once at construction; at call
//! time [`Unit::parameter_values`] resolves them in declaration order.

use crate::annotated::AnnotatedItem;
use crate::annotation::{AnnotationSet, TypeKey};
use crate::error::{InjectionError, MetadataError};
use crate::injection_point::InjectionPoint;
use crate::manager::Manager;
use crate::member::{Arguments, Member};

/// Builds one injection point per parameter, preserving order.
///
/// # Errors
///
/// [`MetadataError::ParameterMismatch`] if the two slices differ in length.
pub fn build(
    parameter_types: &[TypeKey],
    parameter_annotations: &[AnnotationSet],
) -> Result<Vec<InjectionPoint>, MetadataError> {
    if parameter_types.len() != parameter_annotations.len() {
        return Err(MetadataError::ParameterMismatch {
            member: "<parameters>".to_string(),
            types: parameter_types.len(),
            annotations: parameter_annotations.len(),
        });
    }
    Ok(points(parameter_types, parameter_annotations))
}

fn points(
    parameter_types: &[TypeKey],
    parameter_annotations: &[AnnotationSet],
) -> Vec<InjectionPoint> {
    parameter_types
        .iter()
        .zip(parameter_annotations)
        .enumerate()
        .map(|(position, (ty, annotations))| {
            InjectionPoint::from_annotations(*ty, annotations, position)
        })
        .collect()
}

pub struct Unit<T, M> {
    item: AnnotatedItem<T, M>,
    parameters: Vec<InjectionPoint>,
}

impl<T, M: Member> Unit<T, M> {
    pub fn new(item: AnnotatedItem<T, M>) -> Self {
        // `describe` already checked the lengths
        let parameters = points(item.parameter_types(), item.parameter_annotations());
        Self { item, parameters }
    }

    /// Describes `member` and derives its injection points.
    pub fn from_member(member: M) -> Result<Self, MetadataError> {
        Ok(Self::new(AnnotatedItem::describe(member)?))
    }

    pub fn annotated_item(&self) -> &AnnotatedItem<T, M> {
        &self.item
    }

    pub fn parameters(&self) -> &[InjectionPoint] {
        &self.parameters
    }

    /// Resolves every parameter against `manager`, in order.
    ///
    /// Stops at the first parameter that cannot be resolved; later parameters
    /// are not looked up.
    pub fn parameter_values(&self, manager: &dyn Manager) -> Result<Arguments, InjectionError> {
        self.parameters
            .iter()
            .map(|point| point.resolve(manager))
            .collect()
    }
}

impl<T, M: Member> std::fmt::Debug for Unit<T, M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unit")
            .field("item", &self.item)
            .field("parameters", &self.parameters)
            .finish()
    }
}
