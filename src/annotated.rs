//! # Annotated Items
//!
//! An [`AnnotatedItem`] normalizes a member descriptor into a stable,
//! queryable description: declaring type, ordered parameter types, and one
//! annotation set per parameter. It is built once and never changes.

use crate::annotation::{AnnotationSet, TypeKey};
use crate::error::MetadataError;
use crate::member::{
    ConstructorTarget, FieldTarget, InitializerTarget, Member, MemberKind, MethodTarget,
};
use std::fmt;
use std::marker::PhantomData;

/// Description of member `M` declared on (or producing) type `T`.
pub struct AnnotatedItem<T, M> {
    declaring: TypeKey,
    member: M,
    parameter_types: Vec<TypeKey>,
    parameter_annotations: Vec<AnnotationSet>,
    _type: PhantomData<fn() -> T>,
}

pub type AnnotatedConstructor<T> = AnnotatedItem<T, ConstructorTarget<T>>;
pub type AnnotatedMethod<T, R> = AnnotatedItem<T, MethodTarget<T, R>>;
pub type AnnotatedInitializer<T> = AnnotatedItem<T, InitializerTarget<T>>;
pub type AnnotatedField<T> = AnnotatedItem<T, FieldTarget<T>>;

impl<T, M: Member> AnnotatedItem<T, M> {
    /// Describes `member`.
    ///
    /// # Errors
    ///
    /// [`MetadataError::ParameterMismatch`] if the member reports a different
    /// number of parameter types and parameter annotation sets.
    pub fn describe(member: M) -> Result<Self, MetadataError> {
        let parameter_types = member.parameter_types().to_vec();
        let parameter_annotations = member.parameter_annotations().to_vec();
        if parameter_types.len() != parameter_annotations.len() {
            return Err(MetadataError::ParameterMismatch {
                member: format!("{}::{}", member.declaring_type(), member.name()),
                types: parameter_types.len(),
                annotations: parameter_annotations.len(),
            });
        }
        Ok(Self {
            declaring: member.declaring_type(),
            member,
            parameter_types,
            parameter_annotations,
            _type: PhantomData,
        })
    }

    pub fn declaring_type(&self) -> TypeKey {
        self.declaring
    }

    pub fn member(&self) -> &M {
        &self.member
    }

    pub fn kind(&self) -> MemberKind {
        self.member.kind()
    }

    pub fn name(&self) -> &str {
        self.member.name()
    }

    pub fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }

    pub fn parameter_annotations(&self) -> &[AnnotationSet] {
        &self.parameter_annotations
    }
}

impl<T, M: Member> fmt::Debug for AnnotatedItem<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnnotatedItem")
            .field("kind", &self.member.kind())
            .field("declaring", &self.declaring.name())
            .field("name", &self.member.name())
            .field(
                "parameters",
                &self
                    .parameter_types
                    .iter()
                    .map(TypeKey::short_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
