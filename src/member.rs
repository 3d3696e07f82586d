//! # Member Descriptors
//!
//! Rust has no runtime reflection, so an injectable member is described
//! explicitly: the declared parameter types, one annotation set per
//! parameter, and a body that receives positional, type-erased [`Arguments`].
//!
//! Three capability-tagged descriptors share the [`Member`] trait:
//!
//! | Descriptor | Kind | Operation |
//! |------------|------|-----------|
//! | [`ConstructorTarget<T>`] | [`MemberKind::Constructor`] | [`new_instance`](ConstructorTarget::new_instance) |
//! | [`MethodTarget<T, R>`] | [`MemberKind::Method`] | [`invoke`](MethodTarget::invoke) |
//! | [`InitializerTarget<T>`] | [`MemberKind::Method`] | [`invoke`](InitializerTarget::invoke), with `&mut T` |
//! | [`FieldTarget<T>`] | [`MemberKind::Field`] | [`set`](FieldTarget::set) |
//!
//! Each operation checks arity, calls the body, and turns whatever went wrong
//! (a wrong argument type, an error returned by the body, a panic) into an
//! [`InvocationFailure`].
//!
//! ```rust
//! use std::sync::Arc;
//! use webbeans::annotation::Qualifier;
//! use webbeans::member::{Arguments, ConstructorTarget};
//!
//! struct Greeter { prefix: Arc<String> }
//!
//! let target = ConstructorTarget::new(|args: &Arguments| {
//!     Ok(Greeter { prefix: args.get::<String>(0)? })
//! })
//! .parameter::<String>([Qualifier::named("prefix").into()]);
//!
//! let args = Arguments::new(vec![Arc::new("Hello".to_string())]);
//! let greeter = target.new_instance(&args).unwrap();
//! assert_eq!(greeter.prefix.as_str(), "Hello");
//! ```

use crate::annotation::{Annotation, AnnotationSet, TypeKey};
use crate::error::{BoxError, InvocationFailure};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A type-erased bean instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Positional argument values handed to a member body.
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Instance>,
}

impl Arguments {
    pub fn new(values: Vec<Instance>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The argument at `position`, downcast to `A`.
    pub fn get<A: Any + Send + Sync>(&self, position: usize) -> Result<Arc<A>, InvocationFailure> {
        let value = self
            .values
            .get(position)
            .ok_or(InvocationFailure::ArgumentCount {
                expected: position + 1,
                actual: self.values.len(),
            })?;
        value
            .clone()
            .downcast::<A>()
            .map_err(|_| InvocationFailure::IllegalArgument {
                position,
                expected: std::any::type_name::<A>(),
            })
    }

    /// Like [`get`](Self::get) but clones the value out of the shared pointer.
    pub fn cloned<A: Any + Send + Sync + Clone>(&self, position: usize) -> Result<A, InvocationFailure> {
        Ok(self.get::<A>(position)?.as_ref().clone())
    }

    pub fn raw(&self, position: usize) -> Option<&Instance> {
        self.values.get(position)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.values.iter()
    }
}

impl FromIterator<Instance> for Arguments {
    fn from_iter<I: IntoIterator<Item = Instance>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arguments").field("len", &self.values.len()).finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Constructor,
    Method,
    Field,
}

/// Uniform read access to a member declaration.
pub trait Member: Send + Sync {
    fn kind(&self) -> MemberKind;

    /// The type that declares the member.
    fn declaring_type(&self) -> TypeKey;

    fn name(&self) -> &str;

    fn parameter_types(&self) -> &[TypeKey];

    fn parameter_annotations(&self) -> &[AnnotationSet];
}

fn check_arity(expected: usize, args: &Arguments) -> Result<(), InvocationFailure> {
    if args.len() != expected {
        return Err(InvocationFailure::ArgumentCount {
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

/// Runs user code, converting both returned errors and panics.
fn call_body<R>(body: impl FnOnce() -> Result<R, BoxError>) -> Result<R, InvocationFailure> {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(InvocationFailure::from_body(error)),
        Err(payload) => Err(InvocationFailure::from_panic(payload)),
    }
}

// =============================================================================
// CONSTRUCTOR
// =============================================================================

type ConstructorBody<T> = dyn Fn(&Arguments) -> Result<T, BoxError> + Send + Sync;

/// A constructor of `T`.
pub struct ConstructorTarget<T> {
    declaring: TypeKey,
    parameter_types: Vec<TypeKey>,
    parameter_annotations: Vec<AnnotationSet>,
    body: Arc<ConstructorBody<T>>,
}

impl<T: Any> ConstructorTarget<T> {
    /// A constructor with no parameters yet; declare them with [`parameter`](Self::parameter).
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::from_parts(Vec::new(), Vec::new(), body)
    }

    /// Builds a constructor from raw, unchecked parameter metadata.
    ///
    /// The two vectors are expected to have the same length;
    /// [`AnnotatedItem::describe`](crate::annotated::AnnotatedItem::describe) rejects them otherwise.
    pub fn from_parts<F>(
        parameter_types: Vec<TypeKey>,
        parameter_annotations: Vec<AnnotationSet>,
        body: F,
    ) -> Self
    where
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self {
            declaring: TypeKey::of::<T>(),
            parameter_types,
            parameter_annotations,
            body: Arc::new(body),
        }
    }

    /// Appends a parameter of type `A`.
    pub fn parameter<A: Any>(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.parameter_types.push(TypeKey::of::<A>());
        self.parameter_annotations
            .push(annotations.into_iter().collect());
        self
    }

    pub fn new_instance(&self, args: &Arguments) -> Result<T, InvocationFailure> {
        check_arity(self.parameter_types.len(), args)?;
        call_body(|| (self.body)(args))
    }
}

impl<T> Clone for ConstructorTarget<T> {
    fn clone(&self) -> Self {
        Self {
            declaring: self.declaring,
            parameter_types: self.parameter_types.clone(),
            parameter_annotations: self.parameter_annotations.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T> Member for ConstructorTarget<T> {
    fn kind(&self) -> MemberKind {
        MemberKind::Constructor
    }

    fn declaring_type(&self) -> TypeKey {
        self.declaring
    }

    fn name(&self) -> &str {
        self.declaring.short_name()
    }

    fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }

    fn parameter_annotations(&self) -> &[AnnotationSet] {
        &self.parameter_annotations
    }
}

impl<T> fmt::Debug for ConstructorTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorTarget")
            .field("declaring", &self.declaring.name())
            .field("parameters", &self.parameter_types.len())
            .finish()
    }
}

// =============================================================================
// METHOD
// =============================================================================

type MethodBody<T, R> = dyn Fn(&T, &Arguments) -> Result<R, BoxError> + Send + Sync;

/// A method declared on `T` returning `R`.
pub struct MethodTarget<T, R> {
    declaring: TypeKey,
    name: Cow<'static, str>,
    parameter_types: Vec<TypeKey>,
    parameter_annotations: Vec<AnnotationSet>,
    body: Arc<MethodBody<T, R>>,
}

impl<T: Any, R> MethodTarget<T, R> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, body: F) -> Self
    where
        F: Fn(&T, &Arguments) -> Result<R, BoxError> + Send + Sync + 'static,
    {
        Self {
            declaring: TypeKey::of::<T>(),
            name: name.into(),
            parameter_types: Vec::new(),
            parameter_annotations: Vec::new(),
            body: Arc::new(body),
        }
    }

    pub fn parameter<A: Any>(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.parameter_types.push(TypeKey::of::<A>());
        self.parameter_annotations
            .push(annotations.into_iter().collect());
        self
    }

    pub fn invoke(&self, receiver: &T, args: &Arguments) -> Result<R, InvocationFailure> {
        check_arity(self.parameter_types.len(), args)?;
        call_body(|| (self.body)(receiver, args))
    }
}

impl<T, R> Clone for MethodTarget<T, R> {
    fn clone(&self) -> Self {
        Self {
            declaring: self.declaring,
            name: self.name.clone(),
            parameter_types: self.parameter_types.clone(),
            parameter_annotations: self.parameter_annotations.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T, R> Member for MethodTarget<T, R> {
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    fn declaring_type(&self) -> TypeKey {
        self.declaring
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }

    fn parameter_annotations(&self) -> &[AnnotationSet] {
        &self.parameter_annotations
    }
}

// =============================================================================
// INITIALIZER
// =============================================================================

type InitializerBody<T> = dyn Fn(&mut T, &Arguments) -> Result<(), BoxError> + Send + Sync;

/// An initializer method on `T`, called with the receiver borrowed mutably.
pub struct InitializerTarget<T> {
    declaring: TypeKey,
    name: Cow<'static, str>,
    parameter_types: Vec<TypeKey>,
    parameter_annotations: Vec<AnnotationSet>,
    body: Arc<InitializerBody<T>>,
}

impl<T: Any> InitializerTarget<T> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, body: F) -> Self
    where
        F: Fn(&mut T, &Arguments) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Self {
            declaring: TypeKey::of::<T>(),
            name: name.into(),
            parameter_types: Vec::new(),
            parameter_annotations: Vec::new(),
            body: Arc::new(body),
        }
    }

    pub fn parameter<A: Any>(mut self, annotations: impl IntoIterator<Item = Annotation>) -> Self {
        self.parameter_types.push(TypeKey::of::<A>());
        self.parameter_annotations
            .push(annotations.into_iter().collect());
        self
    }

    pub fn invoke(&self, receiver: &mut T, args: &Arguments) -> Result<(), InvocationFailure> {
        check_arity(self.parameter_types.len(), args)?;
        call_body(|| (self.body)(receiver, args))
    }
}

impl<T> Clone for InitializerTarget<T> {
    fn clone(&self) -> Self {
        Self {
            declaring: self.declaring,
            name: self.name.clone(),
            parameter_types: self.parameter_types.clone(),
            parameter_annotations: self.parameter_annotations.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T> Member for InitializerTarget<T> {
    fn kind(&self) -> MemberKind {
        MemberKind::Method
    }

    fn declaring_type(&self) -> TypeKey {
        self.declaring
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }

    fn parameter_annotations(&self) -> &[AnnotationSet] {
        &self.parameter_annotations
    }
}

// =============================================================================
// FIELD
// =============================================================================

type FieldSetter<T> = dyn Fn(&mut T, Instance) -> Result<(), BoxError> + Send + Sync;

/// A field of `T`; behaves like a setter with exactly one parameter.
pub struct FieldTarget<T> {
    declaring: TypeKey,
    name: Cow<'static, str>,
    field_type: [TypeKey; 1],
    annotations: [AnnotationSet; 1],
    setter: Arc<FieldSetter<T>>,
}

impl<T: Any> FieldTarget<T> {
    pub fn new<A, F>(
        name: impl Into<Cow<'static, str>>,
        annotations: impl IntoIterator<Item = Annotation>,
        setter: F,
    ) -> Self
    where
        A: Any + Send + Sync,
        F: Fn(&mut T, Arc<A>) + Send + Sync + 'static,
    {
        let typed = move |receiver: &mut T, value: Instance| -> Result<(), BoxError> {
            let value = value
                .downcast::<A>()
                .map_err(|_| InvocationFailure::IllegalArgument {
                    position: 0,
                    expected: std::any::type_name::<A>(),
                })?;
            setter(receiver, value);
            Ok(())
        };
        Self {
            declaring: TypeKey::of::<T>(),
            name: name.into(),
            field_type: [TypeKey::of::<A>()],
            annotations: [annotations.into_iter().collect()],
            setter: Arc::new(typed),
        }
    }

    pub fn field_type(&self) -> TypeKey {
        self.field_type[0]
    }

    pub fn set(&self, receiver: &mut T, value: Instance) -> Result<(), InvocationFailure> {
        call_body(|| (self.setter)(receiver, value))
    }
}

type FieldGetter<T, R> = dyn Fn(&T) -> R + Send + Sync;

/// Read access to a field of `T` holding an `R`; backs producer fields.
pub struct FieldAccessor<T, R> {
    declaring: TypeKey,
    name: Cow<'static, str>,
    getter: Arc<FieldGetter<T, R>>,
}

impl<T: Any, R> FieldAccessor<T, R> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, getter: F) -> Self
    where
        F: Fn(&T) -> R + Send + Sync + 'static,
    {
        Self {
            declaring: TypeKey::of::<T>(),
            name: name.into(),
            getter: Arc::new(getter),
        }
    }

    pub fn declaring_type(&self) -> TypeKey {
        self.declaring
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, receiver: &T) -> Result<R, InvocationFailure> {
        call_body(|| Ok((self.getter)(receiver)))
    }
}

impl<T> Clone for FieldTarget<T> {
    fn clone(&self) -> Self {
        Self {
            declaring: self.declaring,
            name: self.name.clone(),
            field_type: self.field_type,
            annotations: self.annotations.clone(),
            setter: self.setter.clone(),
        }
    }
}

impl<T> Member for FieldTarget<T> {
    fn kind(&self) -> MemberKind {
        MemberKind::Field
    }

    fn declaring_type(&self) -> TypeKey {
        self.declaring
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn parameter_types(&self) -> &[TypeKey] {
        &self.field_type
    }

    fn parameter_annotations(&self) -> &[AnnotationSet] {
        &self.annotations
    }
}
