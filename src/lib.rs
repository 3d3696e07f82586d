//! # WebBeans Injection Core
//!
//! This crate resolves and invokes constructors, methods and fields whose
//! parameters are supplied by a bean manager. A parameter asks for a *type*
//! plus a set of *qualifiers*; the manager answers with the matching beans and
//! the core insists on exactly one.
//!
//! ## Architecture Overview
//!
//! The crate separates concerns into three layers:
//!
//! 1. **Metadata Layer** ([`member`], [`annotated`], [`injection_point`]) - what a
//!    member declares: parameter types, annotations, and the injection point
//!    derived from each parameter.
//! 2. **Invocation Layer** ([`unit`], [`constructor`], [`method`], [`field`]) -
//!    resolving every parameter in declaration order and calling the member.
//! 3. **Registry Layer** ([`Manager`], [`BeanManager`], [`bean`]) - which beans
//!    exist, their qualifiers and scopes, and how instances are produced.
//!
//! Metadata is computed once when a constructor or method is wrapped and is
//! read-only afterwards. Invocation holds no mutable state, so one
//! [`SimpleConstructor`] can be shared by many threads.
//!
//! ## Resolution Rules
//!
//! - A parameter with no qualifier requires `@Current`.
//! - A bean with no declared qualifier has `@Current`.
//! - A bean matches when its qualifiers include every required qualifier.
//! - Zero matches is [`ResolutionError::Unsatisfied`]; more than one is
//!   [`ResolutionError::Ambiguous`]. Neither calls the member body.
//! - A bean whose creation needs itself again is [`ResolutionError::Circular`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use webbeans::annotation::Qualifier;
//! use webbeans::member::Arguments;
//! use webbeans::{BeanManager, ConstructorTarget, InstanceBean, SimpleBean};
//!
//! struct DataSource { url: String }
//! struct UserRepository { source: Arc<DataSource> }
//!
//! let manager = BeanManager::new();
//! manager.add_bean(
//!     InstanceBean::new(DataSource { url: "postgres://replica".into() })
//!         .with_qualifier(Qualifier::named("replica")),
//! );
//! manager.add_bean(
//!     SimpleBean::new(
//!         ConstructorTarget::new(|args: &Arguments| {
//!             Ok(UserRepository { source: args.get(0)? })
//!         })
//!         .parameter::<DataSource>([Qualifier::named("replica").into()]),
//!     )
//!     .unwrap(),
//! );
//!
//! let repo = manager.instance::<UserRepository>(&[]).unwrap();
//! assert_eq!(repo.source.url, "postgres://replica");
//! ```
//!
//! ## Error Handling
//!
//! Every public operation returns [`InjectionError`], split by stage:
//! [`MetadataError`], [`ResolutionError`] and [`InstantiationError`]. An
//! error raised by a member body stays reachable through
//! [`InstantiationError::cause`] as [`InvocationFailure::Target`], so callers
//! can downcast it back to their own type.

pub mod annotated;
pub mod annotation;
pub mod bean;
pub mod constructor;
pub mod error;
pub mod field;
pub mod injection_point;
pub mod manager;
pub mod member;
pub mod method;
pub mod mock;
pub mod tracing;
pub mod unit;

// Re-export core types for convenience
pub use annotation::{Annotation, Qualifier, QualifierSet, TypeKey};
pub use bean::{
    Bean, BeanDescriptor, InstanceBean, ProducerFieldBean, ProducerMethodBean, Scope, SimpleBean,
};
pub use constructor::{ComponentConstructor, SimpleConstructor};
pub use error::{
    BoxError, InjectionError, InstantiationError, InvocationFailure, MetadataError,
    ResolutionError,
};
pub use field::{InjectableField, InjectionTarget};
pub use injection_point::InjectionPoint;
pub use manager::{BeanManager, Manager};
pub use member::{
    Arguments, ConstructorTarget, FieldAccessor, FieldTarget, InitializerTarget, Instance,
    MethodTarget,
};
pub use method::{InjectableInitializer, InjectableMethod};
