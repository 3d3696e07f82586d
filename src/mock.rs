//! # Mock Manager & Testing Guide
//!
//! [`MockManager`] implements the same [`Manager`] API as [`BeanManager`](crate::BeanManager)
//! but answers from a queue of expectations instead of a registry. It lets you
//! test a constructor, method or injection target in isolation: you decide what
//! each lookup returns, including the "no bean" and "several beans" cases that
//! are tedious to set up with a real registry.
//!
//! ## When to use the Mock vs a real BeanManager
//!
//! | Feature | MockManager | BeanManager |
//! |---------|-------------|-------------|
//! | **Setup** | One expectation per lookup | Register every bean |
//! | **Order check** | Lookups must arrive in expectation order | None |
//! | **Error Injection** | `return_none` / `return_candidates` | Requires conflicting registrations |
//! | **Use Case** | Unit testing a single member | Wiring tests, scopes, transitive graphs |
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use webbeans::constructor::{ComponentConstructor, SimpleConstructor};
//! use webbeans::member::{Arguments, ConstructorTarget};
//! use webbeans::mock::MockManager;
//!
//! struct Mailer { host: Arc<String> }
//!
//! let mut mock = MockManager::new();
//! mock.expect_resolve::<String>()
//!     .return_instance(Arc::new("smtp.local".to_string()));
//!
//! let constructor = SimpleConstructor::new(
//!     ConstructorTarget::new(|args: &Arguments| Ok(Mailer { host: args.get(0)? }))
//!         .parameter::<String>([]),
//! )
//! .unwrap();
//!
//! let mailer = constructor.invoke(&mock).unwrap();
//! assert_eq!(mailer.host.as_str(), "smtp.local");
//! mock.verify(); // all expectations were consumed
//! ```
//!
//! ## Testing Failure Scenarios
//!
//! ```rust
//! use std::sync::Arc;
//! use webbeans::InjectionError;
//! use webbeans::error::ResolutionError;
//! use webbeans::constructor::{ComponentConstructor, SimpleConstructor};
//! use webbeans::member::{Arguments, ConstructorTarget};
//! use webbeans::mock::MockManager;
//!
//! struct Mailer;
//!
//! let mut mock = MockManager::new();
//! mock.expect_resolve::<String>().return_candidates(vec![
//!     Arc::new("primary".to_string()),
//!     Arc::new("backup".to_string()),
//! ]);
//!
//! let constructor = SimpleConstructor::new(
//!     ConstructorTarget::new(|_: &Arguments| Ok(Mailer)).parameter::<String>([]),
//! )
//! .unwrap();
//!
//! let result = constructor.invoke(&mock);
//! assert!(matches!(
//!     result,
//!     Err(InjectionError::Resolution(ResolutionError::Ambiguous { .. }))
//! ));
//! ```

use crate::annotation::{QualifierSet, TypeKey};
use crate::bean::{Bean, InstanceBean};
use crate::error::InjectionError;
use crate::manager::Manager;
use crate::member::Instance;
use std::any::Any;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected `resolve_by_type` call and the candidates to answer with.
struct Expectation {
    ty: TypeKey,
    qualifiers: Option<QualifierSet>,
    candidates: Vec<Instance>,
}

#[derive(Default)]
pub struct MockManager {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    resolved: Mutex<Vec<(TypeKey, QualifierSet)>>,
}

impl MockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a lookup for type `A`.
    pub fn expect_resolve<A: Any>(&mut self) -> ResolveExpectationBuilder {
        ResolveExpectationBuilder {
            ty: TypeKey::of::<A>(),
            qualifiers: None,
            expectations: self.expectations.clone(),
        }
    }

    /// Every lookup received so far, in order.
    pub fn resolved(&self) -> Vec<(TypeKey, QualifierSet)> {
        self.resolved.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl Manager for MockManager {
    fn resolve_by_type(&self, ty: &TypeKey, qualifiers: &QualifierSet) -> Vec<Arc<dyn Bean>> {
        self.resolved
            .lock()
            .unwrap()
            .push((*ty, qualifiers.clone()));

        let expectation = self.expectations.lock().unwrap().pop_front();
        let Some(expectation) = expectation else {
            panic!("Unexpected lookup for {}", ty);
        };
        if expectation.ty != *ty {
            panic!("Expected lookup for {}, got {}", expectation.ty, ty);
        }
        if let Some(expected) = &expectation.qualifiers {
            if expected != qualifiers {
                panic!(
                    "Expected qualifiers {} for {}, got {}",
                    expected, ty, qualifiers
                );
            }
        }

        expectation
            .candidates
            .into_iter()
            .enumerate()
            .map(|(i, instance)| {
                Arc::new(MockBean {
                    name: format!("mock#{}", i),
                    ty: *ty,
                    qualifiers: qualifiers.clone(),
                    instance,
                }) as Arc<dyn Bean>
            })
            .collect()
    }

    fn instance_of(&self, bean: &Arc<dyn Bean>) -> Result<Instance, InjectionError> {
        bean.create(self)
    }
}

/// Builder for `resolve_by_type` expectations.
pub struct ResolveExpectationBuilder {
    ty: TypeKey,
    qualifiers: Option<QualifierSet>,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
}

impl ResolveExpectationBuilder {
    /// Also require the lookup to carry exactly these qualifiers.
    pub fn with_qualifiers(mut self, qualifiers: QualifierSet) -> Self {
        self.qualifiers = Some(qualifiers);
        self
    }

    /// Answers with a single matching bean.
    pub fn return_instance<V: Any + Send + Sync>(self, value: Arc<V>) {
        self.return_candidates(vec![value as Instance]);
    }

    /// Answers with no matching bean.
    pub fn return_none(self) {
        self.return_candidates(Vec::new());
    }

    /// Answers with one bean per value.
    pub fn return_candidates(self, candidates: Vec<Instance>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation {
            ty: self.ty,
            qualifiers: self.qualifiers,
            candidates,
        });
    }
}

/// Bean handed out by [`MockManager`]; echoes the requested type and qualifiers.
struct MockBean {
    name: String,
    ty: TypeKey,
    qualifiers: QualifierSet,
    instance: Instance,
}

impl Bean for MockBean {
    fn name(&self) -> &str {
        &self.name
    }

    fn bean_type(&self) -> TypeKey {
        self.ty
    }

    fn qualifiers(&self) -> &QualifierSet {
        &self.qualifiers
    }

    fn create(&self, _manager: &dyn Manager) -> Result<Instance, InjectionError> {
        Ok(self.instance.clone())
    }
}

// =============================================================================
// REGISTRY HELPERS
// =============================================================================

/// A [`BeanManager`](crate::BeanManager) pre-populated with one instance bean per value.
pub fn manager_with<I>(values: I) -> crate::BeanManager
where
    I: IntoIterator<Item = InstanceBean>,
{
    let manager = crate::BeanManager::new();
    for bean in values {
        manager.add_bean(bean);
    }
    manager
}
