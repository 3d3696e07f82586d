//! # Bean Manager
//!
//! The [`Manager`] trait is the lookup seam used by every injection point:
//! report the beans matching a type and qualifier set, and produce an
//! instance of a chosen bean. Choosing *which* bean (and failing when there
//! is not exactly one) is the caller's job, see
//! [`InjectionPoint::resolve`](crate::injection_point::InjectionPoint::resolve).
//!
//! [`BeanManager`] is the in-process implementation. It is passed explicitly
//! to whoever needs it; there is no global instance.
//!
//! Creation is tracked per thread: a bean whose creation needs the bean
//! itself (`A(B)`, `B(A)`) fails with [`ResolutionError::Circular`] instead
//! of recursing.
//!
//! ```rust
//! use std::sync::Arc;
//! use webbeans::{BeanManager, ConstructorTarget, InstanceBean, SimpleBean};
//! use webbeans::member::Arguments;
//!
//! struct Greeter { name: Arc<String> }
//!
//! let manager = BeanManager::new();
//! manager.add_bean(InstanceBean::new("world".to_string()));
//! manager.add_bean(
//!     SimpleBean::new(
//!         ConstructorTarget::new(|args: &Arguments| Ok(Greeter { name: args.get(0)? }))
//!             .parameter::<String>([]),
//!     )
//!     .unwrap(),
//! );
//!
//! let greeter = manager.instance::<Greeter>(&[]).unwrap();
//! assert_eq!(greeter.name.as_str(), "world");
//! ```

use crate::annotation::{Qualifier, QualifierSet, TypeKey};
use crate::bean::{Bean, BeanDescriptor, InstanceBean};
use crate::error::{InjectionError, InstantiationError, InvocationFailure, ResolutionError};
use crate::field::InjectionTarget;
use crate::injection_point::InjectionPoint;
use crate::member::Instance;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

pub trait Manager: Send + Sync {
    /// Every registered bean of type `ty` whose qualifiers include all of `qualifiers`.
    ///
    /// May return zero, one or several beans, in registration order.
    fn resolve_by_type(&self, ty: &TypeKey, qualifiers: &QualifierSet) -> Vec<Arc<dyn Bean>>;

    /// An instance of `bean`, honoring its scope.
    fn instance_of(&self, bean: &Arc<dyn Bean>) -> Result<Instance, InjectionError>;
}

thread_local! {
    /// Beans being created on this thread, outermost first.
    static CREATING: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Keeps a bean on the creation path until dropped.
struct CreationGuard;

impl CreationGuard {
    fn enter(bean: &Arc<dyn Bean>) -> Result<Self, ResolutionError> {
        let id = Arc::as_ptr(bean) as *const () as usize;
        CREATING.with(|creating| {
            let mut creating = creating.borrow_mut();
            if let Some(start) = creating.iter().position(|(entered, _)| *entered == id) {
                let mut chain: Vec<String> =
                    creating[start..].iter().map(|(_, name)| name.clone()).collect();
                chain.push(bean.name().to_string());
                return Err(ResolutionError::Circular {
                    ty: bean.bean_type(),
                    chain,
                });
            }
            creating.push((id, bean.name().to_string()));
            Ok(CreationGuard)
        })
    }
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        CREATING.with(|creating| {
            creating.borrow_mut().pop();
        });
    }
}

type Injector = dyn Fn(&mut dyn Any, &dyn Manager) -> Result<(), InjectionError> + Send + Sync;

#[derive(Default)]
pub struct BeanManager {
    beans: DashMap<TypeKey, Vec<Arc<dyn Bean>>>,
    injection_targets: DashMap<TypeId, Arc<Injector>>,
    resolutions: AtomicUsize,
}

impl BeanManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bean(&self, bean: impl Bean + 'static) {
        self.add_shared_bean(Arc::new(bean));
    }

    pub fn add_shared_bean(&self, bean: Arc<dyn Bean>) {
        debug!(
            bean = bean.name(),
            bean_type = bean.bean_type().short_name(),
            qualifiers = %bean.qualifiers(),
            scope = %bean.scope(),
            "Bean registered"
        );
        self.beans.entry(bean.bean_type()).or_default().push(bean);
    }

    /// Registers `value` as an application-scoped bean with the given qualifiers.
    pub fn register_instance<T: Any + Send + Sync>(
        &self,
        value: T,
        qualifiers: impl IntoIterator<Item = Qualifier>,
    ) {
        let bean = qualifiers
            .into_iter()
            .fold(InstanceBean::new(value), InstanceBean::with_qualifier);
        self.add_bean(bean);
    }

    pub fn bean_count(&self) -> usize {
        self.beans.iter().map(|entry| entry.value().len()).sum()
    }

    /// Serializable summaries of every registered bean, ordered by type then name.
    pub fn descriptors(&self) -> Vec<BeanDescriptor> {
        let mut descriptors: Vec<BeanDescriptor> = self
            .beans
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|bean| BeanDescriptor::of(bean.as_ref()))
                    .collect::<Vec<_>>()
            })
            .collect();
        descriptors.sort_by(|a, b| (&a.bean_type, &a.name).cmp(&(&b.bean_type, &b.name)));
        descriptors
    }

    /// Number of successful [`instance_of`](Manager::instance_of) calls so far.
    pub fn resolutions(&self) -> usize {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Looks up exactly one bean of type `T` and returns its instance.
    ///
    /// An empty `qualifiers` slice means `@Current`.
    pub fn instance<T: Any + Send + Sync>(
        &self,
        qualifiers: &[Qualifier],
    ) -> Result<Arc<T>, InjectionError> {
        let point = InjectionPoint::new(
            TypeKey::of::<T>(),
            qualifiers.iter().cloned().collect(),
            0,
        );
        point.resolve(self)?.downcast::<T>().map_err(|_| {
            InstantiationError::new(
                TypeKey::of::<T>(),
                format!("Bean registered for {} produced another type", TypeKey::of::<T>()),
                InvocationFailure::IllegalArgument {
                    position: 0,
                    expected: std::any::type_name::<T>(),
                },
            )
            .into()
        })
    }

    /// Registers the fields and initializers to inject into externally created `T`s.
    ///
    /// Replaces any target previously registered for `T`.
    pub fn add_injection_target<T: Any + Send + Sync>(&self, target: InjectionTarget<T>) {
        let injector = move |object: &mut dyn Any, manager: &dyn Manager| {
            match object.downcast_mut::<T>() {
                Some(instance) => target.inject(instance, manager),
                None => Ok(()),
            }
        };
        self.injection_targets
            .insert(TypeId::of::<T>(), Arc::new(injector));
    }

    /// Injects into an object this manager did not create.
    ///
    /// Returns `false` when no injection target is registered for the object's type.
    pub fn inject(&self, object: &mut dyn Any) -> Result<bool, InjectionError> {
        let type_id = (*object).type_id();
        let injector = self
            .injection_targets
            .get(&type_id)
            .map(|entry| entry.value().clone());
        match injector {
            Some(injector) => {
                injector(object, self)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl Manager for BeanManager {
    fn resolve_by_type(&self, ty: &TypeKey, qualifiers: &QualifierSet) -> Vec<Arc<dyn Bean>> {
        let candidates: Vec<Arc<dyn Bean>> = self
            .beans
            .get(ty)
            .map(|beans| {
                beans
                    .iter()
                    .filter(|bean| bean.qualifiers().satisfies(qualifiers))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        trace!(
            bean_type = ty.short_name(),
            qualifiers = %qualifiers,
            candidates = candidates.len(),
            "Resolved by type"
        );
        candidates
    }

    fn instance_of(&self, bean: &Arc<dyn Bean>) -> Result<Instance, InjectionError> {
        // the registry guard is already released here; creation may resolve recursively
        let _creating = CreationGuard::enter(bean).inspect_err(|err| {
            warn!(bean = bean.name(), error = %err, "Dependency cycle detected");
        })?;
        let instance = bean.create(self)?;
        self.resolutions.fetch_add(1, Ordering::Relaxed);
        Ok(instance)
    }
}
