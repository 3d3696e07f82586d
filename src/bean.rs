//! # Beans
//!
//! A [`Bean`] is a registered source of instances for one type. The manager
//! selects beans by type and qualifiers; the bean itself decides how an
//! instance is produced and whether it is shared.
//!
//! | Bean | Produces |
//! |------|----------|
//! | [`SimpleBean<T>`] | a `T` built by a [`SimpleConstructor`] and then field/initializer injected |
//! | [`InstanceBean`] | an existing value, always the same one |
//! | [`ProducerMethodBean<D, R>`] | the result of an injectable method on another bean `D` |
//! | [`ProducerFieldBean<D, R>`] | the value of a field of another bean `D` |
//!
//! [`BeanDescriptor`] is the serializable summary of a bean, used for
//! inventories and diagnostics.
//!
//! ## Scopes
//!
//! [`Scope::Dependent`] beans create a fresh instance per injection.
//! [`Scope::Application`] beans create one instance on first use and return it
//! for the lifetime of the bean. Creation runs without any lock held, so two
//! racing first requests may both build an instance; only the first stored
//! one is ever handed out.

use crate::annotation::{Qualifier, QualifierSet, TypeKey};
use crate::constructor::{ComponentConstructor, SimpleConstructor};
use crate::error::{InjectionError, InstantiationError, InvocationFailure, MetadataError};
use crate::field::InjectionTarget;
use crate::injection_point::InjectionPoint;
use crate::manager::Manager;
use crate::member::{
    ConstructorTarget, FieldAccessor, FieldTarget, InitializerTarget, Instance, MethodTarget,
};
use crate::method::InjectableMethod;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, OnceLock};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Dependent,
    Application,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Dependent => f.write_str("dependent"),
            Scope::Application => f.write_str("application"),
        }
    }
}

pub trait Bean: Send + Sync {
    /// Name used in diagnostics, e.g. the candidate list of an ambiguous resolution.
    fn name(&self) -> &str;

    fn bean_type(&self) -> TypeKey;

    /// Declared qualifiers; `{@Current}` when the bean declares none.
    fn qualifiers(&self) -> &QualifierSet;

    fn scope(&self) -> Scope {
        Scope::Dependent
    }

    fn create(&self, manager: &dyn Manager) -> Result<Instance, InjectionError>;
}

/// Name, qualifiers and scope shared by every bean kind.
#[derive(Clone, Debug)]
struct Attributes {
    name: String,
    qualifiers: QualifierSet,
    explicit_qualifiers: bool,
    scope: Scope,
}

impl Attributes {
    fn for_type(ty: TypeKey) -> Self {
        Self {
            name: ty.short_name().to_string(),
            qualifiers: QualifierSet::new().or_current(),
            explicit_qualifiers: false,
            scope: Scope::Dependent,
        }
    }

    fn add_qualifier(&mut self, qualifier: Qualifier) {
        if !self.explicit_qualifiers {
            self.qualifiers = QualifierSet::new();
            self.explicit_qualifiers = true;
        }
        self.qualifiers.insert(qualifier);
    }
}

/// Summary of a bean that can be serialized, e.g. for a startup inventory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeanDescriptor {
    pub name: String,
    pub bean_type: String,
    pub qualifiers: QualifierSet,
    pub scope: Scope,
}

impl BeanDescriptor {
    pub fn of(bean: &dyn Bean) -> Self {
        Self {
            name: bean.name().to_string(),
            bean_type: bean.bean_type().name().to_string(),
            qualifiers: bean.qualifiers().clone(),
            scope: bean.scope(),
        }
    }
}

/// Name and qualifier builders shared by every bean kind.
macro_rules! bean_identity {
    () => {
        pub fn named(mut self, name: impl Into<String>) -> Self {
            self.attributes.name = name.into();
            self
        }

        /// Declares a qualifier. The first call replaces the implicit `@Current`.
        pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
            self.attributes.add_qualifier(qualifier);
            self
        }
    };
}

/// `bean_identity!` plus a scope builder, for beans that create instances.
macro_rules! bean_attributes {
    () => {
        bean_identity!();

        pub fn in_scope(mut self, scope: Scope) -> Self {
            self.attributes.scope = scope;
            self
        }
    };
}

/// Returns the cached instance for application-scoped beans, or creates one.
fn scoped(
    scope: Scope,
    cache: &OnceLock<Instance>,
    create: impl FnOnce() -> Result<Instance, InjectionError>,
) -> Result<Instance, InjectionError> {
    match scope {
        Scope::Dependent => create(),
        Scope::Application => {
            if let Some(existing) = cache.get() {
                return Ok(existing.clone());
            }
            let instance = create()?;
            Ok(cache.get_or_init(|| instance).clone())
        }
    }
}

// =============================================================================
// SIMPLE BEAN
// =============================================================================

pub struct SimpleBean<T> {
    attributes: Attributes,
    constructor: SimpleConstructor<T>,
    injection_target: InjectionTarget<T>,
    cache: OnceLock<Instance>,
}

impl<T: Any + Send + Sync> SimpleBean<T> {
    pub fn new(constructor: ConstructorTarget<T>) -> Result<Self, MetadataError> {
        Ok(Self {
            attributes: Attributes::for_type(TypeKey::of::<T>()),
            constructor: SimpleConstructor::new(constructor)?,
            injection_target: InjectionTarget::new(),
            cache: OnceLock::new(),
        })
    }

    bean_attributes!();

    pub fn with_field(mut self, field: FieldTarget<T>) -> Result<Self, MetadataError> {
        self.injection_target = self.injection_target.field(field)?;
        Ok(self)
    }

    pub fn with_initializer(mut self, method: InitializerTarget<T>) -> Result<Self, MetadataError> {
        self.injection_target = self.injection_target.initializer(method)?;
        Ok(self)
    }

    pub fn constructor(&self) -> &SimpleConstructor<T> {
        &self.constructor
    }
}

impl<T: Any + Send + Sync> Bean for SimpleBean<T> {
    fn name(&self) -> &str {
        &self.attributes.name
    }

    fn bean_type(&self) -> TypeKey {
        TypeKey::of::<T>()
    }

    fn qualifiers(&self) -> &QualifierSet {
        &self.attributes.qualifiers
    }

    fn scope(&self) -> Scope {
        self.attributes.scope
    }

    fn create(&self, manager: &dyn Manager) -> Result<Instance, InjectionError> {
        scoped(self.attributes.scope, &self.cache, || {
            let mut instance = self.constructor.invoke(manager)?;
            self.injection_target.inject(&mut instance, manager)?;
            Ok(Arc::new(instance) as Instance)
        })
    }
}

// =============================================================================
// INSTANCE BEAN
// =============================================================================

/// A bean wrapping a value that already exists.
pub struct InstanceBean {
    attributes: Attributes,
    ty: TypeKey,
    instance: Instance,
}

impl InstanceBean {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        let ty = TypeKey::of::<T>();
        let mut attributes = Attributes::for_type(ty);
        attributes.scope = Scope::Application;
        Self {
            attributes,
            ty,
            instance: value,
        }
    }

    // the wrapped value exists already, so the scope is fixed
    bean_identity!();
}

impl Bean for InstanceBean {
    fn name(&self) -> &str {
        &self.attributes.name
    }

    fn bean_type(&self) -> TypeKey {
        self.ty
    }

    fn qualifiers(&self) -> &QualifierSet {
        &self.attributes.qualifiers
    }

    fn scope(&self) -> Scope {
        self.attributes.scope
    }

    fn create(&self, _manager: &dyn Manager) -> Result<Instance, InjectionError> {
        Ok(self.instance.clone())
    }
}

// =============================================================================
// PRODUCER BEANS
// =============================================================================

/// Resolves the bean declaring a producer member.
fn resolve_declaring<D: Any + Send + Sync>(
    point: &InjectionPoint,
    manager: &dyn Manager,
) -> Result<Arc<D>, InjectionError> {
    point.resolve(manager)?.downcast::<D>().map_err(|_| {
        InstantiationError::new(
            TypeKey::of::<D>(),
            format!("Error resolving declaring bean {}", TypeKey::of::<D>()),
            InvocationFailure::IllegalArgument {
                position: 0,
                expected: std::any::type_name::<D>(),
            },
        )
        .into()
    })
}

/// A bean of type `R` produced by calling a method on the bean of type `D`.
///
/// The declaring instance is itself resolved from the manager, using the
/// qualifiers given with [`declared_by`](Self::declared_by).
pub struct ProducerMethodBean<D, R> {
    attributes: Attributes,
    declaring: InjectionPoint,
    method: InjectableMethod<D, R>,
    cache: OnceLock<Instance>,
}

impl<D: Any + Send + Sync, R: Any + Send + Sync> ProducerMethodBean<D, R> {
    pub fn new(method: MethodTarget<D, R>) -> Result<Self, MetadataError> {
        let method = InjectableMethod::new(method)?;
        let mut attributes = Attributes::for_type(TypeKey::of::<R>());
        attributes.name = format!(
            "{}::{}",
            TypeKey::of::<D>().short_name(),
            method.annotated_item().name()
        );
        Ok(Self {
            attributes,
            declaring: InjectionPoint::new(TypeKey::of::<D>(), QualifierSet::new(), 0),
            method,
            cache: OnceLock::new(),
        })
    }

    bean_attributes!();

    /// Qualifiers used to look up the declaring bean.
    pub fn declared_by(mut self, qualifiers: QualifierSet) -> Self {
        self.declaring = InjectionPoint::new(TypeKey::of::<D>(), qualifiers, 0);
        self
    }

    fn produce(&self, manager: &dyn Manager) -> Result<Instance, InjectionError> {
        let declaring = resolve_declaring::<D>(&self.declaring, manager)?;
        let value = self.method.invoke(&declaring, manager)?;
        Ok(Arc::new(value) as Instance)
    }
}

impl<D: Any + Send + Sync, R: Any + Send + Sync> Bean for ProducerMethodBean<D, R> {
    fn name(&self) -> &str {
        &self.attributes.name
    }

    fn bean_type(&self) -> TypeKey {
        TypeKey::of::<R>()
    }

    fn qualifiers(&self) -> &QualifierSet {
        &self.attributes.qualifiers
    }

    fn scope(&self) -> Scope {
        self.attributes.scope
    }

    fn create(&self, manager: &dyn Manager) -> Result<Instance, InjectionError> {
        scoped(self.attributes.scope, &self.cache, || self.produce(manager))
    }
}

/// A bean of type `R` read from a field of the bean of type `D`.
pub struct ProducerFieldBean<D, R> {
    attributes: Attributes,
    declaring: InjectionPoint,
    field: FieldAccessor<D, R>,
    cache: OnceLock<Instance>,
}

impl<D: Any + Send + Sync, R: Any + Send + Sync> ProducerFieldBean<D, R> {
    pub fn new(field: FieldAccessor<D, R>) -> Self {
        let mut attributes = Attributes::for_type(TypeKey::of::<R>());
        attributes.name = format!("{}::{}", TypeKey::of::<D>().short_name(), field.name());
        Self {
            attributes,
            declaring: InjectionPoint::new(TypeKey::of::<D>(), QualifierSet::new(), 0),
            field,
            cache: OnceLock::new(),
        }
    }

    bean_attributes!();

    /// Qualifiers used to look up the declaring bean.
    pub fn declared_by(mut self, qualifiers: QualifierSet) -> Self {
        self.declaring = InjectionPoint::new(TypeKey::of::<D>(), qualifiers, 0);
        self
    }

    fn produce(&self, manager: &dyn Manager) -> Result<Instance, InjectionError> {
        let declaring = resolve_declaring::<D>(&self.declaring, manager)?;
        let value = self.field.get(&declaring).map_err(|cause| {
            InstantiationError::new(
                TypeKey::of::<D>(),
                format!("Error reading field {}::{}", TypeKey::of::<D>(), self.field.name()),
                cause,
            )
        })?;
        Ok(Arc::new(value) as Instance)
    }
}

impl<D: Any + Send + Sync, R: Any + Send + Sync> Bean for ProducerFieldBean<D, R> {
    fn name(&self) -> &str {
        &self.attributes.name
    }

    fn bean_type(&self) -> TypeKey {
        TypeKey::of::<R>()
    }

    fn qualifiers(&self) -> &QualifierSet {
        &self.attributes.qualifiers
    }

    fn scope(&self) -> Scope {
        self.attributes.scope
    }

    fn create(&self, manager: &dyn Manager) -> Result<Instance, InjectionError> {
        scoped(self.attributes.scope, &self.cache, || self.produce(manager))
    }
}

impl fmt::Debug for dyn Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("name", &self.name())
            .field("type", &self.bean_type().short_name())
            .field("qualifiers", &self.qualifiers().to_string())
            .field("scope", &self.scope())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::BeanManager;
    use crate::member::Arguments;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        id: usize,
    }

    fn counting_bean(created: Arc<AtomicUsize>) -> SimpleBean<Counter> {
        SimpleBean::new(ConstructorTarget::new(move |_: &Arguments| {
            Ok(Counter {
                id: created.fetch_add(1, Ordering::SeqCst),
            })
        }))
        .unwrap()
    }

    #[test]
    fn test_default_attributes() {
        let bean = counting_bean(Arc::new(AtomicUsize::new(0)));
        assert_eq!(bean.name(), "Counter");
        assert_eq!(bean.scope(), Scope::Dependent);
        assert!(bean.qualifiers().contains(&Qualifier::current()));
    }

    #[test]
    fn test_explicit_qualifier_replaces_current() {
        let bean = counting_bean(Arc::new(AtomicUsize::new(0)))
            .with_qualifier(Qualifier::named("a"))
            .with_qualifier(Qualifier::new("Fast"));
        assert_eq!(bean.qualifiers().len(), 2);
        assert!(!bean.qualifiers().contains(&Qualifier::current()));
    }

    #[test]
    fn test_dependent_scope_creates_each_time() {
        let manager = BeanManager::new();
        let created = Arc::new(AtomicUsize::new(0));
        let bean = counting_bean(created.clone());

        let a: Arc<Counter> = bean.create(&manager).unwrap().downcast().unwrap();
        let b: Arc<Counter> = bean.create(&manager).unwrap().downcast().unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_application_scope_caches() {
        let manager = BeanManager::new();
        let created = Arc::new(AtomicUsize::new(0));
        let bean = counting_bean(created.clone()).in_scope(Scope::Application);

        let a = bean.create(&manager).unwrap();
        let b = bean.create(&manager).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_producer_method_uses_declaring_bean() {
        struct Config {
            url: &'static str,
        }
        #[derive(Debug, PartialEq)]
        struct Connection(String);

        let manager = BeanManager::new();
        manager.add_bean(InstanceBean::new(Config { url: "db://main" }));
        manager.add_bean(InstanceBean::new(3u8));

        let producer = ProducerMethodBean::new(
            MethodTarget::new("connect", |c: &Config, args: &Arguments| {
                Ok(Connection(format!("{}?pool={}", c.url, args.get::<u8>(0)?)))
            })
            .parameter::<u8>([]),
        )
        .unwrap();
        assert_eq!(producer.name(), "Config::connect");
        assert_eq!(producer.bean_type(), TypeKey::of::<Connection>());

        let connection: Arc<Connection> = producer.create(&manager).unwrap().downcast().unwrap();
        assert_eq!(*connection, Connection("db://main?pool=3".to_string()));
    }

    #[test]
    fn test_producer_field_reads_declaring_bean() {
        struct Settings {
            timeout_ms: u64,
        }

        let manager = BeanManager::new();
        manager.add_bean(
            InstanceBean::new(Settings { timeout_ms: 250 }).with_qualifier(Qualifier::named("http")),
        );

        let producer =
            ProducerFieldBean::new(FieldAccessor::new("timeout_ms", |s: &Settings| s.timeout_ms))
                .declared_by([Qualifier::named("http")].into_iter().collect())
                .with_qualifier(Qualifier::named("timeout"));
        assert_eq!(producer.name(), "Settings::timeout_ms");
        assert_eq!(producer.bean_type(), TypeKey::of::<u64>());

        let timeout: Arc<u64> = producer.create(&manager).unwrap().downcast().unwrap();
        assert_eq!(*timeout, 250);
    }

    #[test]
    fn test_producer_field_without_declaring_bean() {
        struct Settings {
            retries: u8,
        }

        let manager = BeanManager::new();
        let producer =
            ProducerFieldBean::new(FieldAccessor::new("retries", |s: &Settings| s.retries));
        let err = producer.create(&manager).unwrap_err();
        assert!(matches!(
            err,
            InjectionError::Resolution(crate::error::ResolutionError::Unsatisfied { .. })
        ));
    }

    #[test]
    fn test_instance_bean_identity() {
        let bean = InstanceBean::new(7u16)
            .named("port")
            .with_qualifier(Qualifier::named("admin"));
        assert_eq!(bean.name(), "port");
        assert_eq!(bean.scope(), Scope::Application);
        assert!(!bean.qualifiers().contains(&Qualifier::current()));
    }

    #[test]
    fn test_scope_display_and_default() {
        assert_eq!(Scope::Application.to_string(), "application");
        assert_eq!(Scope::default(), Scope::Dependent);
    }

    #[test]
    fn test_descriptor_round_trips_through_json() {
        let bean = counting_bean(Arc::new(AtomicUsize::new(0)))
            .with_qualifier(Qualifier::named("primary"))
            .in_scope(Scope::Application);
        let descriptor = BeanDescriptor::of(&bean);

        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json["scope"], "application");
        assert_eq!(json["qualifiers"][0]["name"], "Named");
        assert_eq!(json["qualifiers"][0]["value"], "primary");

        let parsed: BeanDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, descriptor);
    }

    #[test]
    fn test_scope_parses_lowercase() {
        let scope: Scope = serde_json::from_str("\"application\"").unwrap();
        assert_eq!(scope, Scope::Application);
        assert!(serde_json::from_str::<Scope>("\"request\"").is_err());
    }
}
