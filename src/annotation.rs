//! # Annotation Model
//!
//! Types describing *what* an injection point asks for: the declared type
//! ([`TypeKey`]) and the qualifiers that narrow which bean may satisfy it.
//!
//! Every parameter of a member carries an ordered [`AnnotationSet`]. Only the
//! [`Annotation::Qualifier`] entries take part in resolution; markers are kept
//! so the metadata stays a faithful description of the declaration.

use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

/// A declared type, identified by its [`TypeId`] and carrying its name for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, e.g. `my_app::service::Mailer`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, e.g. `Mailer`.
    pub fn short_name(&self) -> &'static str {
        self.name.split("::").last().unwrap_or(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A binding marker that narrows which bean implementation satisfies an injection point.
///
/// Two qualifiers are equal when both their name and their value are equal, so
/// `@Named("primary")` and `@Named("replica")` select different beans.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Qualifier {
    name: Cow<'static, str>,
    value: Option<String>,
}

impl Qualifier {
    /// Name of the default qualifier, implied when a declaration has none.
    pub const CURRENT: &'static str = "Current";
    pub const NAMED: &'static str = "Named";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn current() -> Self {
        Self::new(Self::CURRENT)
    }

    pub fn named(value: impl Into<String>) -> Self {
        Self::new(Self::NAMED).with_value(value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "@{}(\"{}\")", self.name, value),
            None => write!(f, "@{}", self.name),
        }
    }
}

/// One annotation attached to a parameter or field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Takes part in resolution.
    Qualifier(Qualifier),
    /// Any other annotation; carried as metadata, ignored by resolution.
    Marker(Cow<'static, str>),
}

impl Annotation {
    pub fn marker(name: impl Into<Cow<'static, str>>) -> Self {
        Annotation::Marker(name.into())
    }

    pub fn as_qualifier(&self) -> Option<&Qualifier> {
        match self {
            Annotation::Qualifier(q) => Some(q),
            Annotation::Marker(_) => None,
        }
    }
}

impl From<Qualifier> for Annotation {
    fn from(q: Qualifier) -> Self {
        Annotation::Qualifier(q)
    }
}

/// The annotations declared on a single parameter, in declaration order.
pub type AnnotationSet = Vec<Annotation>;

/// An ordered, duplicate-free set of qualifiers.
///
/// Used both for what an injection point *requires* and for what a bean *declares*.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifierSet(BTreeSet<Qualifier>);

impl QualifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Qualifiers found among `annotations`, or `{@Current}` when there are none.
    pub fn from_annotations(annotations: &[Annotation]) -> Self {
        annotations
            .iter()
            .filter_map(Annotation::as_qualifier)
            .cloned()
            .collect::<Self>()
            .or_current()
    }

    /// Returns `{@Current}` if the set is empty, otherwise the set unchanged.
    pub fn or_current(mut self) -> Self {
        if self.0.is_empty() {
            self.0.insert(Qualifier::current());
        }
        self
    }

    pub fn insert(&mut self, qualifier: Qualifier) -> bool {
        self.0.insert(qualifier)
    }

    pub fn contains(&self, qualifier: &Qualifier) -> bool {
        self.0.contains(qualifier)
    }

    /// True when every qualifier in `required` is also in `self`.
    pub fn satisfies(&self, required: &QualifierSet) -> bool {
        required.0.is_subset(&self.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Qualifier> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Qualifier> for QualifierSet {
    fn from_iter<I: IntoIterator<Item = Qualifier>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Display for QualifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, q) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", q)?;
        }
        f.write_str("}")
    }
}
