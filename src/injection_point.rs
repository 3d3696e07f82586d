//! # Injection Points
//!
//! An [`InjectionPoint`] is one parameter (or field) position that needs a
//! container-supplied value. It knows its declared type, the qualifiers it
//! requires, and where it sits in the member's parameter list.
//!
//! Resolution requires **exactly one** matching bean. The manager reports the
//! candidate set; the injection point turns "none" and "several" into the two
//! distinct [`ResolutionError`] variants so callers can branch on them.

use crate::annotation::{Annotation, QualifierSet, TypeKey};
use crate::error::{InjectionError, ResolutionError};
use crate::manager::Manager;
use crate::member::Instance;
use std::fmt;
use tracing::trace;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectionPoint {
    ty: TypeKey,
    qualifiers: QualifierSet,
    position: usize,
}

impl InjectionPoint {
    pub fn new(ty: TypeKey, qualifiers: QualifierSet, position: usize) -> Self {
        Self {
            ty,
            qualifiers: qualifiers.or_current(),
            position,
        }
    }

    /// Builds the point for a parameter declared with `annotations`.
    /// Markers are dropped; no qualifier at all means `@Current`.
    pub fn from_annotations(ty: TypeKey, annotations: &[Annotation], position: usize) -> Self {
        Self::new(ty, QualifierSet::from_annotations(annotations), position)
    }

    pub fn declared_type(&self) -> TypeKey {
        self.ty
    }

    pub fn qualifiers(&self) -> &QualifierSet {
        &self.qualifiers
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Asks `manager` for the single bean matching this point and returns its instance.
    pub fn resolve(&self, manager: &dyn Manager) -> Result<Instance, InjectionError> {
        let mut candidates = manager.resolve_by_type(&self.ty, &self.qualifiers);
        match candidates.len() {
            0 => Err(ResolutionError::Unsatisfied {
                ty: self.ty,
                qualifiers: self.qualifiers.clone(),
                position: self.position,
            }
            .into()),
            1 => {
                let bean = candidates.remove(0);
                trace!(position = self.position, bean = bean.name(), "Resolved");
                manager.instance_of(&bean)
            }
            _ => Err(ResolutionError::Ambiguous {
                ty: self.ty,
                qualifiers: self.qualifiers.clone(),
                position: self.position,
                candidates: candidates.iter().map(|b| b.name().to_string()).collect(),
            }
            .into()),
        }
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} {}",
            self.position,
            self.ty.short_name(),
            self.qualifiers
        )
    }
}
