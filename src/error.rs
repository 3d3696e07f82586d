//! # Injection Errors
//!
//! Every failure the injection core can report, grouped by the stage that
//! produced it:
//!
//! 1. [`MetadataError`] - a member description is internally inconsistent.
//! 2. [`ResolutionError`] - the manager could not supply exactly one bean.
//! 3. [`InstantiationError`] - the member was resolved but calling it failed.
//!
//! [`InjectionError`] is the union returned by the public operations, so
//! callers can either propagate it with `?` or match on the stage.

use crate::annotation::{QualifierSet, TypeKey};

/// Error type user code returns from constructor, method and field bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("{member} declares {types} parameter types but {annotations} annotation sets")]
    ParameterMismatch {
        member: String,
        types: usize,
        annotations: usize,
    },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ResolutionError {
    /// No registered bean matches the injection point.
    #[error("Unsatisfied dependency: no bean of type {ty} with qualifiers {qualifiers} for parameter {position}")]
    Unsatisfied {
        ty: TypeKey,
        qualifiers: QualifierSet,
        position: usize,
    },
    /// More than one registered bean matches the injection point.
    #[error(
        "Ambiguous dependency: {} beans of type {ty} with qualifiers {qualifiers} for parameter {position} ({})",
        .candidates.len(),
        .candidates.join(", ")
    )]
    Ambiguous {
        ty: TypeKey,
        qualifiers: QualifierSet,
        position: usize,
        candidates: Vec<String>,
    },
    /// Creating the bean requires, directly or transitively, the bean itself.
    #[error("Circular dependency while creating {ty}: {}", .chain.join(" -> "))]
    Circular { ty: TypeKey, chain: Vec<String> },
}

impl ResolutionError {
    pub fn declared_type(&self) -> TypeKey {
        match self {
            ResolutionError::Unsatisfied { ty, .. }
            | ResolutionError::Ambiguous { ty, .. }
            | ResolutionError::Circular { ty, .. } => *ty,
        }
    }

    /// Parameter position of the failing injection point; `None` for cycles.
    pub fn position(&self) -> Option<usize> {
        match self {
            ResolutionError::Unsatisfied { position, .. }
            | ResolutionError::Ambiguous { position, .. } => Some(*position),
            ResolutionError::Circular { .. } => None,
        }
    }
}

/// Why a call into a constructor, method or field body failed.
#[derive(Debug, thiserror::Error)]
pub enum InvocationFailure {
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("argument {position} is not a {expected}")]
    IllegalArgument {
        position: usize,
        expected: &'static str,
    },

    /// The body itself returned an error. The original error is kept as-is.
    #[error("target raised: {0}")]
    Target(#[source] BoxError),

    #[error("target panicked: {0}")]
    Panicked(String),
}

impl InvocationFailure {
    /// Classifies an error returned by a body.
    ///
    /// Bodies use `?` on [`Arguments`](crate::member::Arguments) accessors, so an
    /// argument failure arrives boxed; it is unwrapped back into its own variant.
    /// Anything else is the target's own error.
    pub fn from_body(error: BoxError) -> Self {
        match error.downcast::<InvocationFailure>() {
            Ok(failure) => *failure,
            Err(other) => InvocationFailure::Target(other),
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        InvocationFailure::Panicked(message)
    }
}

/// A member could not be invoked.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct InstantiationError {
    target: TypeKey,
    message: String,
    #[source]
    cause: InvocationFailure,
}

impl InstantiationError {
    pub fn new(target: TypeKey, message: impl Into<String>, cause: InvocationFailure) -> Self {
        Self {
            target,
            message: message.into(),
            cause,
        }
    }

    /// The type that was being constructed, or that declares the failing member.
    pub fn target(&self) -> TypeKey {
        self.target
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &InvocationFailure {
        &self.cause
    }

    pub fn into_cause(self) -> InvocationFailure {
        self.cause
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::Qualifier;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("disk full")]
    struct DiskFull;

    #[test]
    fn test_from_body_keeps_target_error() {
        let failure = InvocationFailure::from_body(Box::new(DiskFull));
        match failure {
            InvocationFailure::Target(e) => assert_eq!(e.downcast_ref::<DiskFull>(), Some(&DiskFull)),
            other => panic!("unexpected failure: {other:?}"),
        }
    }

    #[test]
    fn test_from_body_unwraps_argument_failures() {
        let boxed: BoxError = Box::new(InvocationFailure::IllegalArgument {
            position: 1,
            expected: "u32",
        });
        let failure = InvocationFailure::from_body(boxed);
        assert!(matches!(
            failure,
            InvocationFailure::IllegalArgument { position: 1, .. }
        ));
    }

    #[test]
    fn test_ambiguous_message_lists_candidates() {
        let err = ResolutionError::Ambiguous {
            ty: TypeKey::of::<String>(),
            qualifiers: QualifierSet::new().or_current(),
            position: 0,
            candidates: vec!["a".into(), "b".into()],
        };
        let message = err.to_string();
        assert!(message.contains("2 beans"));
        assert!(message.contains("(a, b)"));
        assert!(message.contains(&Qualifier::current().to_string()));
    }

    #[test]
    fn test_circular_message_shows_chain() {
        let err = ResolutionError::Circular {
            ty: TypeKey::of::<String>(),
            chain: vec!["A".into(), "B".into(), "A".into()],
        };
        assert_eq!(err.position(), None);
        assert!(err.to_string().ends_with("A -> B -> A"));
    }
}
