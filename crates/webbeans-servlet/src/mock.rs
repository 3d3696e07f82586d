//! # Test Doubles
//!
//! [`RecordingServletContext`] wraps a real context and counts every
//! `set_attribute` call per attribute name, so tests can assert that an
//! installation happened exactly once.
//!
//! [`RecordingContainer`] is a [`Container`] with a fixed `touch` answer that
//! counts its lifecycle calls.

use crate::container::{Container, ResourceLoader};
use crate::context::{Attribute, ContainerContext, InMemoryServletContext, ServletContext};
use crate::error::EnvironmentError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub struct RecordingServletContext {
    inner: InMemoryServletContext,
    sets: DashMap<String, usize>,
}

impl RecordingServletContext {
    pub fn new(inner: InMemoryServletContext) -> Self {
        Self {
            inner,
            sets: DashMap::new(),
        }
    }

    /// How many times `name` was written.
    pub fn set_count(&self, name: &str) -> usize {
        self.sets.get(name).map(|count| *count).unwrap_or(0)
    }

    pub fn total_sets(&self) -> usize {
        self.sets.iter().map(|entry| *entry.value()).sum()
    }
}

impl ServletContext for RecordingServletContext {
    fn attribute(&self, name: &str) -> Option<Attribute> {
        self.inner.attribute(name)
    }

    fn set_attribute(&self, name: &str, value: Attribute) {
        *self.sets.entry(name.to_string()).or_insert(0) += 1;
        self.inner.set_attribute(name, value);
    }

    fn remove_attribute(&self, name: &str) -> Option<Attribute> {
        self.inner.remove_attribute(name)
    }

    fn init_parameter(&self, name: &str) -> Option<String> {
        self.inner.init_parameter(name)
    }
}

/// How a [`RecordingContainer`] answers `touch`.
#[derive(Debug, Clone)]
pub enum TouchResult {
    Accept,
    Decline,
    Fail(String),
}

pub struct RecordingContainer {
    name: String,
    touch_result: TouchResult,
    touches: AtomicUsize,
    initializations: AtomicUsize,
    destructions: AtomicUsize,
}

impl RecordingContainer {
    pub fn new(name: impl Into<String>, touch_result: TouchResult) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            touch_result,
            touches: AtomicUsize::new(0),
            initializations: AtomicUsize::new(0),
            destructions: AtomicUsize::new(0),
        })
    }

    pub fn touches(&self) -> usize {
        self.touches.load(Ordering::SeqCst)
    }

    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    pub fn destructions(&self) -> usize {
        self.destructions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Container for RecordingContainer {
    fn name(&self) -> &str {
        &self.name
    }

    async fn touch(
        &self,
        _loader: &dyn ResourceLoader,
        _context: &ContainerContext,
    ) -> Result<bool, EnvironmentError> {
        self.touches.fetch_add(1, Ordering::SeqCst);
        match &self.touch_result {
            TouchResult::Accept => Ok(true),
            TouchResult::Decline => Ok(false),
            TouchResult::Fail(reason) => Err(EnvironmentError::Probe(reason.clone())),
        }
    }

    async fn initialize(&self, _context: &ContainerContext) {
        self.initializations.fetch_add(1, Ordering::SeqCst);
    }

    async fn destroy(&self, _context: &ContainerContext) {
        self.destructions.fetch_add(1, Ordering::SeqCst);
    }
}
