//! Deferred construction of child steps.

use super::{short_type_name, Step, StepRegistry};
use crate::context::WorkflowResponse;
use crate::errors::CrawlError;
use std::fmt;

type StepFactory<R> = Box<dyn FnOnce() -> Result<Box<dyn Step<R>>, CrawlError> + Send>;

/// A child step that has been declared but not built yet.
///
/// The factory runs exactly once, when the engine reaches the child.
pub struct StepDescriptor<R: WorkflowResponse> {
    name: String,
    factory: StepFactory<R>,
}

impl<R: WorkflowResponse> StepDescriptor<R> {
    /// Creates a descriptor from a name and a fallible factory.
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Step<R>>, CrawlError> + Send + 'static,
    {
        Self {
            name: name.into(),
            factory: Box::new(factory),
        }
    }

    /// Returns the child's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds the step.
    ///
    /// # Errors
    ///
    /// Returns whatever error the factory produced.
    pub fn instantiate(self) -> Result<Box<dyn Step<R>>, CrawlError> {
        (self.factory)()
    }
}

impl<R: WorkflowResponse> fmt::Debug for StepDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The ordered children a composite step registers.
pub struct StepList<R: WorkflowResponse> {
    descriptors: Vec<StepDescriptor<R>>,
}

impl<R: WorkflowResponse> Default for StepList<R> {
    fn default() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }
}

impl<R: WorkflowResponse> StepList<R> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a child built by `factory` when it is reached.
    pub fn add<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: Step<R> + 'static,
        F: FnOnce() -> S + Send + 'static,
    {
        self.push(StepDescriptor::new(short_type_name::<S>(), move || {
            Ok(Box::new(factory()) as Box<dyn Step<R>>)
        }))
    }

    /// Registers a child built with `Default`.
    pub fn add_default<S>(&mut self) -> &mut Self
    where
        S: Step<R> + Default + 'static,
    {
        self.add(S::default)
    }

    /// Registers a child whose construction may fail.
    pub fn try_add<S, F>(&mut self, factory: F) -> &mut Self
    where
        S: Step<R> + 'static,
        F: FnOnce() -> Result<S, CrawlError> + Send + 'static,
    {
        self.push(StepDescriptor::new(short_type_name::<S>(), move || {
            factory().map(|step| Box::new(step) as Box<dyn Step<R>>)
        }))
    }

    /// Registers a child constructed by name from a registry.
    ///
    /// An unknown name is reported when the child is reached.
    pub fn add_registered(
        &mut self,
        registry: &StepRegistry<R>,
        name: &str,
        args: serde_json::Value,
    ) -> &mut Self {
        self.push(registry.descriptor(name, args))
    }

    /// Appends a prepared descriptor.
    pub fn push(&mut self, descriptor: StepDescriptor<R>) -> &mut Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Returns the number of registered children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if no child is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns the children's names in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(StepDescriptor::name).collect()
    }
}

impl<R: WorkflowResponse> IntoIterator for StepList<R> {
    type Item = StepDescriptor<R>;
    type IntoIter = std::vec::IntoIter<StepDescriptor<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl<R: WorkflowResponse> fmt::Debug for StepList<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
