//! Named step constructors.
//!
//! A registry maps step names to constructors taking JSON arguments, so a
//! workflow can be assembled from data instead of code.

use super::{Step, StepDescriptor};
use crate::context::WorkflowResponse;
use crate::errors::{CrawlError, StepConstructionError};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type StepConstructor<R> =
    Arc<dyn Fn(serde_json::Value) -> Result<Box<dyn Step<R>>, CrawlError> + Send + Sync>;

/// A name-keyed set of step constructors.
pub struct StepRegistry<R: WorkflowResponse> {
    constructors: HashMap<String, StepConstructor<R>>,
}

impl<R: WorkflowResponse> Default for StepRegistry<R> {
    fn default() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }
}

impl<R: WorkflowResponse> StepRegistry<R> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor, replacing any previous one with that name.
    pub fn register<S, F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        S: Step<R> + 'static,
        F: Fn(serde_json::Value) -> Result<S, CrawlError> + Send + Sync + 'static,
    {
        self.constructors.insert(
            name.into(),
            Arc::new(move |args: serde_json::Value| constructor(args).map(|step| Box::new(step) as Box<dyn Step<R>>)),
        );
        self
    }

    /// Registers a step that deserializes itself from its arguments.
    pub fn register_deserialize<S>(&mut self, name: impl Into<String>) -> &mut Self
    where
        S: Step<R> + DeserializeOwned + 'static,
    {
        let name = name.into();
        let step_name = name.clone();
        self.register::<S, _>(name, move |args| {
            serde_json::from_value::<S>(args)
                .map_err(|e| CrawlError::from(StepConstructionError::new(&step_name, e.to_string())))
        })
    }

    /// Checks if a name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Builds a step right away.
    ///
    /// # Errors
    ///
    /// Returns `StepConstructionError` for unknown names, or the
    /// constructor's own error.
    pub fn construct(&self, name: &str, args: serde_json::Value) -> Result<Box<dyn Step<R>>, CrawlError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| StepConstructionError::unknown(name))?;
        constructor(args)
    }

    /// Creates a descriptor that builds the step when it is reached.
    #[must_use]
    pub fn descriptor(&self, name: &str, args: serde_json::Value) -> StepDescriptor<R> {
        let constructor = self.constructors.get(name).cloned();
        let step_name = name.to_string();
        StepDescriptor::new(name, move || match constructor {
            Some(constructor) => constructor(args),
            None => Err(StepConstructionError::unknown(step_name).into()),
        })
    }
}

impl<R: WorkflowResponse> fmt::Debug for StepRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("names", &self.names())
            .finish()
    }
}
