//! Ordered request parameters.

use crate::errors::DuplicateParameterError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of request parameter names to values.
///
/// Used both for GET query strings and POST form bodies. Adding a name that
/// is already present fails with `DuplicateParameterError`; use
/// [`Parameters::set`] to overwrite on purpose.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters {
    entries: IndexMap<String, String>,
}

impl Parameters {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParameterError` if the name is already present.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DuplicateParameterError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(DuplicateParameterError::new(name));
        }
        self.entries.insert(name, value.into());
        Ok(())
    }

    /// Sets a parameter, replacing any existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), value.into())
    }

    /// Gets a parameter value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Removes a parameter, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    /// Checks if a parameter exists.
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Encodes the parameters as `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn to_form_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }

    /// Appends the parameters to `url` as a query string.
    ///
    /// Existing query strings are extended with `&`, and a fragment stays at
    /// the end of the URL.
    #[must_use]
    pub fn append_to_url(&self, url: &str) -> String {
        if self.is_empty() {
            return url.to_string();
        }

        let (base, fragment) = match url.find('#') {
            Some(idx) => url.split_at(idx),
            None => (url, ""),
        };
        let separator = if base.contains('?') { '&' } else { '?' };

        format!("{base}{separator}{}{fragment}", self.to_form_urlencoded())
    }
}

impl<'a> IntoIterator for &'a Parameters {
    type Item = (&'a String, &'a String);
    type IntoIter = indexmap::map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
