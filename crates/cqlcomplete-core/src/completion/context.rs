use std::collections::BTreeMap;

use serde::Serialize;

/// Values captured by bindings along one match path.
///
/// Each binding maps to the ordered list of texts it matched. Non-repeatable
/// bindings hold a single value; repeatable bindings (`[name]=`) accumulate one
/// value per repetition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BindingContext {
    values: BTreeMap<String, Vec<String>>,
}

impl BindingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to `name`. Mostly useful for constructing contexts by hand.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.bind(name, value.to_string(), true);
        self
    }

    /// The most recent value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Every value bound to `name`, in match order.
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub(crate) fn unbind(&mut self, name: &str) {
        self.values.remove(name);
    }

    pub(crate) fn bind(&mut self, name: &str, value: String, repeatable: bool) {
        let values = self.values.entry(name.to_string()).or_default();
        if !repeatable {
            values.clear();
        }
        values.push(value);
    }
}
