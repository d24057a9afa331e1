//! Build variants - named feature toggles.
//!
//! A recipe declares a fixed vocabulary of variants; a spec requests
//! values for some of them. Resolution overlays the requests on the
//! declared defaults and rejects names outside the vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The value a variant can take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariantValue {
    /// Boolean feature toggle.
    Bool(bool),
    /// Enumerated value list (e.g. CUDA architectures).
    List(Vec<String>),
}

impl VariantValue {
    /// True for `Bool(true)`; lists are never "enabled".
    pub fn is_enabled(&self) -> bool {
        matches!(self, VariantValue::Bool(true))
    }

    /// View as a value list, empty for booleans.
    pub fn as_list(&self) -> &[String] {
        match self {
            VariantValue::List(values) => values,
            VariantValue::Bool(_) => &[],
        }
    }
}

/// Declaration of one variant in a recipe's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDef {
    /// Variant name, e.g. `openmp`.
    pub name: &'static str,
    /// Value when the spec does not mention the variant.
    pub default: VariantValue,
    /// One-line description shown by `slipway info`.
    pub description: &'static str,
    /// The variant is only meaningful while this other variant is enabled.
    pub when: Option<&'static str>,
}

impl VariantDef {
    /// Declare a boolean variant.
    pub fn boolean(name: &'static str, default: bool, description: &'static str) -> Self {
        VariantDef {
            name,
            default: VariantValue::Bool(default),
            description,
            when: None,
        }
    }

    /// Declare a list variant with an empty default.
    pub fn list(name: &'static str, description: &'static str) -> Self {
        VariantDef {
            name,
            default: VariantValue::List(Vec::new()),
            description,
            when: None,
        }
    }

    /// Restrict the variant to specs where `prerequisite` is enabled.
    pub fn when(mut self, prerequisite: &'static str) -> Self {
        self.when = Some(prerequisite);
        self
    }
}

/// The variant values of a spec.
///
/// Backed by a `BTreeMap` so iteration order (and therefore every
/// derived plan) is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantSet {
    values: BTreeMap<String, VariantValue>,
}

impl VariantSet {
    /// Create an empty variant set.
    pub fn new() -> Self {
        VariantSet::default()
    }

    /// Set a boolean variant.
    pub fn set_bool(&mut self, name: impl Into<String>, value: bool) {
        self.values.insert(name.into(), VariantValue::Bool(value));
    }

    /// Set a list variant.
    pub fn set_list(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.values.insert(name.into(), VariantValue::List(values));
    }

    /// Builder-style boolean setter.
    pub fn with_bool(mut self, name: impl Into<String>, value: bool) -> Self {
        self.set_bool(name, value);
        self
    }

    /// Builder-style list setter.
    pub fn with_list(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        self.set_list(name, values);
        self
    }

    /// Look up a variant value.
    pub fn get(&self, name: &str) -> Option<&VariantValue> {
        self.values.get(name)
    }

    /// True if the variant is present and enabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.get(name).is_some_and(VariantValue::is_enabled)
    }

    /// The value list of a list variant, empty if absent.
    pub fn list(&self, name: &str) -> &[String] {
        self.get(name).map(VariantValue::as_list).unwrap_or(&[])
    }

    /// Iterate names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate entries in stable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariantValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of requested variants.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
