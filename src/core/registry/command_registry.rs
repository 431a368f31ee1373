// Name-keyed command registry with a category map for startup diagnostics.
//
// The registry is populated from a static catalog at startup (no directory
// scanning, no dynamic loading) and is read-only afterwards. It is generic
// over the stored item so this module stays platform-agnostic; the discord
// layer instantiates it with its command trait objects.

use std::collections::{BTreeMap, HashMap};

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate command name '{0}' (categories '{1}' and '{2}')")]
    DuplicateName(String, String, String),
}

pub struct Registry<T> {
    commands: HashMap<String, T>,
    // Category -> command names, in registration order. Diagnostics only.
    categories: BTreeMap<String, Vec<String>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            categories: BTreeMap::new(),
        }
    }

    /// Record `item` under `name` in `category`. Two commands may not share a
    /// name; registration order within a category is preserved.
    pub fn register(&mut self, category: &str, name: &str, item: T) -> Result<(), RegistryError> {
        if self.commands.contains_key(name) {
            let existing = self
                .categories
                .iter()
                .find(|(_, names)| names.iter().any(|n| n == name))
                .map(|(category, _)| category.clone())
                .unwrap_or_default();
            return Err(RegistryError::DuplicateName(
                name.to_string(),
                existing,
                category.to_string(),
            ));
        }

        self.commands.insert(name.to_string(), item);
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.commands.get(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.commands.iter().map(|(name, item)| (name.as_str(), item))
    }

    /// Category -> ordered command names, sorted by category.
    pub fn categories(&self) -> &BTreeMap<String, Vec<String>> {
        &self.categories
    }
}
