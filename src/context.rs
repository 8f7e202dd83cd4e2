use std::collections::HashMap;

/// Shared state for one code generation pass.
///
/// Blocks register the preamble they depend on (imports, helper
/// definitions) under a stable key. A key is only ever stored once, so the
/// preamble appears a single time however many blocks ask for it.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    definitions: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `key` was not registered before this call.
    pub fn define(&mut self, key: &str, definition: &str) -> bool {
        if self.index.contains_key(key) {
            return false;
        }
        self.index.insert(key.to_string(), self.definitions.len());
        self.definitions
            .push((key.to_string(), definition.to_string()));
        true
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn definition(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&slot| self.definitions[slot].1.as_str())
    }

    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|(_, def)| def.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
