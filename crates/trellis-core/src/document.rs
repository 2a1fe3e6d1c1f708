//! The document being edited: one tree plus its editing context.

use crate::error::TreeError;
use crate::model::{Fragment, PropertyValue};
use crate::schema::TypeRegistry;
use crate::tree::{DocumentTree, IdPolicy};
use std::collections::HashMap;
use std::sync::Arc;

/// Localized strings looked up by `PropertyValue::Localized` keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceBundle {
    strings: HashMap<String, String>,
}

impl ResourceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// Display text for a property value. Localized keys missing from the
    /// bundle resolve to `%key`, the way they are written in source.
    pub fn resolve(&self, value: &PropertyValue) -> Option<String> {
        match value {
            PropertyValue::Text(s) => Some(s.clone()),
            PropertyValue::Localized(key) => Some(
                self.get(key)
                    .map_or_else(|| format!("%{key}"), str::to_string),
            ),
            _ => None,
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ResourceBundle {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            strings: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A document: the owned node tree (possibly empty), where it came from,
/// its resource bundle, and the type-resolution context.
#[derive(Debug, Clone)]
pub struct Document {
    pub tree: DocumentTree,
    pub location: Option<String>,
    pub resources: ResourceBundle,
}

impl Document {
    /// An empty document (no root).
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            tree: DocumentTree::new(types),
            location: None,
            resources: ResourceBundle::new(),
        }
    }

    /// A document whose root is a copy of `root`, keeping its ids.
    pub fn from_fragment(types: Arc<TypeRegistry>, root: &Fragment) -> Result<Self, TreeError> {
        let mut doc = Self::new(types);
        let idx = doc.tree.import(root, IdPolicy::Keep)?;
        doc.tree.set_root(Some(idx))?;
        Ok(doc)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_resources(mut self, resources: ResourceBundle) -> Self {
        self.resources = resources;
        self
    }

    pub fn types(&self) -> &Arc<TypeRegistry> {
        self.tree.types()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.root().is_none()
    }

    pub fn is_update_in_progress(&self) -> bool {
        self.tree.is_update_in_progress()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_localized_text() {
        let bundle: ResourceBundle = [("greeting", "Hello")].into_iter().collect();
        assert_eq!(
            bundle.resolve(&PropertyValue::Localized("greeting".into())),
            Some("Hello".to_string())
        );
        assert_eq!(
            bundle.resolve(&PropertyValue::Localized("missing".into())),
            Some("%missing".to_string())
        );
        assert_eq!(bundle.resolve(&PropertyValue::Bool(true)), None);
    }

    #[test]
    fn document_from_fragment_sets_root() {
        let frag = Fragment::new("main", "VBox").with_child("children", Fragment::new("ok", "Button"));
        let doc = Document::from_fragment(Arc::new(TypeRegistry::builtin()), &frag).unwrap();
        assert!(!doc.is_empty());
        assert_eq!(doc.tree.snapshot(), Some(frag));
        assert!(doc.tree.find("ok").is_some());
    }
}
