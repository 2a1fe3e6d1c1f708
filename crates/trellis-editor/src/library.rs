//! Component library: the source of insertable subtrees.

use std::sync::Arc;
use trellis_core::{Document, Fragment, Symbol, TypeRegistry};

/// One entry of a component library.
#[derive(Debug, Clone, PartialEq)]
pub struct LibraryItem {
    pub name: String,
    pub section: String,
    /// The subtree a fresh instance starts from.
    pub template: Fragment,
}

impl LibraryItem {
    pub fn new(name: impl Into<String>, section: impl Into<String>, template: Fragment) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            template,
        }
    }
}

pub trait Library {
    fn items(&self) -> Vec<LibraryItem>;

    /// A standalone document whose root is the item's content, or `None`
    /// when the item cannot be instantiated.
    fn instantiate(&self, item: &LibraryItem) -> Option<Document>;
}

/// One item per type of a registry, each a bare instance of its type.
pub struct BuiltinLibrary {
    types: Arc<TypeRegistry>,
}

impl BuiltinLibrary {
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self { types }
    }

    /// The item for `type_name`, if the registry knows it.
    pub fn item(&self, type_name: &str) -> Option<LibraryItem> {
        let def = self.types.get(Symbol::intern(type_name))?;
        let section = if def.slots.is_empty() { "Controls" } else { "Containers" };
        let mut template = Fragment::new(type_name.to_lowercase().as_str(), type_name);
        if self.types.property_kind(def.name, Symbol::intern("text")).is_some() {
            template = template.with_property("text", type_name);
        }
        Some(LibraryItem::new(type_name, section, template))
    }
}

impl Library for BuiltinLibrary {
    fn items(&self) -> Vec<LibraryItem> {
        let mut names: Vec<&str> = self.types.types().map(|def| def.name.as_str()).collect();
        names.sort_unstable();
        names.into_iter().filter_map(|name| self.item(name)).collect()
    }

    fn instantiate(&self, item: &LibraryItem) -> Option<Document> {
        match Document::from_fragment(self.types.clone(), &item.template) {
            Ok(document) => Some(document),
            Err(err) => {
                log::warn!("cannot instantiate `{}`: {err}", item.name);
                None
            }
        }
    }
}
