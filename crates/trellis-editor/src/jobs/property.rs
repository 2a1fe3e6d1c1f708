//! Property edits.

use crate::job::{EditContext, Job, applied};
use trellis_core::{Document, NodeIndex, PropertyValue, Symbol};

/// Set or clear one property of one node.
#[derive(Debug)]
pub struct ModifyPropertyJob {
    node: NodeIndex,
    name: Symbol,
    /// `None` clears the property.
    value: Option<PropertyValue>,
    previous: Option<(usize, PropertyValue)>,
}

impl ModifyPropertyJob {
    pub fn set(node: NodeIndex, name: impl Into<Symbol>, value: PropertyValue) -> Self {
        Self {
            node,
            name: name.into(),
            value: Some(value),
            previous: None,
        }
    }

    pub fn unset(node: NodeIndex, name: impl Into<Symbol>) -> Self {
        Self {
            node,
            name: name.into(),
            value: None,
            previous: None,
        }
    }
}

impl Job for ModifyPropertyJob {
    /// Executable when the value is admissible and would change something.
    fn is_executable(&self, document: &Document) -> bool {
        let tree = &document.tree;
        let Some(node) = tree.node(self.node) else {
            return false;
        };
        let current = node.property(self.name);
        match &self.value {
            Some(value) => {
                current != Some(value)
                    && tree
                        .check_property_value(self.node, self.name, value)
                        .is_ok()
            }
            None => current.is_some(),
        }
    }

    fn execute(&mut self, cx: &mut EditContext<'_>) {
        let tree = &mut cx.document.tree;
        self.previous = tree
            .node(self.node)
            .and_then(|n| n.properties().get_full(&self.name))
            .map(|(index, _, value)| (index, value.clone()));
        match &self.value {
            Some(value) => {
                applied(tree.set_property(self.node, self.name, value.clone()), "set property");
            }
            None => {
                applied(tree.unset_property(self.node, self.name), "unset property");
            }
        }
    }

    fn undo(&mut self, cx: &mut EditContext<'_>) {
        applied(
            cx.document
                .tree
                .restore_property(self.node, self.name, self.previous.clone()),
            "restore property",
        );
    }

    fn description(&self) -> String {
        format!("Set {}", self.name)
    }
}
