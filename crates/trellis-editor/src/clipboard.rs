//! Clipboard payloads.
//!
//! Copied nodes travel as MessagePack-encoded fragments, with a JSON
//! rendering alongside for plain-text consumers.

use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use trellis_core::{DocumentTree, Fragment, NodeIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    /// `Vec<Fragment>` in MessagePack.
    pub data: Vec<u8>,
    pub text: String,
}

/// Where payloads go. The editor never touches the system clipboard
/// directly.
pub trait Clipboard {
    fn set_content(&mut self, payload: ClipboardPayload);
    fn content(&self) -> Option<&ClipboardPayload>;
}

#[derive(Debug, Default)]
pub struct MemoryClipboard {
    content: Option<ClipboardPayload>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_content(&mut self, payload: ClipboardPayload) {
        self.content = Some(payload);
    }

    fn content(&self) -> Option<&ClipboardPayload> {
        self.content.as_ref()
    }
}

/// Encodes a set of nodes. Nodes nested in another encoded node are
/// carried by their ancestor only.
pub struct ClipboardEncoder<'a> {
    tree: &'a DocumentTree,
    nodes: Vec<NodeIndex>,
}

impl<'a> ClipboardEncoder<'a> {
    pub fn new(tree: &'a DocumentTree, nodes: &[NodeIndex]) -> Self {
        let nodes = tree
            .document_order()
            .into_iter()
            .filter(|n| nodes.contains(n) && !tree.ancestors(*n).any(|a| nodes.contains(&a)))
            .collect();
        Self { tree, nodes }
    }

    /// Whether there is anything attached to encode.
    pub fn is_encodable(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn make_encoding(&self) -> Result<ClipboardPayload, EditorError> {
        let fragments: Vec<Fragment> = self
            .nodes
            .iter()
            .filter_map(|&n| self.tree.export(n))
            .collect();
        let data = rmp_serde::to_vec_named(&fragments)?;
        let text = render_text(&fragments)?;
        log::debug!("encoded {} nodes for the clipboard", fragments.len());
        Ok(ClipboardPayload { data, text })
    }
}

fn render_text<T: Serialize + ?Sized>(value: &T) -> Result<String, EditorError> {
    serde_json::to_string_pretty(value).map_err(EditorError::ClipboardText)
}

/// Decode the fragments of a payload.
pub fn decode(payload: &ClipboardPayload) -> Result<Vec<Fragment>, EditorError> {
    Ok(rmp_serde::from_slice(&payload.data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use trellis_core::{Document, PropertyValue, TypeRegistry};

    #[test]
    fn text_rendering_failure_is_a_clipboard_error() {
        // JSON object keys must be strings.
        let value = std::collections::BTreeMap::from([((1, 2), "cell")]);
        let err = render_text(&value).unwrap_err();
        assert!(matches!(err, EditorError::ClipboardText(_)), "{err:?}");
        assert!(err.to_string().starts_with("selection could not be rendered"));
    }

    #[test]
    fn encode_then_decode_keeps_fragments() {
        let root = Fragment::new("root", "VBox")
            .with_child(
                "children",
                Fragment::new("box", "HBox")
                    .with_child("children", Fragment::new("ok", "Button").with_property("text", "OK")),
            )
            .with_child(
                "children",
                Fragment::new("l", "Label").with_property("text", PropertyValue::Localized("title".into())),
            );
        let doc = Document::from_fragment(Arc::new(TypeRegistry::builtin()), &root).unwrap();
        let (hbox, ok, label) = (
            doc.tree.find("box").unwrap(),
            doc.tree.find("ok").unwrap(),
            doc.tree.find("l").unwrap(),
        );
        let encoder = ClipboardEncoder::new(&doc.tree, &[label, ok, hbox]);
        assert!(encoder.is_encodable());
        let payload = encoder.make_encoding().unwrap();
        let fragments = decode(&payload).unwrap();
        assert_eq!(
            fragments,
            vec![doc.tree.export(hbox).unwrap(), doc.tree.export(label).unwrap()]
        );
        assert!(payload.text.contains("\"HBox\""));

        let mut clipboard = MemoryClipboard::new();
        assert!(clipboard.content().is_none());
        clipboard.set_content(payload.clone());
        assert_eq!(clipboard.content(), Some(&payload));
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        let payload = ClipboardPayload {
            data: vec![0xc1],
            text: String::new(),
        };
        assert!(matches!(decode(&payload), Err(EditorError::Clipboard(_))));
    }

    #[test]
    fn nothing_to_encode() {
        let doc = Document::new(Arc::new(TypeRegistry::builtin()));
        assert!(!ClipboardEncoder::new(&doc.tree, &[]).is_encodable());
    }
}
