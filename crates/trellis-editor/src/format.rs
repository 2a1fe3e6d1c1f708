//! Document text formats.

use std::io;
use std::sync::Arc;
use trellis_core::{Document, Fragment, ResourceBundle, TypeRegistry};

/// Reads and writes the textual form of a document.
pub trait DocumentFormat {
    fn parse(
        &self,
        text: &str,
        location: Option<&str>,
        resources: &ResourceBundle,
        types: &Arc<TypeRegistry>,
    ) -> io::Result<Document>;

    fn serialize(&self, document: &Document) -> io::Result<String>;
}

/// The root fragment as JSON; an empty document is `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormat;

impl DocumentFormat for JsonFormat {
    fn parse(
        &self,
        text: &str,
        location: Option<&str>,
        resources: &ResourceBundle,
        types: &Arc<TypeRegistry>,
    ) -> io::Result<Document> {
        let root: Option<Fragment> = serde_json::from_str(text)?;
        let document = match root {
            Some(root) => Document::from_fragment(types.clone(), &root)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?,
            None => Document::new(types.clone()),
        };
        let document = document.with_resources(resources.clone());
        Ok(match location {
            Some(location) => document.with_location(location),
            None => document,
        })
    }

    fn serialize(&self, document: &Document) -> io::Result<String> {
        Ok(serde_json::to_string_pretty(&document.tree.snapshot())?)
    }
}
