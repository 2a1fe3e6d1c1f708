pub mod document;
pub mod error;
pub mod grid;
pub mod id;
pub mod model;
pub mod schema;
pub mod tree;

pub use document::{Document, ResourceBundle};
pub use error::TreeError;
pub use id::Symbol;
pub use model::*;
pub use schema::{Accepts, PropertyKind, SlotDef, TypeDef, TypeRegistry};
pub use tree::{DocumentTree, IdPolicy, InvariantViolation, UpdateGuard};

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
