//! Component type schema.
//!
//! The `TypeRegistry` is the type-resolution context of a document: it tells
//! the tree which properties a component declares, which component slots it
//! exposes and which child types each slot accepts.

use crate::id::Symbol;
use crate::model::{GridDims, PropertyValue};
use indexmap::IndexMap;
use smallvec::{SmallVec, smallvec};

/// Declared kind of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Bool,
    Integer,
    Float,
    /// Plain or localized text.
    Text,
    Object,
}

impl PropertyKind {
    pub fn admits(self, value: &PropertyValue) -> bool {
        matches!(
            (self, value),
            (PropertyKind::Bool, PropertyValue::Bool(_))
                | (PropertyKind::Integer, PropertyValue::Integer(_))
                | (PropertyKind::Float, PropertyValue::Float(_))
                | (PropertyKind::Text, PropertyValue::Text(_))
                | (PropertyKind::Text, PropertyValue::Localized(_))
                | (PropertyKind::Object, PropertyValue::Object(_))
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Integer => "integer",
            PropertyKind::Float => "float",
            PropertyKind::Text => "text",
            PropertyKind::Object => "object",
        }
    }
}

/// Which child types a slot takes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accepts {
    Any,
    Only(SmallVec<[Symbol; 2]>),
}

impl Accepts {
    pub fn admits(&self, type_name: Symbol) -> bool {
        match self {
            Accepts::Any => true,
            Accepts::Only(types) => types.contains(&type_name),
        }
    }
}

/// A named component slot.
#[derive(Debug, Clone)]
pub struct SlotDef {
    pub name: Symbol,
    pub accepts: Accepts,
    /// Maximum number of children, `None` for unbounded.
    pub capacity: Option<usize>,
    /// Children of this slot carry grid cells.
    pub grid: bool,
}

impl SlotDef {
    pub fn list(name: &str) -> Self {
        Self {
            name: Symbol::intern(name),
            accepts: Accepts::Any,
            capacity: None,
            grid: false,
        }
    }

    pub fn single(name: &str) -> Self {
        Self {
            capacity: Some(1),
            ..Self::list(name)
        }
    }

    pub fn only(mut self, types: &[&str]) -> Self {
        self.accepts = Accepts::Only(types.iter().map(|t| Symbol::intern(t)).collect());
        self
    }

    pub fn grid(mut self) -> Self {
        self.grid = true;
        self
    }
}

/// Schema of one component type.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: Symbol,
    /// Component slots; the first one is the default sub-component slot.
    pub slots: SmallVec<[SlotDef; 1]>,
    pub properties: IndexMap<Symbol, PropertyKind>,
    /// Initial track counts for grid containers.
    pub grid: Option<GridDims>,
}

impl TypeDef {
    /// A leaf control with no slots.
    pub fn leaf(name: &str) -> Self {
        Self {
            name: Symbol::intern(name),
            slots: SmallVec::new(),
            properties: IndexMap::new(),
            grid: None,
        }
    }

    pub fn container(name: &str, slot: SlotDef) -> Self {
        Self {
            slots: smallvec![slot],
            ..Self::leaf(name)
        }
    }

    pub fn with_property(mut self, name: &str, kind: PropertyKind) -> Self {
        self.properties.insert(Symbol::intern(name), kind);
        self
    }

    pub fn with_grid(mut self, dims: GridDims) -> Self {
        self.grid = Some(dims);
        self
    }

    pub fn default_slot(&self) -> Option<&SlotDef> {
        self.slots.first()
    }

    pub fn slot(&self, name: Symbol) -> Option<&SlotDef> {
        self.slots.iter().find(|s| s.name == name)
    }
}

/// All component types known to a document.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<Symbol, TypeDef>,
    /// Properties admitted on every type (layout constraints and sizes).
    common: IndexMap<Symbol, PropertyKind>,
}

/// Sentinel for "use computed size" in the size properties.
pub const USE_COMPUTED_SIZE: f64 = -1.0;

/// Size properties reset by "use computed sizes".
pub const SIZE_PROPERTIES: [&str; 6] = [
    "minWidth",
    "minHeight",
    "prefWidth",
    "prefHeight",
    "maxWidth",
    "maxHeight",
];

/// Anchor constraints honored by `AnchorPane` children.
pub const ANCHOR_PROPERTIES: [&str; 4] = [
    "AnchorPane.topAnchor",
    "AnchorPane.rightAnchor",
    "AnchorPane.bottomAnchor",
    "AnchorPane.leftAnchor",
];

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock component set.
    pub fn builtin() -> Self {
        use PropertyKind::*;

        let mut reg = Self::new();
        for name in SIZE_PROPERTIES.iter().chain(ANCHOR_PROPERTIES.iter()) {
            reg.common.insert(Symbol::intern(name), Float);
        }
        for (name, kind) in [("disable", Bool), ("visible", Bool), ("style", Text)] {
            reg.common.insert(Symbol::intern(name), kind);
        }

        let boxed = |name: &str| {
            TypeDef::container(name, SlotDef::list("children"))
                .with_property("spacing", Float)
                .with_property("alignment", Text)
        };

        reg.register(TypeDef::container("Pane", SlotDef::list("children")));
        reg.register(TypeDef::container("AnchorPane", SlotDef::list("children")));
        reg.register(TypeDef::container("StackPane", SlotDef::list("children")));
        reg.register(TypeDef::container("Group", SlotDef::list("children")));
        reg.register(boxed("VBox"));
        reg.register(boxed("HBox"));
        reg.register(
            TypeDef::container("GridPane", SlotDef::list("children").grid())
                .with_property("hgap", Float)
                .with_property("vgap", Float)
                .with_grid(GridDims::new(2, 2)),
        );
        reg.register(
            TypeDef::container("ScrollPane", SlotDef::single("content"))
                .with_property("fitToWidth", Bool),
        );
        reg.register(
            TypeDef::container("SplitPane", SlotDef::list("items"))
                .with_property("dividerPositions", Object),
        );
        reg.register(TypeDef::container("TabPane", SlotDef::list("tabs").only(&["Tab"])));
        reg.register(
            TypeDef::container("Tab", SlotDef::single("content")).with_property("text", Text),
        );
        reg.register(
            TypeDef::container("TitledPane", SlotDef::single("content"))
                .with_property("text", Text)
                .with_property("expanded", Bool),
        );
        reg.register(TypeDef::container("ToolBar", SlotDef::list("items")));
        reg.register(TypeDef::leaf("Button").with_property("text", Text));
        reg.register(TypeDef::leaf("Label").with_property("text", Text));
        reg.register(
            TypeDef::leaf("TextField")
                .with_property("text", Text)
                .with_property("promptText", Text)
                .with_property("prefColumnCount", Integer),
        );
        reg.register(
            TypeDef::leaf("CheckBox")
                .with_property("text", Text)
                .with_property("selected", Bool),
        );
        reg
    }

    /// Add or replace a type definition.
    pub fn register(&mut self, def: TypeDef) {
        self.types.insert(def.name, def);
    }

    pub fn get(&self, name: Symbol) -> Option<&TypeDef> {
        self.types.get(&name)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.types.contains_key(&name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Declared kind of `property` on `type_name`, falling back to the
    /// properties shared by every type.
    pub fn property_kind(&self, type_name: Symbol, property: Symbol) -> Option<PropertyKind> {
        self.types
            .get(&type_name)
            .and_then(|def| def.properties.get(&property))
            .or_else(|| self.common.get(&property))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_resolves_slots() {
        let reg = TypeRegistry::builtin();
        let vbox = reg.get(Symbol::intern("VBox")).unwrap();
        assert_eq!(vbox.default_slot().unwrap().name, Symbol::intern("children"));

        let button = reg.get(Symbol::intern("Button")).unwrap();
        assert!(button.default_slot().is_none());

        let tabs = reg.get(Symbol::intern("TabPane")).unwrap();
        let slot = tabs.default_slot().unwrap();
        assert!(slot.accepts.admits(Symbol::intern("Tab")));
        assert!(!slot.accepts.admits(Symbol::intern("Button")));
    }

    #[test]
    fn common_properties_apply_to_every_type() {
        let reg = TypeRegistry::builtin();
        let kind = reg.property_kind(Symbol::intern("Label"), Symbol::intern("prefWidth"));
        assert_eq!(kind, Some(PropertyKind::Float));
        let missing = reg.property_kind(Symbol::intern("Label"), Symbol::intern("hgap"));
        assert_eq!(missing, None);
    }

    #[test]
    fn text_kind_admits_localized() {
        assert!(PropertyKind::Text.admits(&PropertyValue::Localized("ok".into())));
        assert!(!PropertyKind::Float.admits(&PropertyValue::Integer(3)));
    }
}
