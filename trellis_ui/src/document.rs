// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building control trees from parsed markup.
//!
//! An external parser produces an [`ElementNode`] tree; a
//! [`ControlRegistry`] maps element names to widget factories and turns that
//! tree into controls. Materialization is all-or-nothing: the whole document
//! is validated before the first control is created, so a rejected document
//! leaves the [`ControlTree`] untouched.
//!
//! Attributes are applied through the string property surface
//! ([`ControlTree::set_property`]). Attributes naming an event (`onClick`)
//! are not properties; they are returned as [`EventBinding`]s for a scripting
//! layer to wire up through the [`EventHub`](crate::events::EventHub).

use core::fmt;

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::events::EventKind;
use crate::panels::{Canvas, DockPanel, Grid, StackPanel, WrapPanel};
use crate::tree::{ControlId, ControlTree};
use crate::widget::{ContentModel, Widget};
use crate::widgets::{Border, Button, ContentControl, Rectangle, Slider, TextBlock};

/// One element of a parsed document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementNode {
    /// Element name, e.g. `"StackPanel"`.
    pub tag: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Child elements in document order.
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// An element with no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// The value of the first attribute matching `name` case-insensitively.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A single problem found while validating a document.
///
/// `path` locates the element as `/Tag[index]/...`, where `index` is the
/// element's position among its parent's children.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// No factory is registered for the element name.
    #[error("{path}: unknown element <{tag}>")]
    UnknownElement {
        /// Element name.
        tag: String,
        /// Element location.
        path: String,
    },
    /// Two elements share an `id`.
    #[error("{path}: duplicate id \"{id}\"")]
    DuplicateId {
        /// The repeated id.
        id: String,
        /// Location of the second occurrence.
        path: String,
    },
    /// A required attribute is absent.
    #[error("{path}: <{tag}> requires attribute \"{attribute}\"")]
    MissingAttribute {
        /// Element name.
        tag: String,
        /// Missing attribute name.
        attribute: String,
        /// Element location.
        path: String,
    },
    /// A single-content element has more than one child.
    #[error("{path}: <{tag}> holds a single child but has {count}")]
    TooManyChildren {
        /// Element name.
        tag: String,
        /// Number of children found.
        count: usize,
        /// Element location.
        path: String,
    },
    /// A leaf element has children.
    #[error("{path}: <{tag}> cannot have children")]
    UnexpectedChildren {
        /// Element name.
        tag: String,
        /// Element location.
        path: String,
    },
}

/// Every problem found in a rejected document, in document order.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("document rejected with {} error(s)", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// The individual errors.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// An event attribute found during materialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventBinding {
    /// Control the attribute was on.
    pub control: ControlId,
    /// Event the attribute names.
    pub kind: EventKind,
    /// Attribute value, typically a script handler name.
    pub handler: String,
}

/// Result of a successful materialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Materialized {
    /// The control built from the document's root element.
    pub root: ControlId,
    /// Event attributes, in document order.
    pub bindings: Vec<EventBinding>,
}

type Factory = Box<dyn Fn() -> Box<dyn Widget>>;

struct Entry {
    factory: Factory,
    content: ContentModel,
    required: Vec<String>,
}

/// Element-name to widget-factory table.
///
/// Element names are matched case-insensitively.
#[derive(Default)]
pub struct ControlRegistry {
    entries: FxHashMap<String, Entry>,
}

impl fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("ControlRegistry")
            .field("tags", &tags)
            .finish_non_exhaustive()
    }
}

impl ControlRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in panel and widget.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .register("StackPanel", StackPanel::vertical)
            .register("Grid", Grid::new)
            .register("Canvas", Canvas::new)
            .register("DockPanel", DockPanel::new)
            .register("WrapPanel", WrapPanel::new)
            .register("ContentControl", ContentControl::new)
            .register("Border", Border::new)
            .register("Button", Button::new)
            .register("TextBlock", || TextBlock::new(""))
            .register("Slider", Slider::new)
            .register("Rectangle", Rectangle::new);
        registry
    }

    /// Registers `factory` under `tag`, replacing any previous entry.
    ///
    /// The content model is read from one instance built at registration.
    pub fn register<W: Widget>(&mut self, tag: &str, factory: impl Fn() -> W + 'static) -> &mut Self {
        let content = factory().content_model();
        self.entries.insert(
            tag.to_ascii_lowercase(),
            Entry {
                factory: Box::new(move || Box::new(factory())),
                content,
                required: Vec::new(),
            },
        );
        self
    }

    /// Marks `attribute` as required on `tag`. Does nothing for an
    /// unregistered tag.
    pub fn require(&mut self, tag: &str, attribute: &str) -> &mut Self {
        if let Some(entry) = self.entries.get_mut(&tag.to_ascii_lowercase()) {
            entry.required.push(attribute.to_owned());
        }
        self
    }

    /// Whether `tag` is registered.
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(&tag.to_ascii_lowercase())
    }

    /// Checks `node` and its descendants without building anything.
    ///
    /// # Errors
    ///
    /// Every problem found, in document order.
    pub fn validate(&self, node: &ElementNode) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let mut ids = FxHashSet::default();
        self.validate_node(node, &format!("/{}[0]", node.tag), &mut ids, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    fn validate_node<'a>(
        &self,
        node: &'a ElementNode,
        path: &str,
        ids: &mut FxHashSet<&'a str>,
        errors: &mut Vec<ValidationError>,
    ) {
        match self.entries.get(&node.tag.to_ascii_lowercase()) {
            None => errors.push(ValidationError::UnknownElement {
                tag: node.tag.clone(),
                path: path.to_owned(),
            }),
            Some(entry) => {
                for attribute in &entry.required {
                    if node.attribute(attribute).is_none() {
                        errors.push(ValidationError::MissingAttribute {
                            tag: node.tag.clone(),
                            attribute: attribute.clone(),
                            path: path.to_owned(),
                        });
                    }
                }
                match entry.content {
                    ContentModel::Single if node.children.len() > 1 => {
                        errors.push(ValidationError::TooManyChildren {
                            tag: node.tag.clone(),
                            count: node.children.len(),
                            path: path.to_owned(),
                        });
                    }
                    ContentModel::Leaf if !node.children.is_empty() => {
                        errors.push(ValidationError::UnexpectedChildren {
                            tag: node.tag.clone(),
                            path: path.to_owned(),
                        });
                    }
                    _ => {}
                }
            }
        }

        if let Some(id) = node.attribute("id")
            && !ids.insert(id)
        {
            errors.push(ValidationError::DuplicateId {
                id: id.to_owned(),
                path: path.to_owned(),
            });
        }

        for (i, child) in node.children.iter().enumerate() {
            let child_path = format!("{path}/{}[{i}]", child.tag);
            self.validate_node(child, &child_path, ids, errors);
        }
    }

    /// Validates `node`, then builds it into `tree` and returns the root
    /// control.
    ///
    /// # Errors
    ///
    /// Every validation problem; nothing is created.
    pub fn materialize(&self, tree: &mut ControlTree, node: &ElementNode) -> Result<ControlId, ValidationErrors> {
        self.materialize_with_bindings(tree, node).map(|m| m.root)
    }

    /// Like [`materialize`](Self::materialize), also returning the
    /// document's event attributes.
    ///
    /// # Errors
    ///
    /// Every validation problem; nothing is created.
    pub fn materialize_with_bindings(
        &self,
        tree: &mut ControlTree,
        node: &ElementNode,
    ) -> Result<Materialized, ValidationErrors> {
        if let Err(errors) = self.validate(node) {
            tracing::warn!(count = errors.0.len(), %errors, "document validation failed");
            for error in errors.errors() {
                tracing::debug!(%error, "validation error");
            }
            return Err(errors);
        }
        let before = tree.len();
        let mut bindings = Vec::new();
        let root = self.build(tree, node, &mut bindings);
        tracing::debug!(
            controls = tree.len() - before,
            bindings = bindings.len(),
            "document materialized"
        );
        Ok(Materialized { root, bindings })
    }

    fn build(&self, tree: &mut ControlTree, node: &ElementNode, bindings: &mut Vec<EventBinding>) -> ControlId {
        let widget: Box<dyn Widget> = match self.entries.get(&node.tag.to_ascii_lowercase()) {
            Some(entry) => (entry.factory)(),
            // Unreachable after validation; an empty content control keeps
            // the build total.
            None => Box::new(ContentControl::new()),
        };
        let id = tree.create_boxed(widget);

        for (name, value) in &node.attributes {
            if let Some(kind) = event_attribute(name) {
                bindings.push(EventBinding {
                    control: id,
                    kind,
                    handler: value.clone(),
                });
                continue;
            }
            if let Err(err) = tree.set_property(id, name, value) {
                tracing::warn!(tag = %node.tag, %err, "ignoring attribute");
            }
        }

        for child in &node.children {
            let child = self.build(tree, child, bindings);
            tree.add_child(id, child);
        }
        id
    }
}

/// `onClick` and friends.
fn event_attribute(name: &str) -> Option<EventKind> {
    let prefix = name.get(..2)?;
    if !prefix.eq_ignore_ascii_case("on") {
        return None;
    }
    EventKind::from_name(&name[2..])
}

#[cfg(test)]
mod tests {
    use trellis_core::geometry::Size;

    use super::*;
    use crate::panels::Orientation;

    fn text(value: &str) -> ElementNode {
        ElementNode::new("TextBlock").with_attribute("Text", value)
    }

    #[test]
    fn builds_tree_and_applies_attributes() {
        let doc = ElementNode::new("StackPanel")
            .with_attribute("Orientation", "Horizontal")
            .with_attribute("Spacing", "5")
            .with_child(text("a").with_attribute("id", "first"))
            .with_child(
                ElementNode::new("Button")
                    .with_attribute("Width", "80")
                    .with_attribute("onClick", "save")
                    .with_child(text("Save")),
            );
        let registry = ControlRegistry::with_builtins();
        let mut tree = ControlTree::new();
        let out = registry
            .materialize_with_bindings(&mut tree, &doc)
            .expect("valid document");

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.child_count(out.root), 2);
        let stack = tree.widget::<StackPanel>(out.root).expect("stack");
        assert_eq!(stack.orientation(), Orientation::Horizontal);

        let first = tree.find_by_name(out.root, "first").expect("named");
        assert_eq!(tree.widget::<TextBlock>(first).map(TextBlock::text), Some("a"));

        let button = tree.children(out.root).nth(1).expect("button");
        assert_eq!(tree.props(button).width, Some(80.0));
        assert_eq!(
            out.bindings,
            vec![EventBinding {
                control: button,
                kind: EventKind::Click,
                handler: "save".to_owned(),
            }]
        );

        tree.update_layout(out.root, Size::new(300.0, 100.0));
    }

    #[test]
    fn invalid_document_creates_nothing() {
        let doc = ElementNode::new("StackPanel")
            .with_child(ElementNode::new("Blink"))
            .with_child(text("a").with_attribute("id", "x"))
            .with_child(text("b").with_attribute("ID", "x"))
            .with_child(
                ElementNode::new("Border")
                    .with_child(text("one"))
                    .with_child(text("two")),
            )
            .with_child(ElementNode::new("Rectangle").with_child(text("inner")));
        let registry = ControlRegistry::with_builtins();
        let mut tree = ControlTree::new();
        let errors = registry.materialize(&mut tree, &doc).expect_err("invalid");

        assert!(tree.is_empty(), "nothing was built");
        assert_eq!(
            errors.errors(),
            &[
                ValidationError::UnknownElement {
                    tag: "Blink".to_owned(),
                    path: "/StackPanel[0]/Blink[0]".to_owned(),
                },
                ValidationError::DuplicateId {
                    id: "x".to_owned(),
                    path: "/StackPanel[0]/TextBlock[2]".to_owned(),
                },
                ValidationError::TooManyChildren {
                    tag: "Border".to_owned(),
                    count: 2,
                    path: "/StackPanel[0]/Border[3]".to_owned(),
                },
                ValidationError::UnexpectedChildren {
                    tag: "Rectangle".to_owned(),
                    path: "/StackPanel[0]/Rectangle[4]".to_owned(),
                },
            ]
        );
        assert_eq!(errors.to_string(), "document rejected with 4 error(s)");
    }

    #[test]
    fn required_attributes_are_enforced() {
        let mut registry = ControlRegistry::with_builtins();
        registry.require("image", "Source");
        assert!(!registry.contains("Image"), "require does not register");
        registry.require("TextBlock", "Text");

        let mut tree = ControlTree::new();
        let errors = registry
            .materialize(&mut tree, &ElementNode::new("textblock"))
            .expect_err("missing text");
        assert_eq!(
            errors.into_iter().collect::<Vec<_>>(),
            vec![ValidationError::MissingAttribute {
                tag: "textblock".to_owned(),
                attribute: "Text".to_owned(),
                path: "/textblock[0]".to_owned(),
            }]
        );
        assert!(registry.materialize(&mut tree, &text("ok")).is_ok());
    }

    #[test]
    fn unknown_attributes_are_skipped() {
        let doc = ElementNode::new("Rectangle")
            .with_attribute("Sparkle", "yes")
            .with_attribute("Height", "12");
        let mut tree = ControlTree::new();
        let id = ControlRegistry::with_builtins()
            .materialize(&mut tree, &doc)
            .expect("unknown attributes do not reject");
        assert_eq!(tree.props(id).height, Some(12.0));
    }

    #[test]
    fn custom_widgets_register() {
        #[derive(Debug, Default)]
        struct Spacer;
        impl Widget for Spacer {
            fn type_name(&self) -> &'static str {
                "Spacer"
            }
            fn content_model(&self) -> ContentModel {
                ContentModel::Leaf
            }
        }

        let mut registry = ControlRegistry::new();
        registry.register("Spacer", Spacer::default);
        let mut tree = ControlTree::new();
        let id = registry
            .materialize(&mut tree, &ElementNode::new("Spacer"))
            .expect("registered");
        assert_eq!(tree.type_name(id), "Spacer");
    }
}
