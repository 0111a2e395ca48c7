//! # Typed Views over the CST
//!
//! Thin wrappers that give names to the shapes the grammar produces, in the
//! style of rust-analyzer's `ast` layer. They hold a [`SyntaxNode`] and read
//! from it on demand; nothing is copied up front.
//!
//! Values are returned exactly as written in the source. Character
//! references such as `&amp;` are left for the consumer to decode.

use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// The root of a parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Root(SyntaxNode);

impl Root {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::ROOT).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    /// Top-level content in source order.
    pub fn children(&self) -> impl Iterator<Item = Child> + use<> {
        content_children(&self.0)
    }
}

/// An `ELEMENT` node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Element(SyntaxNode);

impl Element {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::ELEMENT).then_some(Self(node))
    }

    pub fn syntax(&self) -> &SyntaxNode {
        &self.0
    }

    fn start_tag(&self) -> Option<SyntaxNode> {
        self.0
            .children()
            .find(|n| n.kind() == SyntaxKind::START_TAG)
    }

    /// Tag name, ASCII lowercased.
    pub fn tag_name(&self) -> String {
        self.start_tag()
            .and_then(|tag| {
                tag.children_with_tokens()
                    .filter_map(|el| el.into_token())
                    .find(|t| t.kind() == SyntaxKind::NAME)
            })
            .map(|t| t.text().to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// Attributes in source order.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + use<> {
        self.start_tag()
            .into_iter()
            .flat_map(|tag| tag.children())
            .filter_map(Attribute::cast)
    }

    /// Raw value of the first attribute called `name` (case-insensitive).
    ///
    /// A bare attribute such as `<td nowrap>` yields an empty string.
    pub fn attr(&self, name: &str) -> Option<String> {
        self.attributes()
            .find(|a| a.name().eq_ignore_ascii_case(name))
            .map(|a| a.value().unwrap_or_default())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes().any(|a| a.name().eq_ignore_ascii_case(name))
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().iter().any(|c| c == class)
    }

    /// Content between the start and end tag in source order.
    pub fn children(&self) -> impl Iterator<Item = Child> + use<> {
        content_children(&self.0)
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = Element> + use<> {
        self.0.children().filter_map(Element::cast)
    }

    /// All elements nested below this one, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = Element> + use<> {
        self.0.descendants().skip(1).filter_map(Element::cast)
    }

    /// Concatenated raw character data of this element and its descendants.
    pub fn text_content(&self) -> String {
        self.0
            .descendants_with_tokens()
            .filter_map(|el| el.into_token())
            .filter(|t| {
                t.kind() == SyntaxKind::TEXT
                    && t.parent().is_some_and(|p| p.kind() == SyntaxKind::ELEMENT)
            })
            .map(|t| t.text().to_string())
            .collect()
    }
}

/// An `ATTRIBUTE` node inside a start tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute(SyntaxNode);

impl Attribute {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        (node.kind() == SyntaxKind::ATTRIBUTE).then_some(Self(node))
    }

    /// Attribute name as written.
    pub fn name(&self) -> String {
        self.0
            .children_with_tokens()
            .filter_map(|el| el.into_token())
            .find(|t| t.kind() == SyntaxKind::NAME)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }

    /// Raw value with surrounding quotes removed, `None` for bare attributes.
    pub fn value(&self) -> Option<String> {
        let value = self
            .0
            .children()
            .find(|n| n.kind() == SyntaxKind::ATTR_VALUE)?
            .text()
            .to_string();
        Some(unquote(&value).to_string())
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// One piece of element or root content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Element(Element),
    /// Raw character data
    Text(String),
    /// Comment including its delimiters
    Comment(String),
}

fn content_children(node: &SyntaxNode) -> impl Iterator<Item = Child> + use<> {
    node.children_with_tokens().filter_map(|el| match el {
        rowan::NodeOrToken::Node(n) => Element::cast(n).map(Child::Element),
        rowan::NodeOrToken::Token(t) => match t.kind() {
            SyntaxKind::TEXT => Some(Child::Text(t.text().to_string())),
            SyntaxKind::COMMENT => Some(Child::Comment(t.text().to_string())),
            _ => None,
        },
    })
}
