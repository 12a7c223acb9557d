//! Headless page model.
//!
//! A small arena of elements standing in for the browser document. It only
//! covers what the page controller touches: ids, classes, attributes,
//! content (plain text or markup), visibility, form state and the element tree.
//! Pages are usually loaded from a JSON fixture (see [`NodeSpec`]).

use crate::markup;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Handle to an element in a [`Page`]. Stays valid until the element is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementId(pub(crate) usize);

/// Element content, tracking how it was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Content {
    Text(String),
    Markup(String),
}

impl Content {
    /// What a reader sees.
    pub fn rendered(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Markup(html) => markup::render(html),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

/// Inline `display` style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Display {
    #[default]
    Unset,
    Block,
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    content: Content,
    pub display: Display,
    pub disabled: bool,
    /// Current value of form controls
    pub value: String,
    #[serde(skip)]
    parent: Option<ElementId>,
    #[serde(skip)]
    children: Vec<ElementId>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn with_class(mut self, class: &str) -> Self {
        for name in class.split_whitespace() {
            self.add_class(name);
        }
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.content = Content::Text(text.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a class, or force it on/off. Returns whether the class is now present.
    pub fn toggle_class(&mut self, class: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or(!self.has_class(class));
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
        on
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attributes.insert(name.to_string(), value.to_string());
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Rendered text of this element's own content (children excluded).
    pub fn text(&self) -> String {
        self.content.rendered()
    }

    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Serialized element tree used for page fixtures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeSpec {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    /// Space-separated class list
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageSpec {
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub body: Vec<NodeSpec>,
}

/// The document: an element arena plus document-level state.
#[derive(Debug, Clone, Default)]
pub struct Page {
    lang: String,
    nodes: Vec<Option<Element>>,
    roots: Vec<ElementId>,
    scrolled_to: Option<ElementId>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_spec(spec: PageSpec) -> Self {
        let mut page = Page::new();
        page.lang = spec.lang;
        for node in spec.body {
            page.append_spec(None, node);
        }
        page
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: PageSpec = serde_json::from_str(json).context("Failed to parse page JSON")?;
        Ok(Self::from_spec(spec))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read page from {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("Invalid page file {}", path.display()))
    }

    fn append_spec(&mut self, parent: Option<ElementId>, spec: NodeSpec) -> ElementId {
        let mut element = Element::new(&spec.tag).with_class(&spec.class);
        element.id = spec.id;
        element.attributes = spec.attrs;
        element.value = spec.value.unwrap_or_default();
        element.content = match (spec.html, spec.text) {
            (Some(html), _) => Content::Markup(html),
            (None, Some(text)) => Content::Text(text),
            (None, None) => Content::default(),
        };

        let id = self.append(parent, element);
        for child in spec.children {
            self.append_spec(Some(id), child);
        }
        id
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn set_lang(&mut self, lang: &str) {
        self.lang = lang.to_string();
    }

    /// Append an element as the last child of `parent` (or of the body).
    pub fn append(&mut self, parent: Option<ElementId>, mut element: Element) -> ElementId {
        let id = ElementId(self.nodes.len());
        let parent = parent.filter(|p| self.get(*p).is_some());
        element.parent = parent;
        element.children.clear();
        self.nodes.push(Some(element));

        match parent {
            Some(p) => {
                if let Some(Some(node)) = self.nodes.get_mut(p.0) {
                    node.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Remove an element and its subtree. Returns false if it was already gone.
    pub fn remove(&mut self, id: ElementId) -> bool {
        let Some(element) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return false;
        };

        match element.parent {
            Some(p) => {
                if let Some(Some(parent)) = self.nodes.get_mut(p.0) {
                    parent.children.retain(|c| *c != id);
                }
            }
            None => self.roots.retain(|r| *r != id),
        }
        if self.scrolled_to == Some(id) {
            self.scrolled_to = None;
        }
        for child in element.children {
            self.remove(child);
        }
        true
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Replace an element's content with plain text, dropping its children.
    pub fn set_text(&mut self, id: ElementId, text: &str) {
        self.set_content(id, Content::Text(text.to_string()));
    }

    /// Replace an element's content with markup, dropping its children.
    pub fn set_html(&mut self, id: ElementId, html: &str) {
        self.set_content(id, Content::Markup(html.to_string()));
    }

    fn set_content(&mut self, id: ElementId, content: Content) {
        let children = match self.get_mut(id) {
            Some(element) => {
                element.content = content;
                std::mem::take(&mut element.children)
            }
            None => return,
        };
        for child in children {
            if let Some(node) = self.get_mut(child) {
                node.parent = None;
            }
            self.remove(child);
        }
    }

    /// All live elements in document (pre-)order.
    pub fn ids(&self) -> Vec<ElementId> {
        let mut out = Vec::new();
        for root in &self.roots {
            self.walk(*root, &mut out);
        }
        out
    }

    fn walk(&self, id: ElementId, out: &mut Vec<ElementId>) {
        if let Some(element) = self.get(id) {
            out.push(id);
            for child in &element.children {
                self.walk(*child, out);
            }
        }
    }

    /// Descendants of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        if let Some(element) = self.get(root) {
            for child in &element.children {
                self.walk(*child, &mut out);
            }
        }
        out
    }

    /// Elements matching a predicate, in document order.
    pub fn select(&self, predicate: impl Fn(&Element) -> bool) -> Vec<ElementId> {
        self.ids()
            .into_iter()
            .filter(|id| self.get(*id).is_some_and(&predicate))
            .collect()
    }

    pub fn by_id(&self, id: &str) -> Option<ElementId> {
        self.select(|e| e.id.as_deref() == Some(id)).into_iter().next()
    }

    pub fn by_class(&self, class: &str) -> Vec<ElementId> {
        self.select(|e| e.has_class(class))
    }

    pub fn by_tag(&self, tag: &str) -> Vec<ElementId> {
        self.select(|e| e.tag == tag)
    }

    pub fn with_attr(&self, name: &str) -> Vec<ElementId> {
        self.select(|e| e.attr(name).is_some())
    }

    /// First descendant of `root` matching the predicate.
    pub fn find_within(
        &self,
        root: ElementId,
        predicate: impl Fn(&Element) -> bool,
    ) -> Option<ElementId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.get(*id).is_some_and(&predicate))
    }

    pub fn scroll_into_view(&mut self, id: ElementId) {
        if self.get(id).is_some() {
            self.scrolled_to = Some(id);
        }
    }

    pub fn scrolled_to(&self) -> Option<ElementId> {
        self.scrolled_to
    }

    /// Rendered text of an element, or `None` if it does not exist.
    pub fn text_of(&self, id: ElementId) -> Option<String> {
        self.get(id).map(Element::text)
    }
}
