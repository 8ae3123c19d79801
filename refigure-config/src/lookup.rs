//! Entry lookup within a single document
//!
//! Two modes are supported. A scoped lookup walks the element chain named by a
//! [`ScopePath`] and returns the first matching entry below it. An unscoped
//! lookup visits every element in document order and collects all values
//! carried under the key.
//!
//! Matches are located as child-index paths from the root, which lets the
//! writer reuse the exact same search for in-place updates.

use crate::options::EntryFormat;
use crate::scope::ScopePath;
use xmltree::{Element, XMLNode};

/// A scoped key query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    pub scope: ScopePath,
    pub key: String,
    pub format: EntryFormat,
}

impl EntryQuery {
    pub fn new(scope: ScopePath, key: impl Into<String>) -> Self {
        Self {
            scope,
            key: key.into(),
            format: EntryFormat::default(),
        }
    }

    pub fn with_format(mut self, format: EntryFormat) -> Self {
        self.format = format;
        self
    }

    fn matches(&self, element: &Element) -> bool {
        element.name == self.format.tag
            && element.attributes.get(&self.format.key_attribute).map(String::as_str)
                == Some(self.key.as_str())
    }
}

/// Result of an unscoped lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnywhereMatch {
    /// Value of the first keyed element in document order
    pub value: Option<String>,

    /// Number of elements carrying the key
    pub multiplicity: usize,
}

impl AnywhereMatch {
    /// First value, if it is non-empty
    pub fn non_empty(&self) -> Option<&str> {
        self.value.as_deref().filter(|value| !value.is_empty())
    }
}

/// Child-index path from the root to an element
pub(crate) type NodePath = Vec<usize>;

/// Value of the first entry under the query's scope
pub fn find_scoped<'a>(root: &'a Element, query: &EntryQuery) -> Option<&'a str> {
    let path = locate_scoped(root, query)?;
    element_at(root, &path)?
        .attributes
        .get(&query.format.value_attribute)
        .map(String::as_str)
}

/// Every value keyed `key` anywhere in the document, first in document order
pub fn find_anywhere(root: &Element, key: &str, format: &EntryFormat) -> AnywhereMatch {
    let mut values = Vec::new();
    visit_elements(root, &mut |element| {
        if element.attributes.get(&format.key_attribute).map(String::as_str) == Some(key) {
            values.push(
                element
                    .attributes
                    .get(&format.value_attribute)
                    .cloned()
                    .unwrap_or_default(),
            );
        }
    });

    AnywhereMatch {
        multiplicity: values.len(),
        value: values.into_iter().next(),
    }
}

/// Position of the first entry matching `query` under its scope
pub(crate) fn locate_scoped(root: &Element, query: &EntryQuery) -> Option<NodePath> {
    for scope_path in scope_elements(root, &query.scope) {
        let scope_element = element_at(root, &scope_path)?;
        for (index, node) in scope_element.children.iter().enumerate() {
            if let XMLNode::Element(child) = node {
                if query.matches(child) {
                    let mut path = scope_path.clone();
                    path.push(index);
                    return Some(path);
                }
            }
        }
    }
    None
}

/// Position of the first element keyed `key` anywhere in the document
pub(crate) fn locate_anywhere(root: &Element, key: &str, format: &EntryFormat) -> Option<NodePath> {
    fn walk(element: &Element, key: &str, format: &EntryFormat, path: &mut NodePath) -> bool {
        if element.attributes.get(&format.key_attribute).map(String::as_str) == Some(key) {
            return true;
        }
        for (index, node) in element.children.iter().enumerate() {
            if let XMLNode::Element(child) = node {
                path.push(index);
                if walk(child, key, format, path) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    let mut path = Vec::new();
    walk(root, key, format, &mut path).then_some(path)
}

/// Positions of every element matching the scope chain, in document order
fn scope_elements(root: &Element, scope: &ScopePath) -> Vec<NodePath> {
    if root.name != scope.root() {
        return Vec::new();
    }

    let mut frontier: Vec<(NodePath, &Element)> = vec![(Vec::new(), root)];
    for segment in &scope.segments()[1..] {
        let mut next = Vec::new();
        for (path, element) in frontier.iter().map(|(path, element)| (path, *element)) {
            for (index, node) in element.children.iter().enumerate() {
                if let XMLNode::Element(child) = node {
                    if child.name == *segment {
                        let mut child_path = path.clone();
                        child_path.push(index);
                        next.push((child_path, child));
                    }
                }
            }
        }
        frontier = next;
    }

    frontier.into_iter().map(|(path, _)| path).collect()
}

pub(crate) fn element_at<'a>(root: &'a Element, path: &[usize]) -> Option<&'a Element> {
    let mut current = root;
    for &index in path {
        current = match current.children.get(index)? {
            XMLNode::Element(child) => child,
            _ => return None,
        };
    }
    Some(current)
}

pub(crate) fn element_at_mut<'a>(root: &'a mut Element, path: &[usize]) -> Option<&'a mut Element> {
    let mut current = root;
    for &index in path {
        current = match current.children.get_mut(index)? {
            XMLNode::Element(child) => child,
            _ => return None,
        };
    }
    Some(current)
}

/// Depth-first, document-order visit of every element
pub(crate) fn visit_elements<F>(element: &Element, visitor: &mut F)
where
    F: FnMut(&Element),
{
    visitor(element);
    for node in &element.children {
        if let XMLNode::Element(child) = node {
            visit_elements(child, visitor);
        }
    }
}
