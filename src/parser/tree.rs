//! Labeled tree capability shared by the binary record tree and the XML
//! element tree.
//!
//! Both decoders produce ordered nodes carrying a label, key/value
//! attributes and optional character data. The model builder is written
//! against [`TreeNode`] and [`SourceTree`] only, never against a concrete
//! decoder.

/// Identity of a node as produced by its decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label<'a> {
    /// Binary record tag id.
    Tag(u16),
    /// XML element with its resolved namespace URI.
    Element {
        namespace: Option<&'a str>,
        local: &'a str,
    },
    /// Character data.
    Text,
}

/// A node of a decoded source tree.
pub trait TreeNode: Sized {
    /// Node identity.
    fn label(&self) -> Label<'_>;

    /// Attribute value by key.
    fn attr(&self, key: &str) -> Option<&str>;

    /// Character data carried by this node.
    fn text(&self) -> Option<&str>;

    /// Ordered children.
    fn children(&self) -> &[Self];

    /// Local element name, `None` for records and text.
    fn local_name(&self) -> Option<&str> {
        match self.label() {
            Label::Element { local, .. } => Some(local),
            _ => None,
        }
    }

    /// First child element with the given local name.
    fn child(&self, local: &str) -> Option<&Self> {
        self.children()
            .iter()
            .find(|c| c.local_name() == Some(local))
    }

    /// Attribute parsed as an unsigned integer.
    fn attr_u32(&self, key: &str) -> Option<u32> {
        self.attr(key)?.trim().parse().ok()
    }

    /// Attribute parsed as a signed integer.
    fn attr_i64(&self, key: &str) -> Option<i64> {
        self.attr(key)?.trim().parse().ok()
    }

    /// Depth-first search for the first descendant matching `predicate`.
    fn find_descendant<P>(&self, predicate: &P) -> Option<&Self>
    where
        P: Fn(&Self) -> bool,
    {
        for child in self.children() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated character data of this node and its descendants.
    fn collect_text(&self, out: &mut String) {
        if let Some(text) = self.text() {
            out.push_str(text);
        }
        for child in self.children() {
            child.collect_text(out);
        }
    }
}

/// A decoded part: an ordered forest of [`TreeNode`]s.
pub trait SourceTree {
    type Node: TreeNode;

    /// Name of the part the tree was decoded from.
    fn part(&self) -> &str;

    /// Top-level nodes in source order.
    fn roots(&self) -> &[Self::Node];
}

/// Attribute list in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Create an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    /// Look up an attribute by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
