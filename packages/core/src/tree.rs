//! In-memory configuration subtrees.
//!
//! A [`Tree`] is what recursive reads hand back: an owned snapshot of every
//! value at and below some path. Each [`Node`] is either a leaf holding a
//! scalar string or a branch holding named children, never both, so a path
//! that would need a node to be both is rejected with
//! [`Error::PathConflict`].
//!
//! A tree and a [`KeyValueMap`] are interchangeable for a fixed separator:
//! [`Tree::flatten`] and [`Tree::from_map`] convert between them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::{join_path, split_path, DEFAULT_SEPARATOR};
use crate::Error;

/// Flattened form of a [`Tree`]: fully-qualified path to scalar value.
pub type KeyValueMap = BTreeMap<String, String>;

/// One point in a configuration subtree.
///
/// Serializes as a JSON-like document: leaves become strings and branches
/// become objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// A scalar value.
    Leaf(String),
    /// Named children, ordered by name.
    Branch(BTreeMap<String, Node>),
}

impl Default for Node {
    fn default() -> Self {
        Node::branch()
    }
}

impl Node {
    /// An empty branch.
    pub fn branch() -> Self {
        Node::Branch(BTreeMap::new())
    }

    pub fn leaf(value: impl Into<String>) -> Self {
        Node::Leaf(value.into())
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Node::Branch(_))
    }

    /// The scalar value, or `None` for a branch.
    pub fn value(&self) -> Option<&str> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Branch(_) => None,
        }
    }

    /// The child map, or `None` for a leaf.
    pub fn as_branch(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Node::Branch(children) => Some(children),
            Node::Leaf(_) => None,
        }
    }

    /// Look up a direct child. Leaves have no children.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.as_branch()?.get(name)
    }

    /// Iterate over direct children in name order. Empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.as_branch()
            .into_iter()
            .flat_map(|children| children.iter())
            .map(|(name, node)| (name.as_str(), node))
    }

    /// Number of leaves at or below this node.
    pub fn leaf_count(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Branch(children) => children.values().map(Node::leaf_count).sum(),
        }
    }

    /// Navigate to a descendant.
    pub fn get_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Node> {
        let mut current = self;
        for segment in segments {
            current = current.child(segment.as_ref())?;
        }
        Some(current)
    }

    /// Set a leaf below this node, creating intermediate branches.
    ///
    /// Overwrites an existing leaf. Nothing is modified when an error is returned.
    pub fn insert_segments<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        value: impl Into<String>,
        separator: char,
    ) -> Result<(), Error> {
        let Some((last, parents)) = segments.split_last() else {
            return Err(Error::InvalidPath {
                message: "cannot insert a value at an empty path".to_string(),
            });
        };

        // Once a segment is missing every later node is a fresh branch, so a
        // conflict can only be found before anything has been created.
        let mut current = self;
        for (depth, segment) in parents.iter().enumerate() {
            current = match current {
                Node::Branch(children) => children
                    .entry(segment.as_ref().to_owned())
                    .or_insert_with(Node::branch),
                Node::Leaf(_) => return Err(leaf_in_the_way(&segments[..depth], separator)),
            };
        }

        match current {
            Node::Branch(children) => match children.get_mut(last.as_ref()) {
                Some(Node::Leaf(existing)) => {
                    *existing = value.into();
                    Ok(())
                }
                Some(Node::Branch(_)) => Err(Error::PathConflict {
                    path: join_path(segments, separator),
                    message: "a branch exists where a value would be set".to_string(),
                }),
                None => {
                    children.insert(last.as_ref().to_owned(), Node::Leaf(value.into()));
                    Ok(())
                }
            },
            Node::Leaf(_) => Err(leaf_in_the_way(parents, separator)),
        }
    }

    fn walk_from<'a, V: Visitor + ?Sized>(&'a self, path: &mut Vec<&'a str>, visitor: &mut V) {
        match self {
            Node::Leaf(value) => visitor.visit_leaf(path, value),
            Node::Branch(children) => {
                visitor.visit_branch(path, children);
                for (name, child) in children {
                    path.push(name);
                    child.walk_from(path, visitor);
                    path.pop();
                }
            }
        }
    }
}

fn leaf_in_the_way<S: AsRef<str>>(segments: &[S], separator: char) -> Error {
    Error::PathConflict {
        path: join_path(segments, separator),
        message: "a value exists where a branch is needed".to_string(),
    }
}

/// Two-case callback for depth-first traversal.
///
/// `path` holds the names from the root down to the visited node; the root
/// itself is visited as a branch with an empty path.
pub trait Visitor {
    fn visit_branch(&mut self, path: &[&str], children: &BTreeMap<String, Node>);

    fn visit_leaf(&mut self, path: &[&str], value: &str);
}

/// An owned configuration subtree plus the separator its paths use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tree {
    root: Node,
    #[serde(skip)]
    separator: char,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// An empty tree using `/`.
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        Self {
            root: Node::branch(),
            separator,
        }
    }

    /// Wrap an existing root. A leaf root is rejected since it has no path.
    pub fn from_root(root: Node, separator: char) -> Result<Self, Error> {
        if root.is_leaf() {
            return Err(Error::InvalidPath {
                message: "the root of a tree must be a branch".to_string(),
            });
        }
        Ok(Self { root, separator })
    }

    /// Build a tree from its flattened form.
    pub fn from_map(map: &KeyValueMap, separator: char) -> Result<Self, Error> {
        let mut tree = Self::with_separator(separator);
        for (path, value) in map {
            tree.insert(path, value.as_str())?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// True when the tree holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of values (leaves) in the tree.
    pub fn len(&self) -> usize {
        self.root.leaf_count()
    }

    /// Set the value at `path`, split on the tree separator.
    pub fn insert(&mut self, path: &str, value: impl Into<String>) -> Result<(), Error> {
        let segments = split_path(path, self.separator);
        self.insert_segments(&segments, value)
    }

    pub fn insert_segments<S: AsRef<str>>(
        &mut self,
        segments: &[S],
        value: impl Into<String>,
    ) -> Result<(), Error> {
        self.root.insert_segments(segments, value, self.separator)
    }

    /// The node at `path`. An empty path yields the root.
    pub fn get(&self, path: &str) -> Option<&Node> {
        self.root.get_segments(&split_path(path, self.separator))
    }

    pub fn get_segments<S: AsRef<str>>(&self, segments: &[S]) -> Option<&Node> {
        self.root.get_segments(segments)
    }

    /// Copy of the part of this tree at and below `path`.
    ///
    /// The result keeps the same root, so its paths still start with `path`.
    /// An absent path yields an empty tree.
    pub fn subtree(&self, path: &str) -> Tree {
        self.subtree_segments(&split_path(path, self.separator))
    }

    pub fn subtree_segments<S: AsRef<str>>(&self, segments: &[S]) -> Tree {
        let Some(node) = self.root.get_segments(segments) else {
            return Tree::with_separator(self.separator);
        };
        let mut root = node.clone();
        for segment in segments.iter().rev() {
            let mut children = BTreeMap::new();
            children.insert(segment.as_ref().to_owned(), root);
            root = Node::Branch(children);
        }
        Tree {
            root,
            separator: self.separator,
        }
    }

    /// The part of this tree below `prefix`, re-rooted there and using `separator`.
    ///
    /// Backends store full paths and use this to hand back trees relative to
    /// their prefix. A missing prefix, or one ending on a leaf, yields an
    /// empty tree.
    pub fn rebase<S: AsRef<str>>(&self, prefix: &[S], separator: char) -> Tree {
        match self.root.get_segments(prefix) {
            Some(node @ Node::Branch(_)) => Tree {
                root: node.clone(),
                separator,
            },
            _ => Tree::with_separator(separator),
        }
    }

    /// Walk the tree depth-first, parents before children, children by name.
    pub fn walk<V: Visitor + ?Sized>(&self, visitor: &mut V) {
        let mut path = Vec::new();
        self.root.walk_from(&mut path, visitor);
    }

    /// Flatten into fully-qualified paths joined with the tree separator.
    pub fn flatten(&self) -> KeyValueMap {
        let mut flattener = Flattener {
            separator: self.separator,
            map: KeyValueMap::new(),
        };
        self.walk(&mut flattener);
        flattener.map
    }
}

struct Flattener {
    separator: char,
    map: KeyValueMap,
}

impl Visitor for Flattener {
    fn visit_branch(&mut self, _path: &[&str], _children: &BTreeMap<String, Node>) {}

    fn visit_leaf(&mut self, path: &[&str], value: &str) {
        self.map
            .insert(join_path(path, self.separator), value.to_owned());
    }
}

struct Dumper {
    out: String,
}

impl Visitor for Dumper {
    fn visit_branch(&mut self, path: &[&str], _children: &BTreeMap<String, Node>) {
        if let Some((name, parents)) = path.split_last() {
            self.out.push_str(&"  ".repeat(parents.len()));
            self.out.push_str(name);
            self.out.push('\n');
        }
    }

    fn visit_leaf(&mut self, path: &[&str], value: &str) {
        if let Some((name, parents)) = path.split_last() {
            self.out.push_str(&"  ".repeat(parents.len()));
            self.out.push_str(&format!("{} = {}\n", name, value));
        }
    }
}

/// Indented dump, one node per line.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dumper = Dumper { out: String::new() };
        self.walk(&mut dumper);
        f.write_str(&dumper.out)
    }
}
