//! Depth-first traversal of a node tree
//!
//! [`NodeIter`] visits nodes in pre-order: a node, then its qualifiers, then
//! its fields or items. Children are only looked at when the traversal moves
//! past their parent, so [`NodeIter::skip_subtree`] and
//! [`NodeIter::skip_siblings`] called between two `next()` calls prune the
//! walk without visiting the skipped nodes.

use crate::core::node::Node;
use crate::core::xpath::{PathSegment, XmpPath};
use std::iter::FusedIterator;

/// How a visited node is attached to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitKind {
    /// A top-level property
    Property,
    /// A named field of a structure
    Field,
    /// An array item
    Item,
    /// A qualifier
    Qualifier,
}

/// Iteration options
#[derive(Default, Clone, Copy, Debug)]
pub struct IterOptions {
    /// Do not visit qualifiers
    pub omit_qualifiers: bool,
    /// Only yield simple (leaf) nodes; containers are still walked
    pub just_leaf_nodes: bool,
}

impl IterOptions {
    /// Do not visit qualifiers.
    pub fn omit_qualifiers(mut self) -> Self {
        self.omit_qualifiers = true;
        self
    }

    /// Only yield leaf nodes.
    pub fn just_leaf_nodes(mut self) -> Self {
        self.just_leaf_nodes = true;
        self
    }
}

/// A visited node
#[derive(Debug, Clone)]
pub struct IterItem<'a> {
    /// Path from the metadata root to the node
    pub path: XmpPath,
    /// The node itself
    pub node: &'a Node,
    /// How the node is attached to its owner
    pub kind: VisitKind,
}

#[derive(Debug)]
struct Entry<'a> {
    path: XmpPath,
    node: &'a Node,
    kind: VisitKind,
    depth: usize,
}

/// Pre-order iterator over a node tree
#[derive(Debug)]
pub struct NodeIter<'a> {
    stack: Vec<Entry<'a>>,
    expand: Option<Entry<'a>>,
    options: IterOptions,
    skip_subtree: bool,
    skip_siblings: bool,
    done: bool,
}

impl<'a> NodeIter<'a> {
    /// Iterate over everything below `root`, excluding `root` itself
    pub fn new(root: &'a Node, options: IterOptions) -> Self {
        Self {
            stack: Vec::new(),
            expand: Some(Entry {
                path: XmpPath::default(),
                node: root,
                kind: VisitKind::Property,
                depth: 0,
            }),
            options,
            skip_subtree: false,
            skip_siblings: false,
            done: false,
        }
    }

    /// Iterate over `node` and everything below it
    ///
    /// `path` is the node's path from the metadata root and prefixes every
    /// yielded path.
    pub fn subtree(node: &'a Node, path: XmpPath, options: IterOptions) -> Self {
        let kind = match path.last() {
            Some(PathSegment::Qualifier(_)) => VisitKind::Qualifier,
            Some(PathSegment::Property(_)) if path.len() == 1 => VisitKind::Property,
            Some(PathSegment::Property(_)) | None => VisitKind::Field,
            Some(_) => VisitKind::Item,
        };
        let depth = path.len();
        Self {
            stack: vec![Entry {
                path,
                node,
                kind,
                depth,
            }],
            expand: None,
            options,
            skip_subtree: false,
            skip_siblings: false,
            done: false,
        }
    }

    /// Do not visit the children or qualifiers of the last yielded node
    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }

    /// Do not visit the remaining siblings of the last yielded node
    ///
    /// The node's own subtree is skipped as well.
    pub fn skip_siblings(&mut self) {
        self.skip_siblings = true;
    }

    /// End the iteration
    pub fn stop(&mut self) {
        self.done = true;
        self.stack.clear();
        self.expand = None;
    }

    fn push_children(&mut self, entry: &Entry<'a>) {
        let depth = entry.depth + 1;
        match entry.node {
            Node::Structure(structure) => {
                let kind = if entry.depth == 0 {
                    VisitKind::Property
                } else {
                    VisitKind::Field
                };
                for (name, child) in structure.fields.iter().rev() {
                    self.stack.push(Entry {
                        path: entry.path.child(PathSegment::Property(name.clone())),
                        node: child,
                        kind,
                        depth,
                    });
                }
            }
            Node::Array(array) => {
                for (i, item) in array.items.iter().enumerate().rev() {
                    self.stack.push(Entry {
                        path: entry.path.child(PathSegment::Index(i + 1)),
                        node: item,
                        kind: VisitKind::Item,
                        depth,
                    });
                }
            }
            Node::Simple(_) => {}
        }

        if !self.options.omit_qualifiers {
            for (name, qualifier) in entry.node.qualifiers().iter().rev() {
                self.stack.push(Entry {
                    path: entry.path.child(PathSegment::Qualifier(name.clone())),
                    node: qualifier,
                    kind: VisitKind::Qualifier,
                    depth,
                });
            }
        }
    }

    fn advance(&mut self) {
        let skip_subtree = std::mem::take(&mut self.skip_subtree);
        let skip_siblings = std::mem::take(&mut self.skip_siblings);
        let Some(last) = self.expand.take() else {
            return;
        };
        if skip_siblings {
            // Qualifiers and children of one owner share a depth.
            let qualifier = last.kind == VisitKind::Qualifier;
            while self
                .stack
                .last()
                .is_some_and(|e| e.depth == last.depth && (e.kind == VisitKind::Qualifier) == qualifier)
            {
                self.stack.pop();
            }
        } else if !skip_subtree {
            self.push_children(&last);
        }
    }
}

impl<'a> Iterator for NodeIter<'a> {
    type Item = IterItem<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.advance();
        loop {
            let Some(entry) = self.stack.pop() else {
                self.done = true;
                return None;
            };
            let item = IterItem {
                path: entry.path.clone(),
                node: entry.node,
                kind: entry.kind,
            };
            let yielded = !self.options.just_leaf_nodes || entry.node.is_simple();
            if yielded {
                self.expand = Some(entry);
                return Some(item);
            }
            self.push_children(&entry);
        }
    }
}

impl FusedIterator for NodeIter<'_> {}
