//! Segment-keyed prefix trie for mounted applications.
//!
//! Nodes live in a single arena (`Vec<Node>`) and refer to each other by
//! index. Node 0 is the root, which stands for the `/` prefix.
//!
//! ## Lookup
//!
//! A lookup walks the request path one segment at a time, trying the literal
//! child first and the dynamic child second. When neither leads to an
//! application, it backtracks and returns the deepest node on the walked path
//! that owns one. This is longest-registered-prefix matching: `/admin/users`
//! lands on `/admin` when only `/admin` and `/admin/sub` are registered.

use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::RouterError;

const ROOT: usize = 0;

#[derive(Debug)]
struct Node<A> {
    app: Option<A>,
    literals: HashMap<String, usize>,
    /// First dynamic segment registered at this node, and its child
    dynamic: Option<(String, usize)>,
}

impl<A> Node<A> {
    fn new() -> Self {
        Self {
            app: None,
            literals: HashMap::new(),
            dynamic: None,
        }
    }
}

/// Result of a successful prefix lookup
#[derive(Debug)]
pub struct TrieMatch<'t, 'p, A> {
    /// Application owned by the deepest matching node
    pub app: &'t A,
    /// Part of the request path covered by the registered prefix (no trailing `/`)
    pub prefix: &'p str,
    /// Remainder of the path, always starting with `/`
    pub rest: &'p str,
}

/// Arena-backed trie mapping path prefixes to applications.
///
/// Built during single-threaded assembly, then [`freeze`](Self::freeze)d; after
/// that it is read-only and safe to share between request threads.
#[derive(Debug)]
pub struct DispatchTrie<A> {
    nodes: Vec<Node<A>>,
    default: A,
    frozen: bool,
}

impl<A> DispatchTrie<A> {
    /// Create an empty trie; `default` answers paths no prefix claims
    pub fn new(default: A) -> Self {
        Self {
            nodes: vec![Node::new()],
            default,
            frozen: false,
        }
    }

    /// Register `app` under `prefix`.
    ///
    /// Segments starting with `:` or `*` are dynamic and match any single
    /// request segment. A node keeps the first dynamic segment registered
    /// under it; a later, differently named one reuses that child.
    ///
    /// # Errors
    ///
    /// [`RouterError::TrieFrozen`] once [`freeze`](Self::freeze) has been called.
    pub fn insert(&mut self, prefix: &str, app: A) -> Result<(), RouterError> {
        if self.frozen {
            return Err(RouterError::TrieFrozen {
                prefix: prefix.to_string(),
            });
        }

        let mut idx = ROOT;
        for segment in segments(prefix) {
            idx = if is_dynamic(segment) {
                self.dynamic_child(idx, segment, prefix)
            } else {
                self.literal_child(idx, segment)
            };
        }

        if self.nodes[idx].app.replace(app).is_some() {
            warn!(prefix = %prefix, "Replaced application already mounted at prefix");
        } else {
            debug!(prefix = %prefix, node = idx, "Application mounted");
        }
        Ok(())
    }

    fn literal_child(&mut self, idx: usize, segment: &str) -> usize {
        if let Some(&child) = self.nodes[idx].literals.get(segment) {
            return child;
        }
        let child = self.push_node();
        self.nodes[idx].literals.insert(segment.to_string(), child);
        child
    }

    fn dynamic_child(&mut self, idx: usize, segment: &str, prefix: &str) -> usize {
        if let Some((existing, child)) = &self.nodes[idx].dynamic {
            if existing != segment {
                warn!(
                    prefix = %prefix,
                    registered = %existing,
                    ignored = %segment,
                    "Second dynamic segment at the same position; first registration wins"
                );
            }
            return *child;
        }
        let child = self.push_node();
        self.nodes[idx].dynamic = Some((segment.to_string(), child));
        child
    }

    fn push_node(&mut self) -> usize {
        self.nodes.push(Node::new());
        self.nodes.len() - 1
    }

    /// Stop accepting inserts
    pub fn freeze(&mut self) {
        if !self.frozen {
            info!(
                nodes = self.nodes.len(),
                apps = self.len(),
                "Dispatch trie frozen"
            );
        }
        self.frozen = true;
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Number of mounted applications (the default is not counted)
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.app.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn default_app(&self) -> &A {
        &self.default
    }

    /// Application for `path`: the longest registered prefix, or the default.
    #[must_use]
    pub fn find(&self, path: &str) -> &A {
        self.lookup(path).map_or(&self.default, |m| m.app)
    }

    /// Like [`find`](Self::find) but returns `None` instead of the default and
    /// reports how much of the path the prefix covered.
    #[must_use]
    pub fn lookup<'t, 'p>(&'t self, path: &'p str) -> Option<TrieMatch<'t, 'p, A>> {
        let spans = segment_spans(path);
        let (node, depth) = self.search(ROOT, path, &spans, 0)?;
        let app = self.nodes[node].app.as_ref()?;

        let end = if depth == 0 { 0 } else { spans[depth - 1].1 };
        let rest = &path[end..];
        Some(TrieMatch {
            app,
            prefix: &path[..end],
            rest: if rest.is_empty() { "/" } else { rest },
        })
    }

    fn search(
        &self,
        idx: usize,
        path: &str,
        spans: &[(usize, usize)],
        depth: usize,
    ) -> Option<(usize, usize)> {
        let node = &self.nodes[idx];
        if let Some(&(start, end)) = spans.get(depth) {
            let segment = &path[start..end];
            if let Some(&child) = node.literals.get(segment) {
                if let Some(hit) = self.search(child, path, spans, depth + 1) {
                    return Some(hit);
                }
            }
            if let Some((_, child)) = &node.dynamic {
                if let Some(hit) = self.search(*child, path, spans, depth + 1) {
                    return Some(hit);
                }
            }
        }
        node.app.as_ref().map(|_| (idx, depth))
    }
}

fn is_dynamic(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('*')
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Byte ranges of the non-empty segments of `path`
fn segment_spans(path: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = 0;
    for piece in path.split('/') {
        let end = start + piece.len();
        if !piece.is_empty() {
            spans.push((start, end));
        }
        start = end + 1;
    }
    spans
}
