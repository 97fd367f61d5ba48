use std::sync::Arc;

use tracing::{debug, info};

use super::core::{Middleware, Stack};
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse};
use crate::error::RouterError;
use crate::mount::DispatchTrie;

/// One application behind per-path middleware stacks.
///
/// The stack for a request is chosen by the longest registered prefix of its
/// path. A prefix's stack runs the root middlewares, then those of every
/// registered ancestor prefix (shallowest first), then its own.
pub struct MiddlewareApp {
    stacks: DispatchTrie<Stack>,
}

impl MiddlewareApp {
    pub fn builder<H>(app: H) -> MiddlewareAppBuilder
    where
        H: Handler + 'static,
    {
        MiddlewareAppBuilder::new(Arc::new(app))
    }

    /// Stack that would serve `path`
    #[must_use]
    pub fn stack_for(&self, path: &str) -> &Stack {
        self.stacks.find(path)
    }
}

impl Handler for MiddlewareApp {
    fn invoke(&self, req: HandlerRequest) -> HandlerResponse {
        self.stacks.find(&req.path).invoke(req)
    }
}

pub struct MiddlewareAppBuilder {
    app: Arc<dyn Handler>,
    root: Vec<Arc<dyn Middleware>>,
    prefixed: Vec<(String, Vec<Arc<dyn Middleware>>)>,
}

impl MiddlewareAppBuilder {
    pub fn new(app: Arc<dyn Handler>) -> Self {
        Self {
            app,
            root: Vec::new(),
            prefixed: Vec::new(),
        }
    }

    /// Add a middleware that wraps every path
    #[must_use]
    pub fn use_middleware<M>(mut self, mw: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.root.push(Arc::new(mw));
        self
    }

    /// Add a middleware for `prefix` and everything below it
    #[must_use]
    pub fn use_at<M>(self, prefix: &str, mw: M) -> Self
    where
        M: Middleware + 'static,
    {
        self.use_arc_at(prefix, Arc::new(mw))
    }

    /// [`use_at`](Self::use_at) for a middleware that is shared elsewhere,
    /// e.g. a metrics collector read by the application
    #[must_use]
    pub fn use_arc_at(mut self, prefix: &str, mw: Arc<dyn Middleware>) -> Self {
        let key = normalize(prefix);
        if key == "/" {
            self.root.push(mw);
            return self;
        }
        match self.prefixed.iter_mut().find(|(p, _)| *p == key) {
            Some((_, list)) => list.push(mw),
            None => self.prefixed.push((key, vec![mw])),
        }
        self
    }

    /// Build and freeze the per-prefix stacks
    ///
    /// # Errors
    ///
    /// Propagates trie insertion failures.
    pub fn build(self) -> Result<MiddlewareApp, RouterError> {
        let root_stack = Stack::new(self.root.clone(), Arc::clone(&self.app));
        let mut stacks = DispatchTrie::new(root_stack);

        for (prefix, own) in &self.prefixed {
            let mut ancestors: Vec<&(String, Vec<Arc<dyn Middleware>>)> = self
                .prefixed
                .iter()
                .filter(|(other, _)| is_ancestor(other, prefix))
                .collect();
            ancestors.sort_by_key(|(other, _)| depth(other));

            let mut chain = self.root.clone();
            for (_, list) in ancestors {
                chain.extend(list.iter().map(Arc::clone));
            }
            chain.extend(own.iter().map(Arc::clone));

            debug!(prefix = %prefix, stack_len = chain.len(), "Middleware stack assembled");
            stacks.insert(prefix, Stack::new(chain, Arc::clone(&self.app)))?;
        }
        stacks.freeze();

        info!(
            prefixes = self.prefixed.len(),
            root_middlewares = self.root.len(),
            "Middleware app built"
        );
        Ok(MiddlewareApp { stacks })
    }
}

fn normalize(prefix: &str) -> String {
    let segments: Vec<&str> = prefix.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn depth(prefix: &str) -> usize {
    prefix.split('/').filter(|s| !s.is_empty()).count()
}

/// Is `a` a strict segment-wise prefix of `b`? Dynamic segments in `a` match
/// any segment.
fn is_ancestor(a: &str, b: &str) -> bool {
    let a: Vec<&str> = a.split('/').filter(|s| !s.is_empty()).collect();
    let b: Vec<&str> = b.split('/').filter(|s| !s.is_empty()).collect();
    a.len() < b.len()
        && a.iter()
            .zip(&b)
            .all(|(x, y)| x == y || x.starts_with(':') || x.starts_with('*'))
}

#[cfg(test)]
mod helper_tests {
    use super::*;

    #[test]
    fn test_is_ancestor() {
        assert!(is_ancestor("/admin", "/admin/users"));
        assert!(is_ancestor("/org/:id", "/org/1/team"));
        assert!(!is_ancestor("/admin", "/admin"));
        assert!(!is_ancestor("/admin/users", "/admin"));
        assert!(!is_ancestor("/adm", "/admin/users"));
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("admin//users/"), "/admin/users");
        assert_eq!(normalize(""), "/");
    }
}
