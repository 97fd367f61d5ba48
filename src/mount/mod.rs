//! # Mount Module
//!
//! Prefix dispatch for independently configured applications that share one
//! process: sub-routers, foreign handlers, or the same app wrapped in
//! different middleware stacks per path.
//!
//! ```rust
//! use switchyard::mount::DispatchTrie;
//!
//! let mut trie = DispatchTrie::new("default");
//! trie.insert("/admin", "admin").unwrap();
//! trie.insert("/admin/sub", "sub").unwrap();
//! trie.freeze();
//!
//! assert_eq!(*trie.find("/admin/users"), "admin");
//! assert_eq!(*trie.find("/admin/sub/x"), "sub");
//! assert_eq!(*trie.find("/unregistered"), "default");
//! assert!(trie.insert("/late", "late").is_err());
//! ```

mod trie;

pub use trie::{DispatchTrie, TrieMatch};
