use std::sync::Arc;

use switchyard::mount::DispatchTrie;
use switchyard::RouterError;

#[test]
fn test_prefix_fallback_and_default_app() {
    let mut trie = DispatchTrie::new("default");
    trie.insert("/admin", "admin").unwrap();
    trie.insert("/admin/sub", "sub").unwrap();
    trie.freeze();

    assert_eq!(*trie.find("/admin/users"), "admin");
    assert_eq!(*trie.find("/admin/sub"), "sub");
    assert_eq!(*trie.find("/admin/sub/deeper/still"), "sub");
    assert_eq!(*trie.find("/unregistered"), "default");
    assert_eq!(*trie.find("/"), "default");
}

#[test]
fn test_insert_after_freeze_fails() {
    let mut trie = DispatchTrie::new(0);
    trie.insert("/a", 1).unwrap();
    trie.freeze();

    match trie.insert("/b", 2) {
        Err(RouterError::TrieFrozen { prefix }) => assert_eq!(prefix, "/b"),
        other => panic!("expected TrieFrozen, got {other:?}"),
    }
    assert_eq!(trie.len(), 1);
    assert_eq!(*trie.find("/b"), 0);
}

#[test]
fn test_dynamic_prefix_segment() {
    let mut trie = DispatchTrie::new("default");
    trie.insert("/orgs/:org/admin", "org_admin").unwrap();
    trie.insert("/orgs/new", "new_org").unwrap();
    trie.freeze();

    assert_eq!(*trie.find("/orgs/acme/admin/users"), "org_admin");
    assert_eq!(*trie.find("/orgs/new"), "new_org");
    assert_eq!(*trie.find("/orgs/acme"), "default");

    let hit = trie.lookup("/orgs/acme/admin/users").unwrap();
    assert_eq!(hit.prefix, "/orgs/acme/admin");
    assert_eq!(hit.rest, "/users");
}

#[test]
fn test_frozen_trie_shared_between_threads() {
    let mut trie = DispatchTrie::new(String::from("default"));
    trie.insert("/api", String::from("api")).unwrap();
    trie.freeze();
    let trie = Arc::new(trie);

    let handles: Vec<_> = ["/api/v1", "/static/app.js"]
        .into_iter()
        .map(|path| {
            let trie = Arc::clone(&trie);
            std::thread::spawn(move || trie.find(path).clone())
        })
        .collect();
    let found: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(found, vec!["api", "default"]);
}
