use super::scoped_map::ScopedMap;

#[test]
fn insert_and_get() {
    let mut map = ScopedMap::new();
    assert!(map.is_empty());

    map.insert("alpha", 1, 0);
    map.insert("beta", 2, 0);

    assert_eq!(map.get("alpha"), Some(&1));
    assert_eq!(map.get("beta"), Some(&2));
    assert_eq!(map.get("gamma"), None);
    assert_eq!(map.len(), 2);
}

#[test]
fn insert_replaces_and_returns_old_value() {
    let mut map = ScopedMap::new();
    map.insert("x", 10, 0);

    let old = map.insert("x", 20, 1);
    assert_eq!(old, Some(10));
    assert_eq!(map.get("x"), Some(&20));
    assert_eq!(map.level_of("x"), Some(1));
    assert_eq!(map.len(), 1);
}

#[test]
fn remove_deletes_one_binding() {
    let mut map = ScopedMap::new();
    map.insert("a", 1, 0);
    map.insert("b", 2, 0);

    assert_eq!(map.remove("a"), Some(1));
    assert_eq!(map.remove("a"), None);
    assert_eq!(map.get("b"), Some(&2));
}

#[test]
fn purge_removes_deeper_levels_only() {
    let mut map = ScopedMap::new();
    map.insert("file", 1, 0);
    map.insert("outer", 2, 1);
    map.insert("inner", 3, 2);

    map.purge(1);
    assert_eq!(map.get("file"), Some(&1));
    assert_eq!(map.get("outer"), Some(&2));
    assert_eq!(map.get("inner"), None);

    map.purge(0);
    assert_eq!(map.get("file"), Some(&1));
    assert_eq!(map.get("outer"), None);
    assert_eq!(map.len(), 1);
}

#[test]
fn purge_below_insertion_level_hides_binding() {
    // insert(k, v, L) then purge(L') with L' < L must make get(k) = None
    let mut map = ScopedMap::new();
    map.insert("k", 7, 3);
    map.purge(2);
    assert_eq!(map.get("k"), None);
}

#[test]
fn iteration_is_in_key_order() {
    let mut map = ScopedMap::new();
    map.insert("zeta", 1, 0);
    map.insert("alpha", 2, 0);
    map.insert("mu", 3, 1);

    let keys: Vec<&str> = map.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["alpha", "mu", "zeta"]);
}

#[test]
fn get_mut_updates_in_place() {
    let mut map = ScopedMap::new();
    map.insert("n", 1, 0);
    *map.get_mut("n").unwrap() += 41;
    assert_eq!(map.get("n"), Some(&42));
}

#[test]
fn many_levels_purge_in_order() {
    let mut map = ScopedMap::new();
    for level in 0..10u32 {
        map.insert(&format!("v{level}"), level, level);
    }
    assert_eq!(map.len(), 10);

    for level in (0..10u32).rev() {
        map.purge(level);
        assert_eq!(map.len(), level as usize + 1);
        assert!(map.contains(&format!("v{level}")));
    }
}
