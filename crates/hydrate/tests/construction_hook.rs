mod common;

use common::{schema, user_layout, INIT_CALLS};
use hydrate::{materialize, record, IdentityMap, Instance};
use pretty_assertions::assert_eq;
use std::sync::atomic::Ordering;

// Single test in this binary: the hook counter is process-wide.
#[test]
fn hook_runs_for_new_instances_only() {
    let s = schema();
    let mut identity_map = IdentityMap::new();

    let rows = (1..=5_i64)
        .map(|id| record![id, "Bob", 1_i64, 2_i64])
        .collect::<Vec<_>>();

    let loaded = materialize(rows, &s.user, &user_layout(&s.user), &mut identity_map)
        .unwrap()
        .collect::<hydrate::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(loaded.len(), 5);
    assert_eq!(INIT_CALLS.load(Ordering::SeqCst), 0);

    let mut created = Instance::new(&s.user).unwrap();
    assert_eq!(INIT_CALLS.load(Ordering::SeqCst), 1);

    assert_eq!(
        created.get::<String>("name").unwrap().as_deref(),
        Some("new user")
    );
    assert_eq!(created.dirty_properties().collect::<Vec<_>>(), ["name"]);
    assert_eq!(created.key(), None);

    created.set("id", 42_i64).unwrap();
    assert_eq!(created.dirty_properties().collect::<Vec<_>>(), ["id", "name"]);
    assert!(created.key().is_some());
}
