mod common;

use common::{schema, user_layout};
use hydrate::{
    materialize, record, Allocate, ColumnLayout, Entity, IdentityMap, Instance, InstanceFactory,
    Materializer, Rows,
};
use std::{cell::Cell, rc::Rc, sync::Arc};

/// Fails the test if a row is pulled.
fn untouchable_rows(pulled: Rc<Cell<bool>>) -> Rows {
    Rows::from_iter(std::iter::from_fn(move || {
        pulled.set(true);
        Some(Ok(record![1_i64]))
    }))
}

#[test]
fn abstract_entity_fails_before_any_row() {
    let s = schema();
    let pulled = Rc::new(Cell::new(false));
    let mut identity_map = IdentityMap::new();

    let err = materialize(
        untouchable_rows(pulled.clone()),
        &s.shape,
        &ColumnLayout::for_entity(&s.shape),
        &mut identity_map,
    )
    .unwrap_err();

    assert!(err.is_allocation());
    assert_eq!(
        err.to_string(),
        "cannot allocate instance of `Shape`: entity is abstract"
    );
    assert!(!pulled.get());
}

#[test]
fn abstract_entity_cannot_be_created_by_the_application() {
    let s = schema();
    assert!(Instance::new(&s.shape).unwrap_err().is_allocation());
}

#[test]
fn missing_column_fails_before_any_row() {
    let s = schema();
    let user = &s.user;
    let pulled = Rc::new(Cell::new(false));
    let mut identity_map = IdentityMap::new();

    let layout = ColumnLayout::new()
        .column(user, "id")
        .column(user, "x")
        .column(user, "y");

    let err = materialize(
        untouchable_rows(pulled.clone()),
        user,
        &layout,
        &mut identity_map,
    )
    .unwrap_err();

    assert!(err.is_plan_resolution());
    assert_eq!(
        err.to_string(),
        "cannot resolve populators for `User`: no column selected for property `name`"
    );
    assert!(!pulled.get());
}

#[test]
fn layout_without_key_columns_is_rejected() {
    let s = schema();
    let user = &s.user;
    let mut identity_map = IdentityMap::new();

    let layout = ColumnLayout::new()
        .column(user, "name_in_db")
        .column(user, "x")
        .column(user, "y");

    let err = materialize(Rows::empty(), user, &layout, &mut identity_map).unwrap_err();

    assert!(err.is_plan_resolution());
    assert_eq!(
        err.to_string(),
        "cannot resolve populators for `User`: primary key column `id` is not selected"
    );
}

#[test]
fn columns_of_another_entity_do_not_count() {
    let s = schema();
    let mut identity_map = IdentityMap::new();

    let layout = ColumnLayout::new()
        .column(&s.shape, "id")
        .column(&s.user, "name_in_db")
        .column(&s.user, "x")
        .column(&s.user, "y");

    let err = materialize(Rows::empty(), &s.user, &layout, &mut identity_map).unwrap_err();
    assert!(err.is_plan_resolution());
}

#[test]
fn injected_factory_rejecting_allocation_is_fatal() {
    struct Frozen;

    impl Allocate for Frozen {
        fn allocate(&self, entity: &Arc<Entity>) -> hydrate::Result<Instance> {
            Err(hydrate::Error::allocation(&entity.name, "allocation is frozen"))
        }
    }

    let s = schema();
    let mut identity_map = IdentityMap::new();
    let mut materializer = Materializer::builder().factory(Frozen).build();

    let err = materializer
        .materialize(
            vec![record![1_i64, "Bob", 1_i64, 2_i64]],
            &s.user,
            &user_layout(&s.user),
            &mut identity_map,
        )
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "cannot allocate instance of `User`: allocation is frozen"
    );
    assert!(materializer.plans().is_empty());

    // The default factory allocates the same entity fine
    assert!(InstanceFactory.allocate(&s.user).is_ok());
}
