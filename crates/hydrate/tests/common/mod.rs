#![allow(dead_code)]

use hydrate::{
    bail,
    schema::{Column, Entity, Property},
    ColumnLayout, Registry, Type, Value,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// Counts construction-hook runs across the test binary.
pub static INIT_CALLS: AtomicUsize = AtomicUsize::new(0);

pub struct Schema {
    pub registry: Registry,
    pub user: Arc<Entity>,
    pub shape: Arc<Entity>,
}

/// `User { id PK, name (stored as `name_in_db`), point: Point(x, y), bio (deferred) }`
/// and an abstract `Shape`.
pub fn schema() -> Schema {
    let mut registry = Registry::new();

    let user = registry
        .register(
            Entity::builder("User")
                .table("user_account")
                .property(Property::column("id", Type::I64))
                .property(Property::simple(
                    "name",
                    Column::new("name_in_db", Type::String),
                ))
                .property(Property::composite(
                    "point",
                    [Column::new("x", Type::I64), Column::new("y", Type::I64)],
                    2,
                    point,
                ))
                .property(
                    Property::simple("bio", Column::new("bio", Type::String).nullable())
                        .deferred(),
                )
                .primary_key(["id"])
                .on_init(|attrs| {
                    INIT_CALLS.fetch_add(1, Ordering::SeqCst);
                    attrs.set("name", Value::from("new user"))
                }),
        )
        .unwrap();

    let shape = registry
        .register(
            Entity::builder("Shape")
                .property(Property::column("id", Type::I64))
                .primary_key(["id"])
                .abstract_entity(),
        )
        .unwrap();

    Schema {
        registry,
        user,
        shape,
    }
}

/// Constructor of the `point` composite: a record `(x, y)`. Rejects
/// negative coordinates.
pub fn point(values: Vec<Value>) -> hydrate::Result<Value> {
    for value in &values {
        if value.as_i64().is_some_and(|v| v < 0) {
            bail!("coordinates must not be negative");
        }
    }

    Ok(Value::record_from_vec(values))
}

pub fn point_value(x: i64, y: i64) -> Value {
    Value::record_from_vec(vec![Value::I64(x), Value::I64(y)])
}

/// `id, name_in_db, x, y`
pub fn user_layout(user: &Arc<Entity>) -> ColumnLayout {
    ColumnLayout::for_entity(user)
}
