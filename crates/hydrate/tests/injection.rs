mod common;

use common::{schema, user_layout};
use hydrate::{
    record, schema::Column, Allocate, ColumnDecoder, Decode, Entity, IdentityMap, Instance,
    InstanceFactory, Materializer, Value, ValueRecord,
};
use pretty_assertions::assert_eq;
use std::{cell::RefCell, sync::Arc};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records the columns it is asked to decode.
#[derive(Default)]
struct Recording {
    decoded: RefCell<Vec<String>>,
}

impl Decode for Recording {
    fn decode(&self, row: &ValueRecord, position: usize, column: &Column) -> hydrate::Result<Value> {
        self.decoded.borrow_mut().push(column.name.clone());
        ColumnDecoder.decode(row, position, column)
    }
}

#[derive(Default)]
struct Counting {
    allocated: RefCell<usize>,
}

impl Allocate for Counting {
    fn allocate(&self, entity: &Arc<Entity>) -> hydrate::Result<Instance> {
        *self.allocated.borrow_mut() += 1;
        InstanceFactory.allocate(entity)
    }

    fn can_allocate(&self, entity: &Arc<Entity>) -> hydrate::Result<()> {
        InstanceFactory.can_allocate(entity)
    }
}

#[test]
fn cache_hit_decodes_only_the_key() {
    init_logging();

    let s = schema();
    let mut identity_map = IdentityMap::new();
    let mut materializer = Materializer::builder()
        .decoder(Recording::default())
        .factory(Counting::default())
        .build();

    let rows = vec![
        record![1_i64, "Bob", 12_i64, 23_i64],
        record![1_i64, "Bob", 99_i64, 99_i64],
    ];

    let count = materializer
        .materialize(rows, &s.user, &user_layout(&s.user), &mut identity_map)
        .unwrap()
        .map(Result::unwrap)
        .count();

    assert_eq!(count, 2);
    assert_eq!(
        *materializer.decoder().decoded.borrow(),
        ["id", "name_in_db", "x", "y", "id"]
    );
    assert_eq!(*materializer.factory().allocated.borrow(), 1);
}

#[test]
fn custom_decoder_sees_storage_column_names() {
    init_logging();

    struct Upper;

    impl Decode for Upper {
        fn decode(
            &self,
            row: &ValueRecord,
            position: usize,
            column: &Column,
        ) -> hydrate::Result<Value> {
            let value = ColumnDecoder.decode(row, position, column)?;

            Ok(match (column.name.as_str(), value) {
                ("name_in_db", Value::String(name)) => Value::String(name.to_uppercase()),
                (_, value) => value,
            })
        }
    }

    let s = schema();
    let mut identity_map = IdentityMap::new();
    let mut materializer = Materializer::builder().decoder(Upper).build();

    let bob = materializer
        .materialize(
            vec![record![1_i64, "Bob", 1_i64, 2_i64]],
            &s.user,
            &user_layout(&s.user),
            &mut identity_map,
        )
        .unwrap()
        .first()
        .unwrap()
        .unwrap();

    assert_eq!(
        bob.borrow().get::<String>("name").unwrap().as_deref(),
        Some("BOB")
    );
}
