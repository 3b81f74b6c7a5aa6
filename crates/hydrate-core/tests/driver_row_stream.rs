use hydrate_core::driver::{RowStream, Rows};
use hydrate_core::stmt::{Value, ValueRecord};
use hydrate_core::{err, record, Result};

#[tokio::test]
async fn stream_from_tokio_stream() {
    let rows = tokio_stream::iter(vec![Ok(record![1_i64, "a"]), Ok(record![2_i64, "b"])]);
    let stream = RowStream::from_stream(rows);

    let rows = stream.collect().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][1], Value::from("b"));
}

#[tokio::test]
async fn collect_stops_at_the_first_failure() {
    let items: Vec<Result<ValueRecord>> = vec![
        Ok(record![1_i64]),
        Err(err!("connection reset")),
        Ok(record![3_i64]),
    ];

    let err = RowStream::from_iter(items.into_iter())
        .collect()
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "connection reset");
}

#[tokio::test]
async fn empty_stream() {
    let mut stream = RowStream::default();

    assert_eq!(stream.min_len(), 0);
    assert!(stream.next().await.is_none());
}

#[test]
fn sync_rows_from_records() {
    let rows: Vec<_> = Rows::from(record![1_i64, 2_i64]).collect::<Result<_>>().unwrap();
    assert_eq!(rows, vec![record![1_i64, 2_i64]]);

    assert!(Rows::empty().next().is_none());
}
