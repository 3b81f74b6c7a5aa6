/// Builds a [`ValueRecord`](crate::stmt::ValueRecord) from a list of
/// expressions convertible into [`Value`](crate::stmt::Value).
///
/// ```ignore
/// let row = record![1_i64, "Bob", 12_i64, 23_i64];
/// ```
#[macro_export]
macro_rules! record {
    ( $( $value:expr ),* $(,)? ) => {
        $crate::stmt::ValueRecord::from_vec(vec![ $( $crate::stmt::Value::from($value), )* ])
    };
}
