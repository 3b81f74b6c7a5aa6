//! Types exchanged with the query-execution collaborators: the column layout
//! of a compiled query and the row sources feeding the engine.

mod layout;
pub use layout::{ColumnLayout, ColumnRef};

mod row_stream;
pub use row_stream::RowStream;

mod rows;
pub use rows::Rows;
