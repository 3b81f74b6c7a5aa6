use crate::stmt;

/// A storage column backing a property.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column {
    /// The name of the column in the database.
    pub name: String,

    /// The type the column's cells decode to.
    pub ty: stmt::Type,

    /// Whether or not the column is nullable
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: stmt::Type) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}
