use super::Column;
use crate::{
    stmt::{Type, Value},
    Result,
};

use std::{fmt, slice, sync::Arc};

/// Assembles the decoded columns of a composite property into its value.
///
/// Receives exactly `arity` values, in column declaration order.
pub type Constructor = Arc<dyn Fn(Vec<Value>) -> Result<Value> + Send + Sync>;

/// One mapped attribute of an entity.
#[derive(Debug, Clone)]
pub struct Property {
    /// The attribute name, as seen by the application.
    pub name: String,

    /// Simple or composite
    pub ty: PropertyTy,

    /// When `true`, queries may leave the property out of their column
    /// layout; it is then left at the instance factory's default.
    pub deferred: bool,
}

#[derive(Debug, Clone)]
pub enum PropertyTy {
    /// Backed by exactly one column.
    Simple(Column),

    /// Backed by an ordered sequence of columns assembled into one value.
    Composite(Composite),
}

#[derive(Clone)]
pub struct Composite {
    /// Backing columns, in the order they are passed to the constructor.
    pub columns: Vec<Column>,

    /// Number of arguments the constructor accepts.
    pub arity: usize,

    constructor: Constructor,
}

impl Property {
    /// A simple property stored in `column`.
    pub fn simple(name: impl Into<String>, column: Column) -> Self {
        Self {
            name: name.into(),
            ty: PropertyTy::Simple(column),
            deferred: false,
        }
    }

    /// A simple, non-nullable property stored in a column of the same name.
    pub fn column(name: impl Into<String>, ty: Type) -> Self {
        let name = name.into();
        let column = Column::new(name.clone(), ty);
        Self::simple(name, column)
    }

    /// A composite property. `arity` is the number of values `constructor`
    /// expects and must match the number of columns.
    pub fn composite<F>(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = Column>,
        arity: usize,
        constructor: F,
    ) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            ty: PropertyTy::Composite(Composite::new(columns, arity, constructor)),
            deferred: false,
        }
    }

    /// A composite property whose value is the record of its decoded columns.
    pub fn record(name: impl Into<String>, columns: impl IntoIterator<Item = Column>) -> Self {
        let columns: Vec<_> = columns.into_iter().collect();
        let arity = columns.len();
        Self::composite(name, columns, arity, |values| Ok(Value::record_from_vec(values)))
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    /// Columns backing the property, in declaration order.
    pub fn columns(&self) -> &[Column] {
        match &self.ty {
            PropertyTy::Simple(column) => slice::from_ref(column),
            PropertyTy::Composite(composite) => &composite.columns,
        }
    }

    pub fn is_simple(&self) -> bool {
        matches!(self.ty, PropertyTy::Simple(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.ty, PropertyTy::Composite(_))
    }

    pub fn as_simple(&self) -> Option<&Column> {
        match &self.ty {
            PropertyTy::Simple(column) => Some(column),
            PropertyTy::Composite(_) => None,
        }
    }
}

impl Composite {
    pub fn new<F>(columns: impl IntoIterator<Item = Column>, arity: usize, constructor: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            columns: columns.into_iter().collect(),
            arity,
            constructor: Arc::new(constructor),
        }
    }

    /// Runs the constructor over decoded column values.
    pub fn construct(&self, values: Vec<Value>) -> Result<Value> {
        debug_assert_eq!(values.len(), self.arity);
        (self.constructor)(values)
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("columns", &self.columns)
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}
