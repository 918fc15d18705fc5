//! Lazily materialized, memoized tables over one raw response payload.

use crate::error::Error;
use crate::table::{normalized_rows, Table};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub const CLASSIFICATION_CODE: &str = "classificationCode";

const PORTFOLIOS: &str = "portfolios";

const PORTFOLIO_HEADER: &str = "portfolioHeader";

const PORTFOLIO_ID: &str = "portfolioId";

const HOLDINGS_STATEMENT_HEADERS: &str = "holdingsStatementHeaders";

/// How a view is produced from the payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// An array of mappings under the view's key, one row per mapping.
    Records,
    /// Classification records under the view's key, flattened on `nested`
    /// and indexed by `code`.
    Classifications {
        code: &'static str,
        nested: &'static str,
    },
    /// Derived from several parts of the whole payload.
    Composite(Composite),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Composite {
    /// The `portfolioHeader` of every portfolio, indexed by `portfolioId`.
    PortfolioHeaders,
    /// The holdings statement headers of every portfolio, tagged with the
    /// owning portfolio's id.
    PortfolioStatements,
}

/// Static view-name to transform table. Names absent from it resolve to an
/// empty table.
pub type Dispatch = [(&'static str, Transform)];

impl Transform {
    fn apply(&self, data: &Value) -> Result<Table, Error> {
        match self {
            Transform::Records => match data.as_array() {
                Some(records) => Table::from_records(records),
                None => Err(Error::Other(format!(
                    "Expected an array of records, got: {data}"
                ))),
            },
            Transform::Classifications { code, nested } => {
                flatten_classifications(data, code, nested)
            }
            Transform::Composite(composite) => composite.apply(data),
        }
    }
}

impl Composite {
    fn apply(&self, payload: &Value) -> Result<Table, Error> {
        let portfolios = match payload.get(PORTFOLIOS) {
            Some(portfolios) => portfolios,
            None => {
                debug!("Payload has no {} key", PORTFOLIOS);
                return Ok(Table::empty());
            }
        };

        match self {
            Composite::PortfolioHeaders => {
                let headers: Vec<Value> = portfolios
                    .as_array()
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|item| item.get(PORTFOLIO_HEADER).cloned())
                            .collect()
                    })
                    .unwrap_or_default();

                indexed(Table::from_records(&headers)?, PORTFOLIO_ID)
            }
            Composite::PortfolioStatements => join_children(
                portfolios,
                HOLDINGS_STATEMENT_HEADERS,
                &[PORTFOLIO_HEADER, PORTFOLIO_ID],
            ),
        }
    }
}

/// Flatten each record's `nested` structure into rows, tag the rows with the
/// record's `code`, and index the result by `code`. Record order and row order
/// within a record are preserved; the index is not unique.
pub fn flatten_classifications(records: &Value, code: &str, nested: &str) -> Result<Table, Error> {
    let records = records.as_array().ok_or_else(|| {
        Error::Other(format!(
            "Expected an array of classification records, got: {records}"
        ))
    })?;

    let rows = records.iter().flat_map(|record| {
        let value = record.get(code).cloned().unwrap_or_else(|| {
            warn!("Classification record without {}", code);
            Value::Null
        });

        normalized_rows(record.get(nested).unwrap_or(&Value::Null))
            .into_iter()
            .map(move |mut row| {
                row.retain(|(name, _)| name != code);
                row.push((code.to_string(), value.clone()));
                row
            })
    });

    indexed(Table::from_rows(rows)?, code)
}

/// One row per child found under `children` of each parent, annotated with the
/// parent's value at `parent_id`. Parents without children add no rows.
pub fn join_children(parents: &Value, children: &str, parent_id: &[&str]) -> Result<Table, Error> {
    match parents.as_array() {
        Some(parents) => Table::normalize_records(parents, children, parent_id),
        None => Err(Error::Other(format!(
            "Expected an array of parent records, got: {parents}"
        ))),
    }
}

fn indexed(table: Table, column: &str) -> Result<Table, Error> {
    if table.column(column).is_none() {
        return Ok(table);
    }

    table.set_index(column)
}

/// A raw payload plus a write-once cache of the tables derived from it.
///
/// The cache is not synchronized: a `Views` can move between threads but not
/// be shared across them.
#[derive(Debug)]
pub struct Views {
    payload: Value,
    dispatch: &'static Dispatch,
    cache: RefCell<HashMap<String, Arc<Table>>>,
}

impl Views {
    pub fn new(payload: Value, dispatch: &'static Dispatch) -> Self {
        Views {
            payload,
            dispatch,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn raw_payload(&self) -> &Value {
        &self.payload
    }

    /// The table for `name`, computed on first access and shared afterwards.
    pub fn view(&self, name: &str) -> Arc<Table> {
        if let Some(table) = self.cache.borrow().get(name) {
            return Arc::clone(table);
        }

        let table = Arc::new(self.materialize(name));

        self.cache
            .borrow_mut()
            .insert(name.to_string(), Arc::clone(&table));

        table
    }

    fn materialize(&self, name: &str) -> Table {
        let transform = match self.dispatch.iter().find(|(key, _)| *key == name) {
            Some((_, transform)) => transform,
            None => {
                debug!("No transform registered for view {}", name);
                return Table::empty();
            }
        };

        let table = match (transform, self.payload.get(name)) {
            (Transform::Composite(composite), _) => composite.apply(&self.payload),
            (_, Some(data)) => transform.apply(data),
            (_, None) => {
                debug!("Payload has no {} key", name);
                return Table::empty();
            }
        };

        table.unwrap_or_else(|e| {
            warn!("View {} degraded to an empty table: {}", name, e);
            Table::empty()
        })
    }
}

/// Declare a result type wrapping [`Views`] with a static dispatch table and
/// one named accessor per view.
macro_rules! multi_view {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $accessor:ident => $key:literal : $transform:expr ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            views: $crate::views::Views,
        }

        impl $name {
            pub const DISPATCH: &'static $crate::views::Dispatch = &[ $( ($key, $transform) ),* ];

            pub fn new(payload: serde_json::Value) -> Self {
                $name {
                    views: $crate::views::Views::new(payload, Self::DISPATCH),
                }
            }

            pub fn raw_payload(&self) -> &serde_json::Value {
                self.views.raw_payload()
            }

            pub fn view(&self, name: &str) -> std::sync::Arc<$crate::table::Table> {
                self.views.view(name)
            }

            $(
                pub fn $accessor(&self) -> std::sync::Arc<$crate::table::Table> {
                    self.views.view($key)
                }
            )*
        }
    };
}

pub(crate) use multi_view;
