//! In-memory ledger tables
//!
//! Tables are owned by an account and addressed by `(owner, name)`. Payloads
//! are JSON:
//!
//! - create: column list, `["id", "name"]` or `[{"field": "id", "type": "int"}]`
//! - insert: one row object or an array of them
//! - delete / select / update condition: an object matched by equality, an
//!   array of objects matched as alternatives, or empty to match every row
//! - update values: an object of column assignments
//! - grant: an object of permission flags, stored as given
//!
//! Operations issued between `begin` and `submit` are applied immediately but
//! rolled back together if any of them fails.

use primitive_types::U256;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use zxc_primitives::Address;

/// One row: column name to value
pub type Row = Map<String, Value>;

/// Table operation failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    /// Name is empty or not UTF-8
    #[error("invalid table name")]
    InvalidName,
    /// No such table for the owner
    #[error("table not found: {0}")]
    NotFound(String),
    /// Table name already taken for the owner
    #[error("table already exists: {0}")]
    Exists(String),
    /// Payload is not the expected JSON shape
    #[error("invalid payload: {0}")]
    Payload(String),
    /// Row or assignment names a column the table does not have
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// `submit` without `begin`
    #[error("no open transaction")]
    NotInTransaction,
    /// An operation inside the transaction failed; changes were undone
    #[error("transaction rolled back")]
    RolledBack,
}

/// Table schema, rows and grants
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Column names in declaration order
    pub columns: Vec<String>,
    /// Rows in insertion order
    pub rows: Vec<Row>,
    /// Permission flags per grantee
    pub grants: BTreeMap<Address, Value>,
}

impl Table {
    fn check_columns<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Result<(), TableError> {
        for name in names {
            if !self.columns.contains(name) {
                return Err(TableError::UnknownColumn(name.clone()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Transaction {
    backup: BTreeMap<(Address, String), Table>,
    failed: bool,
}

/// All ledger tables plus the open transaction, if any
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableStore {
    tables: BTreeMap<(Address, String), Table>,
    transaction: Option<Transaction>,
}

fn decode_name(name: &[u8]) -> Result<String, TableError> {
    match std::str::from_utf8(name) {
        Ok(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(TableError::InvalidName),
    }
}

fn parse_json(raw: &[u8]) -> Result<Value, TableError> {
    if raw.is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_slice(raw).map_err(|e| TableError::Payload(e.to_string()))
}

fn parse_columns(raw: &[u8]) -> Result<Vec<String>, TableError> {
    let Value::Array(items) = parse_json(raw)? else {
        return Err(TableError::Payload("column list must be an array".to_string()));
    };
    let mut columns = Vec::with_capacity(items.len());
    for item in items {
        let name = match item {
            Value::String(s) => s,
            Value::Object(mut obj) => match obj.remove("field") {
                Some(Value::String(s)) => s,
                _ => return Err(TableError::Payload("column without a field name".to_string())),
            },
            _ => return Err(TableError::Payload("column must be a string or object".to_string())),
        };
        if name.is_empty() || columns.contains(&name) {
            return Err(TableError::Payload(format!("bad column name: {name:?}")));
        }
        columns.push(name);
    }
    if columns.is_empty() {
        return Err(TableError::Payload("table needs at least one column".to_string()));
    }
    Ok(columns)
}

fn parse_rows(raw: &[u8]) -> Result<Vec<Row>, TableError> {
    match parse_json(raw)? {
        Value::Object(row) => Ok(vec![row]),
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Ok(row),
                _ => Err(TableError::Payload("row must be an object".to_string())),
            })
            .collect(),
        _ => Err(TableError::Payload("rows must be an object or array".to_string())),
    }
}

/// Row filter: any of the alternatives matches, an empty filter matches all
#[derive(Debug, Clone, Default)]
struct Condition(Vec<Row>);

impl Condition {
    fn parse(raw: &[u8]) -> Result<Self, TableError> {
        match parse_json(raw)? {
            Value::Null => Ok(Self::default()),
            Value::Object(obj) if obj.is_empty() => Ok(Self::default()),
            Value::Object(obj) => Ok(Self(vec![obj])),
            Value::Array(_) => Ok(Self(parse_rows(raw)?)),
            _ => Err(TableError::Payload("condition must be an object or array".to_string())),
        }
    }

    fn matches(&self, row: &Row) -> bool {
        self.0.is_empty()
            || self
                .0
                .iter()
                .any(|alt| alt.iter().all(|(k, v)| row.get(k).unwrap_or(&Value::Null) == v))
    }
}

impl TableStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Table by owner and name
    pub fn table(&self, owner: &Address, name: &str) -> Option<&Table> {
        self.tables.get(&(*owner, name.to_string()))
    }

    /// Number of tables across all owners
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether no table exists
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Whether `begin` has been called without a matching `submit`
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    fn table_mut(&mut self, owner: &Address, name: &[u8]) -> Result<&mut Table, TableError> {
        let name = decode_name(name)?;
        self.tables
            .get_mut(&(*owner, name.clone()))
            .ok_or(TableError::NotFound(name))
    }

    /// Record the outcome of an operation against the open transaction
    fn track<T>(&mut self, result: Result<T, TableError>) -> Result<T, TableError> {
        if result.is_err() {
            if let Some(tx) = self.transaction.as_mut() {
                tx.failed = true;
            }
        }
        result
    }

    /// Create a table with the columns listed in `raw`
    pub fn create(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> Result<(), TableError> {
        let result = (|| {
            let name = decode_name(name)?;
            let columns = parse_columns(raw)?;
            let key = (*owner, name);
            if self.tables.contains_key(&key) {
                return Err(TableError::Exists(key.1));
            }
            self.tables.insert(
                key,
                Table {
                    columns,
                    ..Table::default()
                },
            );
            Ok(())
        })();
        self.track(result)
    }

    /// Remove a table and its rows
    pub fn drop_table(&mut self, owner: &Address, name: &[u8]) -> Result<(), TableError> {
        let result = decode_name(name).and_then(|name| {
            self.tables
                .remove(&(*owner, name.clone()))
                .map(|_| ())
                .ok_or(TableError::NotFound(name))
        });
        self.track(result)
    }

    /// Rename a table; `new_name` is the raw new name
    pub fn rename(&mut self, owner: &Address, name: &[u8], new_name: &[u8]) -> Result<(), TableError> {
        let result = (|| {
            let from = decode_name(name)?;
            let to = decode_name(new_name)?;
            if self.tables.contains_key(&(*owner, to.clone())) {
                return Err(TableError::Exists(to));
            }
            let table = self
                .tables
                .remove(&(*owner, from.clone()))
                .ok_or(TableError::NotFound(from))?;
            self.tables.insert((*owner, to), table);
            Ok(())
        })();
        self.track(result)
    }

    /// Append rows; returns how many were inserted
    pub fn insert(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> Result<usize, TableError> {
        let result = (|| {
            let rows = parse_rows(raw)?;
            let table = self.table_mut(owner, name)?;
            for row in &rows {
                table.check_columns(row.keys())?;
            }
            let count = rows.len();
            for mut row in rows {
                for column in &table.columns {
                    row.entry(column.clone()).or_insert(Value::Null);
                }
                table.rows.push(row);
            }
            Ok(count)
        })();
        self.track(result)
    }

    /// Delete matching rows; returns how many were removed
    pub fn delete(&mut self, owner: &Address, name: &[u8], raw: &[u8]) -> Result<usize, TableError> {
        let result = (|| {
            let condition = Condition::parse(raw)?;
            let table = self.table_mut(owner, name)?;
            let before = table.rows.len();
            table.rows.retain(|row| !condition.matches(row));
            Ok(before - table.rows.len())
        })();
        self.track(result)
    }

    /// Assign `values` to matching rows; returns how many were changed
    pub fn update(
        &mut self,
        owner: &Address,
        name: &[u8],
        values: &[u8],
        condition: &[u8],
    ) -> Result<usize, TableError> {
        let result = (|| {
            let Value::Object(values) = parse_json(values)? else {
                return Err(TableError::Payload("update values must be an object".to_string()));
            };
            let condition = Condition::parse(condition)?;
            let table = self.table_mut(owner, name)?;
            table.check_columns(values.keys())?;
            let mut changed = 0;
            for row in table.rows.iter_mut().filter(|row| condition.matches(row)) {
                for (k, v) in &values {
                    row.insert(k.clone(), v.clone());
                }
                changed += 1;
            }
            Ok(changed)
        })();
        self.track(result)
    }

    /// Record permission flags for `grantee`
    pub fn grant(
        &mut self,
        owner: &Address,
        grantee: &Address,
        name: &[u8],
        raw: &[u8],
    ) -> Result<(), TableError> {
        let result = (|| {
            let flags = parse_json(raw)?;
            if !flags.is_object() {
                return Err(TableError::Payload("grant flags must be an object".to_string()));
            }
            let table = self.table_mut(owner, name)?;
            table.grants.insert(*grantee, flags);
            Ok(())
        })();
        self.track(result)
    }

    /// Snapshot of matching rows
    pub fn select(&self, owner: &Address, name: &[u8], raw: &[u8]) -> Result<Query, TableError> {
        let name = decode_name(name)?;
        let condition = Condition::parse(raw)?;
        let table = self
            .tables
            .get(&(*owner, name.clone()))
            .ok_or(TableError::NotFound(name))?;
        Ok(Query {
            columns: table.columns.clone(),
            rows: table
                .rows
                .iter()
                .filter(|row| condition.matches(row))
                .cloned()
                .collect(),
        })
    }

    /// Open a transaction; a nested `begin` joins the open one
    pub fn begin(&mut self) {
        if self.transaction.is_none() {
            self.transaction = Some(Transaction {
                backup: self.tables.clone(),
                failed: false,
            });
        }
    }

    /// Close the transaction, undoing it if any operation inside failed
    pub fn submit(&mut self) -> Result<(), TableError> {
        let tx = self.transaction.take().ok_or(TableError::NotInTransaction)?;
        if tx.failed {
            self.tables = tx.backup;
            return Err(TableError::RolledBack);
        }
        Ok(())
    }

    /// Undo and close the open transaction, if any
    pub fn abort(&mut self) {
        if let Some(tx) = self.transaction.take() {
            self.tables = tx.backup;
        }
    }
}

/// Result rows of a select, read through a handle
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Column names of the table
    pub columns: Vec<String>,
    /// Matching rows
    pub rows: Vec<Row>,
}

fn render(value: &Value) -> Vec<u8> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => s.as_bytes().to_vec(),
        other => other.to_string().into_bytes(),
    }
}

impl Query {
    /// Value bytes of `column` in `row`: strings raw, other JSON values as text
    pub fn value(&self, row: usize, column: &str) -> Option<Vec<u8>> {
        self.rows.get(row)?.get(column).map(render)
    }

    /// Value bytes of the column at `index` in declaration order
    pub fn value_at(&self, row: usize, index: usize) -> Option<Vec<u8>> {
        let column = self.columns.get(index)?;
        self.value(row, column)
    }
}

/// Open select results keyed by handle; handles start at 1
#[derive(Debug, Clone, Default)]
pub struct QuerySet {
    queries: BTreeMap<u64, Query>,
    next: u64,
}

impl QuerySet {
    /// Store a query and return its handle
    pub fn open(&mut self, query: Query) -> U256 {
        self.next += 1;
        self.queries.insert(self.next, query);
        U256::from(self.next)
    }

    /// Query behind a handle
    pub fn get(&self, handle: &U256) -> Option<&Query> {
        if handle.bits() > 64 {
            return None;
        }
        self.queries.get(&handle.low_u64())
    }

    /// Drop every open query
    pub fn clear(&mut self) {
        self.queries.clear();
    }

    /// Number of open queries
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether no query is open
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Convert a stack word to an index, saturating to `usize::MAX`
pub(crate) fn word_index(word: &U256) -> usize {
    if word.bits() > 64 {
        usize::MAX
    } else {
        usize::try_from(word.low_u64()).unwrap_or(usize::MAX)
    }
}
