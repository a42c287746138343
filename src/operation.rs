//! Backend request types and their SQL rendering.
//!
//! Everything the router hands to a [`Backend`](crate::sqlite::Backend) is one of
//! the operations below. Rendering always produces positional `?` placeholders;
//! values never end up inside statement text.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let output = match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(value) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*value)),
            Value::Real(value) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*value)),
            Value::Text(value) => ToSqlOutput::Borrowed(ValueRef::Text(value.as_bytes())),
            Value::Blob(value) => ToSqlOutput::Borrowed(ValueRef::Blob(value.as_slice())),
            Value::Boolean(value) => {
                ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*value)))
            }
        };
        Ok(output)
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(value) => Value::Integer(value),
            ValueRef::Real(value) => Value::Real(value),
            ValueRef::Text(text) => std::str::from_utf8(text)
                .map(|text| Value::Text(text.to_string()))
                .map_err(|why| FromSqlError::Other(Box::new(why)))?,
            ValueRef::Blob(blob) => Value::Blob(blob.to_vec()),
        })
    }
}

/// Column to value mapping for a single row write.
///
/// Ordered by column name so that rendered statements are stable.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValues {
    pub values: BTreeMap<String, Value>,
}

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named value
    pub fn with_value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn put(&mut self, column: &str, value: impl Into<Value>) {
        self.values.insert(column.to_string(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// SQL statement with positional parameters, ready for the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Vec<Value>,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Vec::new(),
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = params;
        self
    }
}

/// Query operators for building advanced queries
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal(Value),
    NotEqual(Value),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    Like(String),
    In(Vec<Value>),
}

impl QueryOperator {
    fn render(&self, field: &str, params: &mut Vec<Value>) -> String {
        let (operator, value) = match self {
            QueryOperator::Equal(Value::Null) => return format!("{field} IS NULL"),
            QueryOperator::NotEqual(Value::Null) => return format!("{field} IS NOT NULL"),
            QueryOperator::Equal(value) => ("=", value.clone()),
            QueryOperator::NotEqual(value) => ("<>", value.clone()),
            QueryOperator::GreaterThan(value) => (">", value.clone()),
            QueryOperator::GreaterThanOrEqual(value) => (">=", value.clone()),
            QueryOperator::LessThan(value) => ("<", value.clone()),
            QueryOperator::LessThanOrEqual(value) => ("<=", value.clone()),
            QueryOperator::Like(pattern) => ("LIKE", Value::Text(pattern.clone())),
            QueryOperator::In(values) => {
                if values.is_empty() {
                    return "1 = 0".to_string();
                }
                params.extend(values.iter().cloned());
                let placeholders = vec!["?"; values.len()].join(", ");
                return format!("{field} IN ({placeholders})");
            }
        };
        params.push(value);
        format!("{field} {operator} ?")
    }
}

/// Structured conditions, joined with `AND` in insertion order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query {
    pub conditions: Vec<(String, QueryOperator)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, field: &str, op: QueryOperator) -> Self {
        self.conditions.push((field.to_string(), op));
        self
    }
}

/// Caller-supplied filter: a raw `WHERE` fragment using anonymous `?`
/// placeholders, plus the values bound to them in order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Selection {
    pub clause: String,
    pub args: Vec<Value>,
}

impl Selection {
    pub fn new(clause: &str) -> Self {
        Self {
            clause: clause.to_string(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// The `FROM` part of a read.
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(String),
    InnerJoin {
        left: String,
        right: String,
        left_column: String,
        right_column: String,
    },
}

impl TableSource {
    pub fn table(name: &str) -> Self {
        TableSource::Table(name.to_string())
    }

    fn render(&self) -> String {
        match self {
            TableSource::Table(name) => name.clone(),
            TableSource::InnerJoin {
                left,
                right,
                left_column,
                right_column,
            } => format!(
                "{left} INNER JOIN {right} ON {left}.{left_column} = {right}.{right_column}"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadOperation {
    pub source: TableSource,
    pub fields: Option<Vec<String>>,
    pub query: Query,
    pub selection: Option<Selection>,
    pub order_by: Option<String>,
}

impl ReadOperation {
    pub fn new(source: TableSource) -> Self {
        Self {
            source,
            fields: None,
            query: Query::new(),
            selection: None,
            order_by: None,
        }
    }

    pub fn with_fields(mut self, fields: Option<Vec<String>>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_selection(mut self, selection: Option<Selection>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_order_by(mut self, order_by: Option<String>) -> Self {
        self.order_by = order_by;
        self
    }

    /// Render as `SELECT ... FROM ... [WHERE ...] [ORDER BY ...]`.
    ///
    /// Structured conditions bind their parameters ahead of the caller's
    /// selection arguments.
    pub fn to_sql(&self) -> SqlQuery {
        let fields = match &self.fields {
            Some(fields) if !fields.is_empty() => fields.join(", "),
            _ => "*".to_string(),
        };
        let mut statement = format!("SELECT {fields} FROM {}", self.source.render());

        let mut params = Vec::new();
        let mut clauses: Vec<String> = self
            .query
            .conditions
            .iter()
            .map(|(field, op)| op.render(field, &mut params))
            .collect();
        if let Some(selection) = self.selection.as_ref().filter(|s| !s.clause.trim().is_empty()) {
            clauses.push(format!("({})", selection.clause.trim()));
            params.extend(selection.args.iter().cloned());
        }
        if !clauses.is_empty() {
            statement.push_str(" WHERE ");
            statement.push_str(&clauses.join(" AND "));
        }
        if let Some(order_by) = self.order_by.as_deref().filter(|o| !o.trim().is_empty()) {
            statement.push_str(" ORDER BY ");
            statement.push_str(order_by.trim());
        }
        SqlQuery::new(&statement).with_params(params)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation {
    pub table: String,
    pub data: ColumnValues,
}

impl CreateOperation {
    pub fn new(table: &str, data: ColumnValues) -> Self {
        Self {
            table: table.to_string(),
            data,
        }
    }

    pub fn to_sql(&self) -> SqlQuery {
        let table = quote_identifier(&self.table);
        if self.data.is_empty() {
            return SqlQuery::new(&format!("INSERT INTO {table} DEFAULT VALUES"));
        }
        let columns: Vec<String> = self.data.values.keys().map(|c| quote_identifier(c)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let statement = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            columns.join(", ")
        );
        SqlQuery::new(&statement).with_params(self.data.values.values().cloned().collect())
    }
}

/// Quote an identifier for SQLite, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Rows returned by a read, with the column names the backend reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First column carrying `name`; joins may repeat names such as `_id`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }

    /// Every value of `column`, in row order.
    pub fn column_values(&self, column: &str) -> Vec<&Value> {
        match self.column_index(column) {
            Some(index) => self.rows.iter().filter_map(|row| row.get(index)).collect(),
            None => Vec::new(),
        }
    }
}
