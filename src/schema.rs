//! Typed table definitions and the DDL they render to.

use crate::operation::quote_identifier;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Schema definition for the SQLite database
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }

    /// All statements needed to create the schema, tables before indexes.
    pub fn statements(&self) -> Vec<String> {
        let tables = self.tables.iter().map(TableDefinition::create_statement);
        let indexes = self.tables.iter().flat_map(|table| {
            table
                .indexes
                .iter()
                .map(move |index| index.create_statement(&table.name))
        });
        tables.chain(indexes).collect()
    }

    /// Create every table and index that does not exist yet.
    pub fn initialize(&self, conn: &Connection) -> rusqlite::Result<()> {
        for statement in self.statements() {
            log::debug!("{statement}");
            conn.execute_batch(&statement)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<UniqueConstraint>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn unique(mut self, constraint: UniqueConstraint) -> Self {
        self.unique_constraints.push(constraint);
        self
    }

    pub fn index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn create_statement(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::render).collect();
        parts.extend(self.foreign_keys.iter().map(ForeignKey::render));
        parts.extend(self.unique_constraints.iter().map(UniqueConstraint::render));
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({});",
            quote_identifier(&self.name),
            parts.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            constraints: Vec::new(),
        }
    }

    pub fn constraint(mut self, constraint: ColumnConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    fn render(&self) -> String {
        let mut sql = format!("{} {}", quote_identifier(&self.name), self.data_type.keyword());
        for constraint in &self.constraints {
            sql.push(' ');
            sql.push_str(constraint.keyword());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Text,
    Real,
    Blob,
}

impl DataType {
    fn keyword(self) -> &'static str {
        match self {
            DataType::Integer => "INTEGER",
            DataType::Text => "TEXT",
            DataType::Real => "REAL",
            DataType::Blob => "BLOB",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnConstraint {
    PrimaryKey,
    /// Only valid after `PrimaryKey` on an `INTEGER` column.
    AutoIncrement,
    NotNull,
}

impl ColumnConstraint {
    fn keyword(self) -> &'static str {
        match self {
            ColumnConstraint::PrimaryKey => "PRIMARY KEY",
            ColumnConstraint::AutoIncrement => "AUTOINCREMENT",
            ColumnConstraint::NotNull => "NOT NULL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ForeignKey {
    pub fn new(column: &str, foreign_table: &str, foreign_column: &str) -> Self {
        Self {
            column: column.to_string(),
            foreign_table: foreign_table.to_string(),
            foreign_column: foreign_column.to_string(),
        }
    }

    fn render(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_identifier(&self.column),
            quote_identifier(&self.foreign_table),
            quote_identifier(&self.foreign_column)
        )
    }
}

/// Table-level `UNIQUE (...)` with an optional conflict clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub columns: Vec<String>,
    pub on_conflict: Option<ConflictResolution>,
}

impl UniqueConstraint {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            on_conflict: None,
        }
    }

    pub fn on_conflict(mut self, resolution: ConflictResolution) -> Self {
        self.on_conflict = Some(resolution);
        self
    }

    fn render(&self) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_identifier(c)).collect();
        let mut sql = format!("UNIQUE ({})", columns.join(", "));
        if let Some(resolution) = self.on_conflict {
            sql.push_str(" ON CONFLICT ");
            sql.push_str(resolution.keyword());
        }
        sql
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictResolution {
    Ignore,
    Replace,
}

impl ConflictResolution {
    fn keyword(self) -> &'static str {
        match self {
            ConflictResolution::Ignore => "IGNORE",
            ConflictResolution::Replace => "REPLACE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDefinition {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn create_statement(&self, table: &str) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_identifier(c)).collect();
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({});",
            quote_identifier(&self.name),
            quote_identifier(table),
            columns.join(", ")
        )
    }
}
