//! Per-table column registry

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Column, ColumnError, ColumnResult};

/// Name to column map of one table
///
/// Columns are registered once at schema set-up and shared read-only.
#[derive(Debug, Default, Clone)]
pub struct ColumnRegistry {
    columns: BTreeMap<String, Arc<dyn Column>>,
}

impl ColumnRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `column`; names must be unique
    pub fn add<C: Column + 'static>(&mut self, column: C) -> ColumnResult<Arc<dyn Column>> {
        let name = column.name().to_string();
        if self.columns.contains_key(&name) {
            return Err(ColumnError::DuplicateColumn { name });
        }
        let column: Arc<dyn Column> = Arc::new(column);
        self.columns.insert(name, Arc::clone(&column));
        Ok(column)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Column>> {
        self.columns.get(name).cloned()
    }

    /// Like `get`, but unknown names are an error
    pub fn find(&self, name: &str) -> ColumnResult<Arc<dyn Column>> {
        self.get(name).ok_or_else(|| ColumnError::UnknownColumn {
            name: name.to_string(),
        })
    }

    /// Columns in name order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Column>> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
