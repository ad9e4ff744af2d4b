//! Placeholder column that always renders null

use std::fmt;

use chrono::Duration;

use super::{private, Column, ColumnInfo, ColumnType};
use crate::render::Renderer;
use crate::row::Row;
use crate::user::User;

/// Column without a value, kept for compatibility of column lists
pub struct NullColumn {
    info: ColumnInfo,
}

impl NullColumn {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            info: ColumnInfo::new(name, description),
        }
    }
}

impl private::Sealed for NullColumn {}

impl fmt::Debug for NullColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NullColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl Column for NullColumn {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Null
    }

    fn output(&self, _row: Row<'_>, renderer: &mut dyn Renderer, _user: &User, _timezone_offset: Duration) {
        renderer.output_null();
    }
}
