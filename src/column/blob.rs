//! Binary columns; rendering only

use std::any::Any;
use std::fmt;

use chrono::Duration;

use super::{private, Column, ColumnInfo, ColumnType, Getter};
use crate::render::Renderer;
use crate::row::{ColumnOffsets, Row};
use crate::user::User;

/// Column holding an opaque binary payload, e.g. file contents
pub struct BlobColumn<T> {
    info: ColumnInfo,
    getter: Getter<T, Vec<u8>>,
}

impl<T: Any> BlobColumn<T> {
    pub fn new<F>(
        name: impl Into<String>,
        description: impl Into<String>,
        offsets: ColumnOffsets,
        get: F,
    ) -> Self
    where
        F: Fn(&T) -> Vec<u8> + Send + Sync + 'static,
    {
        Self {
            info: ColumnInfo::new(name, description),
            getter: Getter::new(offsets, move |record: &T, _user: &User| get(record)),
        }
    }
}

impl<T> private::Sealed for BlobColumn<T> {}

impl<T> fmt::Debug for BlobColumn<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobColumn")
            .field("name", &self.info.name)
            .finish()
    }
}

impl<T: Any> Column for BlobColumn<T> {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn column_type(&self) -> ColumnType {
        ColumnType::Blob
    }

    fn output(&self, row: Row<'_>, renderer: &mut dyn Renderer, user: &User, _timezone_offset: Duration) {
        renderer.output_blob(&self.getter.value(row, user));
    }
}
