//! Rendering sink
//!
//! Columns and aggregators write their values into an injected `Renderer`.
//! The wire encoding belongs to the renderer, not to this crate; the bundled
//! `JsonRenderer` builds a `serde_json::Value` tree.

mod json;

pub use json::JsonRenderer;

/// Sink for rendered values, with list and dictionary nesting.
pub trait Renderer {
    /// Writes an explicit null.
    fn output_null(&mut self);

    /// Writes an integer.
    fn output_integer(&mut self, value: i64);

    /// Writes a floating point number.
    fn output_double(&mut self, value: f64);

    /// Writes a string.
    fn output_string(&mut self, value: &str);

    /// Writes a binary payload.
    fn output_blob(&mut self, value: &[u8]);

    /// Opens a list; values written until `end_list` become its elements.
    fn begin_list(&mut self);

    /// Closes the innermost list.
    fn end_list(&mut self);

    /// Opens a dictionary; alternate `dict_key` and one value per entry.
    fn begin_dict(&mut self);

    /// Sets the key for the next value of the innermost dictionary.
    fn dict_key(&mut self, key: &str);

    /// Closes the innermost dictionary.
    fn end_dict(&mut self);
}
