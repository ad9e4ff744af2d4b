//! JSON renderer backed by `serde_json::Value`

use base64::Engine;
use serde_json::{Map, Number, Value};

use super::Renderer;

enum Frame {
    List(Vec<Value>),
    Dict(Map<String, Value>, Option<String>),
}

/// Renderer that collects output into JSON values.
///
/// Blobs become base64 strings, non-finite doubles become `null`.
#[derive(Default)]
pub struct JsonRenderer {
    stack: Vec<Frame>,
    values: Vec<Value>,
}

impl JsonRenderer {
    /// Creates an empty renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all completed top-level values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Returns the first completed top-level value, or `null`.
    pub fn into_value(self) -> Value {
        self.values.into_iter().next().unwrap_or(Value::Null)
    }

    fn emit(&mut self, value: Value) {
        match self.stack.last_mut() {
            Some(Frame::List(items)) => items.push(value),
            Some(Frame::Dict(map, key)) => {
                let key = key.take().unwrap_or_default();
                map.insert(key, value);
            }
            None => self.values.push(value),
        }
    }
}

impl Renderer for JsonRenderer {
    fn output_null(&mut self) {
        self.emit(Value::Null);
    }

    fn output_integer(&mut self, value: i64) {
        self.emit(Value::from(value));
    }

    fn output_double(&mut self, value: f64) {
        let value = Number::from_f64(value).map_or(Value::Null, Value::Number);
        self.emit(value);
    }

    fn output_string(&mut self, value: &str) {
        self.emit(Value::String(value.to_string()));
    }

    fn output_blob(&mut self, value: &[u8]) {
        let encoded = base64::engine::general_purpose::STANDARD.encode(value);
        self.emit(Value::String(encoded));
    }

    fn begin_list(&mut self) {
        self.stack.push(Frame::List(Vec::new()));
    }

    fn end_list(&mut self) {
        if let Some(Frame::List(items)) = self.stack.pop() {
            self.emit(Value::Array(items));
        }
    }

    fn begin_dict(&mut self) {
        self.stack.push(Frame::Dict(Map::new(), None));
    }

    fn dict_key(&mut self, key: &str) {
        if let Some(Frame::Dict(_, pending)) = self.stack.last_mut() {
            *pending = Some(key.to_string());
        }
    }

    fn end_dict(&mut self) {
        if let Some(Frame::Dict(map, _)) = self.stack.pop() {
            self.emit(Value::Object(map));
        }
    }
}
