//! Output formatting

use serde_json::{Map, Value};

/// Output builder: a JSON object in `--json` mode, text lines otherwise
pub struct Output {
    json_mode: bool,
    fields: Map<String, Value>,
    lines: Vec<String>,
}

impl Output {
    /// Create a new output builder
    pub fn new(json_mode: bool) -> Self {
        Self {
            json_mode,
            fields: Map::new(),
            lines: Vec::new(),
        }
    }

    /// Add a string field, also shown as a `label: value` text line
    pub fn field(mut self, key: &str, value: &str) -> Self {
        self.lines.push(format!("{key}: {value}"));
        self.fields.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    /// Add a signed integer field
    pub fn field_i64(mut self, key: &str, value: i64) -> Self {
        self.lines.push(format!("{key}: {value}"));
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add an unsigned integer field
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.lines.push(format!("{key}: {value}"));
        self.fields.insert(key.to_string(), Value::Number(value.into()));
        self
    }

    /// Add a JSON-only field
    pub fn field_value(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    /// Add a text-only line
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    /// Render without printing
    pub fn render(&self) -> String {
        if self.json_mode {
            serde_json::to_string_pretty(&Value::Object(self.fields.clone())).unwrap_or_default()
        } else {
            self.lines.join("\n")
        }
    }

    /// Print the output
    pub fn print(self) {
        println!("{}", self.render());
    }
}
