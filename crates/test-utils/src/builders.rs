#![allow(dead_code)]

use serde_json::Value;
use taskbridge::types::Document;

/// Builder for JSON documents (`config`, `params`, `state`).
#[derive(Debug, Default, Clone)]
pub struct DocumentBuilder {
    doc: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.doc.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Document {
        self.doc
    }
}

/// Builder for step configurations.
#[derive(Debug, Default, Clone)]
pub struct StepConfigBuilder {
    doc: DocumentBuilder,
}

impl StepConfigBuilder {
    /// Step running a literal script.
    pub fn script(script: &str) -> Self {
        Self {
            doc: DocumentBuilder::new().with("script", script),
        }
    }

    /// Step running `command = "pkg.Class"`.
    pub fn command(reference: &str) -> Self {
        Self {
            doc: DocumentBuilder::new().with("command", reference),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.doc = self.doc.with(key, value);
        self
    }

    pub fn build(self) -> Document {
        self.doc.build()
    }
}

/// Turn a `json!` object literal into a [`Document`].
pub fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
