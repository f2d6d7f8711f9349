use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSchema {
    pub fn string(title: &str) -> Self {
        FieldSchema {
            field_type: "string".into(),
            title: title.into(),
            format: None,
            options: None,
            default: None,
        }
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(Value::String(default.into()));
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FormSchema {
    #[serde(default)]
    pub properties: BTreeMap<String, FieldSchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// Field as submitted by the add-field dialog.
#[derive(Debug, Clone, Deserialize)]
pub struct NewField {
    pub name: String,
    pub title: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default, rename = "enum")]
    pub options: Option<Vec<String>>,
}

fn default_field_type() -> String {
    "string".into()
}

#[derive(Debug, Deserialize)]
pub struct AddFieldRequest {
    pub field: NewField,
}
