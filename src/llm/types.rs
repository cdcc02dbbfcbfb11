use serde_json::{Map, Value, json};

/// One structured-output generation: a prompt plus the JSON shape the model must return.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub prompt: String,
    pub schema: OutputSchema,
    pub temperature: Option<f32>,
}

/// A flat JSON object whose properties are all required strings.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub fields: Vec<SchemaField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub description: Option<String>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Gemini `responseSchema` (OpenAPI subset, upper-case type names).
    pub fn to_gemini_schema(&self) -> Value {
        let properties = self.properties("STRING");
        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": self.field_names(),
            "propertyOrdering": self.field_names(),
        })
    }

    /// Standard JSON Schema, strict-mode compatible.
    pub fn to_json_schema(&self) -> Value {
        let properties = self.properties("string");
        json!({
            "type": "object",
            "properties": properties,
            "required": self.field_names(),
            "additionalProperties": false,
        })
    }

    fn properties(&self, string_type: &str) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|field| {
                let mut property = Map::new();
                property.insert("type".to_string(), json!(string_type));
                if let Some(description) = &field.description {
                    property.insert("description".to_string(), json!(description));
                }
                (field.name.clone(), Value::Object(property))
            })
            .collect()
    }
}
