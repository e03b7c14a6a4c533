//! Test Data Builders
//!
//! Builders for raw claim payloads. Tests set only the wire fields they care
//! about; everything else is simply absent, which is the normal case for the
//! claims backend.

use serde_json::{json, Map, Value};

use domain_claims::FilePayload;

/// Builder for a raw claim object
#[derive(Debug, Clone, Default)]
pub struct RawClaimBuilder {
    fields: Map<String, Value>,
}

impl RawClaimBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from a claim with the given identifier
    pub fn with_id(id: impl Into<Value>) -> Self {
        Self::new().field("id", id)
    }

    /// Sets any wire field
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Sets a wire field to JSON null
    pub fn null(mut self, name: &str) -> Self {
        self.fields.insert(name.to_string(), Value::Null);
        self
    }

    pub fn claim_number(self, number: &str) -> Self {
        self.field("claim_number", number)
    }

    /// Sets the current-backend policyholder name
    pub fn policyholder(self, name: &str) -> Self {
        self.field("policyholder_name", name)
    }

    /// Sets the legacy insured name
    pub fn insured(self, name: &str) -> Self {
        self.field("insured_name", name)
    }

    pub fn status(self, status: &str) -> Self {
        self.field("claim_status", status)
    }

    pub fn estimated_loss(self, amount: impl Into<Value>) -> Self {
        self.field("estimated_loss_amount", amount)
    }

    /// Appends an activity entry
    pub fn activity(mut self, id: u64, description: &str, created_at: Option<&str>) -> Self {
        let entry = json!({"id": id, "description": description, "created_at": created_at});
        match self.fields.get_mut("activities") {
            Some(Value::Array(entries)) => entries.push(entry),
            _ => {
                self.fields
                    .insert("activities".to_string(), Value::Array(vec![entry]));
            }
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Builder for an upload selection
#[derive(Debug, Clone, Default)]
pub struct SelectionBuilder {
    files: Vec<FilePayload>,
}

impl SelectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a small text file
    pub fn file(mut self, name: &str) -> Self {
        self.files.push(
            FilePayload::new(name, format!("contents of {}", name).into_bytes())
                .with_content_type("text/plain"),
        );
        self
    }

    /// Adds `count` files named `photo-<n>.jpg`
    pub fn photos(mut self, count: usize) -> Self {
        for n in 1..=count {
            self.files.push(
                FilePayload::new(format!("photo-{}.jpg", n), vec![0xFF, 0xD8, n as u8])
                    .with_content_type("image/jpeg"),
            );
        }
        self
    }

    pub fn build(self) -> Vec<FilePayload> {
        self.files
    }
}
