//! Owned, serializable views of the model graph.
//!
//! Snapshots describe shapes only; inspected values are never included.

use serde::Serialize;

use crate::cache::TypeGraphCache;
use crate::model::{FieldDescriptor, ModelDescriptor, SkippedField};
use crate::tags::Tags;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSnapshot {
    pub models: Vec<ModelSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSnapshot {
    #[serde(rename = "type")]
    pub type_name: String,
    pub depth: usize,
    pub complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete_reason: Option<String>,
    pub fields: Vec<FieldSnapshot>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub kind: &'static str,
    pub flags: Vec<&'static str>,
    #[serde(skip_serializing_if = "Tags::is_empty")]
    pub tags: Tags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSnapshot {
    pub name: String,
    pub reason: String,
}

impl From<&FieldDescriptor> for FieldSnapshot {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            name: field.name().to_string(),
            type_name: field.type_name().to_string(),
            kind: field.ty().kind().as_str(),
            flags: field.flags().names().collect(),
            tags: field.tags().clone(),
            relation: field.relation().map(|relation| relation.key().name().to_string()),
        }
    }
}

impl From<&SkippedField> for SkippedSnapshot {
    fn from(skipped: &SkippedField) -> Self {
        Self {
            name: skipped.name.to_string(),
            reason: skipped.error.to_string(),
        }
    }
}

impl ModelDescriptor {
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            type_name: self.type_name().to_string(),
            depth: self.depth(),
            complete: self.is_complete(),
            incomplete_reason: self.incomplete_reason().map(ToString::to_string),
            fields: self.fields().iter().map(FieldSnapshot::from).collect(),
            skipped: self.skipped_fields().iter().map(SkippedSnapshot::from).collect(),
        }
    }
}

impl TypeGraphCache {
    /// Every cached model, sorted by type name.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            models: self.models().iter().map(|model| model.snapshot()).collect(),
        }
    }
}
