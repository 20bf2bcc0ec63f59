use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A non-fatal problem found while decoding schema rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,

    /// Human-readable description
    pub message: String,

    /// Optional: the raw field the problem was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Optional: qualified name of the table being decoded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// The row set does not have the shape its layout implies.
    StructuralWarning,
    /// An encoded sub-field could not be decoded and was treated as absent.
    MalformedMetadata,
}

impl Diagnostic {
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::StructuralWarning,
            message: message.into(),
            field: None,
            table: None,
        }
    }

    pub fn malformed(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::MalformedMetadata,
            message: message.into(),
            field: Some(field.into()),
            table: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StructuralWarning => write!(f, "structural warning"),
            Self::MalformedMetadata => write!(f, "malformed metadata"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(table) = &self.table {
            write!(f, " in {table}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " ({field})")?;
        }
        write!(f, ": {}", self.message)
    }
}
