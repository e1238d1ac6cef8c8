//! Session table schema (pure data).

use super::conversions::{SESSION_ID, USER_ID};

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: KeyAttribute,
    pub billing_mode: BillingMode,
    pub tags: Vec<(String, String)>,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

/// DynamoDB attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

impl AttributeType {
    /// Short DynamoDB type name.
    pub fn code(self) -> &'static str {
        match self {
            Self::String => "S",
        }
    }
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

impl std::fmt::Display for BillingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PayPerRequest => write!(f, "PAY_PER_REQUEST"),
        }
    }
}

/// Returns the session table configuration.
/// This is a pure function - no I/O.
pub fn session_table_config(table_name: &str, environment: &str) -> TableConfig {
    TableConfig {
        table_name: table_name.to_string(),
        partition_key: KeyAttribute {
            name: USER_ID.to_string(),
            attribute_type: AttributeType::String,
        },
        sort_key: KeyAttribute {
            name: SESSION_ID.to_string(),
            attribute_type: AttributeType::String,
        },
        billing_mode: BillingMode::PayPerRequest,
        tags: vec![
            ("Project".to_string(), "Native-IQ".to_string()),
            ("Environment".to_string(), environment.to_string()),
        ],
    }
}
