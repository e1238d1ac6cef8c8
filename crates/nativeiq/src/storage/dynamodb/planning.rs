//! Pure functions for calculating provisioning plans (Functional Core).

use super::table::TableConfig;

/// Represents the current state of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableState {
    pub status: TableStatus,
    pub key_schema: Vec<KeyElement>,
}

/// Table status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    Archiving,
    Archived,
    InaccessibleEncryptionCredentials,
    /// A status this crate does not know, or none at all.
    Unknown,
}

impl TableStatus {
    /// Whether a table in this status becomes active without intervention.
    pub fn settles_to_active(self) -> bool {
        matches!(self, Self::Active | Self::Creating | Self::Updating)
    }
}

impl std::fmt::Display for TableStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Creating => write!(f, "CREATING"),
            Self::Updating => write!(f, "UPDATING"),
            Self::Deleting => write!(f, "DELETING"),
            Self::Archiving => write!(f, "ARCHIVING"),
            Self::Archived => write!(f, "ARCHIVED"),
            Self::InaccessibleEncryptionCredentials => {
                write!(f, "INACCESSIBLE_ENCRYPTION_CREDENTIALS")
            }
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// One element of a table's primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyElement {
    pub name: String,
    pub role: KeyRole,
}

/// Role of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyRole {
    Hash,
    Range,
}

impl std::fmt::Display for KeyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash => write!(f, "HASH"),
            Self::Range => write!(f, "RANGE"),
        }
    }
}

/// What provisioning has to do to reach a usable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionPlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { config: TableConfig },
    /// Table exists with the expected key schema but is not active yet.
    WaitForActive { table_name: String },
    /// Table exists, is active and has the expected key schema.
    Ready { table_name: String },
    /// Table exists with a different key schema.
    SchemaMismatch {
        table_name: String,
        expected: Vec<KeyElement>,
        found: Vec<KeyElement>,
    },
    /// Table exists in a status it will not leave on its own (being
    /// deleted, archived, or locked out of its encryption key).
    TableUnusable {
        table_name: String,
        status: TableStatus,
    },
}

/// The key schema a table built from `config` has.
pub fn expected_key_schema(config: &TableConfig) -> Vec<KeyElement> {
    vec![
        KeyElement {
            name: config.partition_key.name.clone(),
            role: KeyRole::Hash,
        },
        KeyElement {
            name: config.sort_key.name.clone(),
            role: KeyRole::Range,
        },
    ]
}

/// Pure function: Calculate what provisioning has to do.
pub fn calculate_provision_plan(
    current: Option<&TableState>,
    desired: &TableConfig,
) -> ProvisionPlan {
    let table_name = desired.table_name.clone();

    let Some(state) = current else {
        return ProvisionPlan::CreateTable {
            config: desired.clone(),
        };
    };

    if !state.status.settles_to_active() {
        return ProvisionPlan::TableUnusable {
            table_name,
            status: state.status,
        };
    }

    let expected = expected_key_schema(desired);
    if !same_key_schema(&expected, &state.key_schema) {
        return ProvisionPlan::SchemaMismatch {
            table_name,
            expected,
            found: state.key_schema.clone(),
        };
    }

    match state.status {
        TableStatus::Active => ProvisionPlan::Ready { table_name },
        _ => ProvisionPlan::WaitForActive { table_name },
    }
}

/// DescribeTable does not guarantee key element order.
fn same_key_schema(expected: &[KeyElement], found: &[KeyElement]) -> bool {
    expected.len() == found.len() && expected.iter().all(|e| found.contains(e))
}

/// Pure function: Format a key schema as `name (ROLE), ...`.
pub fn format_key_schema(schema: &[KeyElement]) -> String {
    if schema.is_empty() {
        return "(none)".to_string();
    }
    schema
        .iter()
        .map(|k| format!("{} ({})", k.name, k.role))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pure function: Format a provision plan for display.
pub fn format_provision_plan(plan: &ProvisionPlan) -> Vec<String> {
    match plan {
        ProvisionPlan::CreateTable { config } => {
            let mut lines = vec![
                format!("+ Create table: {}", config.table_name),
                format!(
                    "  Partition key: {} ({})",
                    config.partition_key.name,
                    config.partition_key.attribute_type.code()
                ),
                format!(
                    "  Sort key: {} ({})",
                    config.sort_key.name,
                    config.sort_key.attribute_type.code()
                ),
                format!("  Billing: {}", config.billing_mode),
            ];
            for (key, value) in &config.tags {
                lines.push(format!("  Tag: {}={}", key, value));
            }
            lines
        }
        ProvisionPlan::WaitForActive { table_name } => {
            vec![format!("~ Table '{}' exists, waiting for ACTIVE", table_name)]
        }
        ProvisionPlan::Ready { table_name } => {
            vec![format!("= Table '{}' is ready", table_name)]
        }
        ProvisionPlan::SchemaMismatch {
            table_name,
            expected,
            found,
        } => vec![
            format!("! Table '{}' has an incompatible key schema", table_name),
            format!("  Expected: {}", format_key_schema(expected)),
            format!("  Found:    {}", format_key_schema(found)),
        ],
        ProvisionPlan::TableUnusable { table_name, status } => {
            vec![format!("! Table '{}' is {} and cannot be used", table_name, status)]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::dynamodb::table::session_table_config;

    fn config() -> TableConfig {
        session_table_config("native_iq_sessions", "Development")
    }

    fn session_schema() -> Vec<KeyElement> {
        expected_key_schema(&config())
    }

    fn state(status: TableStatus, key_schema: Vec<KeyElement>) -> TableState {
        TableState { status, key_schema }
    }

    #[test]
    fn test_missing_table_is_created() {
        let plan = calculate_provision_plan(None, &config());
        assert_eq!(plan, ProvisionPlan::CreateTable { config: config() });
    }

    #[test]
    fn test_active_table_with_matching_schema_is_ready() {
        let current = state(TableStatus::Active, session_schema());
        let plan = calculate_provision_plan(Some(&current), &config());
        assert_eq!(
            plan,
            ProvisionPlan::Ready {
                table_name: "native_iq_sessions".to_string()
            }
        );
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let mut reversed = session_schema();
        reversed.reverse();
        let current = state(TableStatus::Active, reversed);

        assert!(matches!(
            calculate_provision_plan(Some(&current), &config()),
            ProvisionPlan::Ready { .. }
        ));
    }

    #[test]
    fn test_creating_table_is_awaited() {
        let current = state(TableStatus::Creating, session_schema());
        assert!(matches!(
            calculate_provision_plan(Some(&current), &config()),
            ProvisionPlan::WaitForActive { .. }
        ));
    }

    #[test]
    fn test_partition_only_table_is_a_mismatch() {
        let found = vec![KeyElement {
            name: "user_id".to_string(),
            role: KeyRole::Hash,
        }];
        let current = state(TableStatus::Active, found.clone());

        let plan = calculate_provision_plan(Some(&current), &config());

        assert_eq!(
            plan,
            ProvisionPlan::SchemaMismatch {
                table_name: "native_iq_sessions".to_string(),
                expected: session_schema(),
                found,
            }
        );
    }

    #[test]
    fn test_swapped_roles_are_a_mismatch() {
        let found = vec![
            KeyElement {
                name: "session_id".to_string(),
                role: KeyRole::Hash,
            },
            KeyElement {
                name: "user_id".to_string(),
                role: KeyRole::Range,
            },
        ];
        let current = state(TableStatus::Active, found);

        assert!(matches!(
            calculate_provision_plan(Some(&current), &config()),
            ProvisionPlan::SchemaMismatch { .. }
        ));
    }

    #[test]
    fn test_deleting_table_is_reported() {
        let current = state(TableStatus::Deleting, session_schema());
        assert_eq!(
            calculate_provision_plan(Some(&current), &config()),
            ProvisionPlan::TableUnusable {
                table_name: "native_iq_sessions".to_string(),
                status: TableStatus::Deleting,
            }
        );
    }

    #[test]
    fn test_statuses_that_never_settle_are_unusable() {
        for status in [
            TableStatus::Archiving,
            TableStatus::Archived,
            TableStatus::InaccessibleEncryptionCredentials,
            TableStatus::Unknown,
        ] {
            let current = state(status, session_schema());
            assert!(
                matches!(
                    calculate_provision_plan(Some(&current), &config()),
                    ProvisionPlan::TableUnusable { status: s, .. } if s == status
                ),
                "{status} should be unusable"
            );
        }
    }

    #[test]
    fn test_updating_table_is_awaited() {
        let current = state(TableStatus::Updating, session_schema());
        assert!(matches!(
            calculate_provision_plan(Some(&current), &config()),
            ProvisionPlan::WaitForActive { .. }
        ));
    }

    #[test]
    fn test_format_unusable_plan() {
        let lines = format_provision_plan(&ProvisionPlan::TableUnusable {
            table_name: "native_iq_sessions".to_string(),
            status: TableStatus::InaccessibleEncryptionCredentials,
        });
        assert_eq!(
            lines,
            vec![
                "! Table 'native_iq_sessions' is INACCESSIBLE_ENCRYPTION_CREDENTIALS and cannot be used"
            ]
        );
    }

    #[test]
    fn test_format_create_plan() {
        let lines = format_provision_plan(&ProvisionPlan::CreateTable { config: config() });

        assert_eq!(lines[0], "+ Create table: native_iq_sessions");
        assert_eq!(lines[1], "  Partition key: user_id (S)");
        assert_eq!(lines[2], "  Sort key: session_id (S)");
        assert_eq!(lines[3], "  Billing: PAY_PER_REQUEST");
        assert!(lines.contains(&"  Tag: Project=Native-IQ".to_string()));
    }

    #[test]
    fn test_format_key_schema() {
        assert_eq!(
            format_key_schema(&session_schema()),
            "user_id (HASH), session_id (RANGE)"
        );
        assert_eq!(format_key_schema(&[]), "(none)");
    }
}
