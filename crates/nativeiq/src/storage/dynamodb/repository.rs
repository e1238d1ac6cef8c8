//! DynamoDB repository implementation.
//!
//! Implements `SessionRepository` from `nativeiq_core::storage` using DynamoDB.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::BuildError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode as SdkBillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus as SdkTableStatus, Tag,
};
use aws_sdk_dynamodb::Client;
use chrono::Utc;

use nativeiq_core::session::{number, timestamp, SessionData, SessionKey, SessionRecord};
use nativeiq_core::storage::{
    ProvisionError, ProvisionOutcome, Result, SessionRepository, StorageError, UnavailableKind,
};

use super::conversions::{
    item_to_record, key_attributes, session_data_to_attribute, CREATED_AT, SESSION_DATA,
    UPDATED_AT, UPSERT_EXPRESSION, USER_ID,
};
use super::error::map_sdk_error;
use super::planning::{
    calculate_provision_plan, format_key_schema, KeyElement, KeyRole, ProvisionPlan, TableState,
    TableStatus,
};
use super::table::{session_table_config, AttributeType, BillingMode, TableConfig};
use crate::config::Config;

/// How often DescribeTable is polled while waiting for the table.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// DynamoDB-based session store.
#[derive(Debug, Clone)]
pub struct DynamoDbSessionStore {
    client: Client,
    table: TableConfig,
}

impl DynamoDbSessionStore {
    /// Creates a new store with the given DynamoDB client and table schema.
    pub fn new(client: Client, table: TableConfig) -> Self {
        Self { client, table }
    }

    /// Creates a new store from configuration.
    ///
    /// Uses the AWS SDK default credential chain, the configured region and,
    /// when set, the custom endpoint (e.g. a local DynamoDB).
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(
            Client::new(&sdk_config),
            session_table_config(&config.table_name, &config.environment),
        )
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table.table_name
    }

    /// Get the table schema this store provisions.
    pub fn table_config(&self) -> &TableConfig {
        &self.table
    }

    /// Fetches current table state, returns None if the table doesn't exist.
    pub async fn describe_table_state(&self) -> Result<Option<TableState>> {
        let response = match self
            .client
            .describe_table()
            .table_name(self.table_name())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                return Ok(None)
            }
            Err(err) => return Err(map_sdk_error(err, "describe_table")),
        };

        let Some(table) = response.table() else {
            return Err(StorageError::InvalidData(
                "DescribeTable returned no table description".to_string(),
            ));
        };

        let status = table_status(table.table_status());

        let key_schema = table
            .key_schema()
            .iter()
            .map(|k| KeyElement {
                name: k.attribute_name().to_string(),
                role: match k.key_type() {
                    KeyType::Hash => KeyRole::Hash,
                    _ => KeyRole::Range,
                },
            })
            .collect();

        Ok(Some(TableState { status, key_schema }))
    }

    /// Describes the table and calculates what `provision` would do.
    pub async fn plan_provision(&self) -> Result<ProvisionPlan> {
        let current = self.describe_table_state().await?;
        Ok(calculate_provision_plan(current.as_ref(), &self.table))
    }

    async fn create_table(&self, config: &TableConfig) -> Result<ProvisionOutcome> {
        let key_schema = vec![
            KeySchemaElement::builder()
                .attribute_name(&config.partition_key.name)
                .key_type(KeyType::Hash)
                .build()
                .map_err(build_error)?,
            KeySchemaElement::builder()
                .attribute_name(&config.sort_key.name)
                .key_type(KeyType::Range)
                .build()
                .map_err(build_error)?,
        ];

        let attribute_definitions = vec![
            AttributeDefinition::builder()
                .attribute_name(&config.partition_key.name)
                .attribute_type(to_scalar_type(config.partition_key.attribute_type))
                .build()
                .map_err(build_error)?,
            AttributeDefinition::builder()
                .attribute_name(&config.sort_key.name)
                .attribute_type(to_scalar_type(config.sort_key.attribute_type))
                .build()
                .map_err(build_error)?,
        ];

        let tags = config
            .tags
            .iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(build_error)?;

        let result = self
            .client
            .create_table()
            .table_name(&config.table_name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .billing_mode(to_billing_mode(config.billing_mode))
            .set_tags(Some(tags))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::info!(table = %config.table_name, "session table created");
                Ok(ProvisionOutcome::Created)
            }
            // Someone else created it between describe and create.
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_in_use_exception()) =>
            {
                tracing::info!(table = %config.table_name, "session table already exists");
                Ok(ProvisionOutcome::AlreadyExists)
            }
            Err(err) => Err(map_sdk_error(err, "create_table")),
        }
    }

    /// Polls DescribeTable until the table is active with the expected key
    /// schema, or `max_wait` elapses.
    async fn wait_until_active(&self, max_wait: Duration) -> std::result::Result<(), ProvisionError> {
        poll_until_ready(self.table_name(), max_wait, POLL_INTERVAL, || async {
            match self.plan_provision().await {
                Ok(plan) => readiness(plan),
                Err(err) => Err(err.into()),
            }
        })
        .await
    }
}

fn table_status(status: Option<&SdkTableStatus>) -> TableStatus {
    match status {
        Some(SdkTableStatus::Active) => TableStatus::Active,
        Some(SdkTableStatus::Creating) => TableStatus::Creating,
        Some(SdkTableStatus::Updating) => TableStatus::Updating,
        Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
        Some(SdkTableStatus::Archiving) => TableStatus::Archiving,
        Some(SdkTableStatus::Archived) => TableStatus::Archived,
        Some(SdkTableStatus::InaccessibleEncryptionCredentials) => {
            TableStatus::InaccessibleEncryptionCredentials
        }
        _ => TableStatus::Unknown,
    }
}

fn build_error(err: BuildError) -> StorageError {
    StorageError::InvalidData(format!("Invalid table definition: {}", err))
}

fn to_scalar_type(attr_type: AttributeType) -> ScalarAttributeType {
    match attr_type {
        AttributeType::String => ScalarAttributeType::S,
    }
}

fn to_billing_mode(mode: BillingMode) -> SdkBillingMode {
    match mode {
        BillingMode::PayPerRequest => SdkBillingMode::PayPerRequest,
    }
}

/// Whether a freshly calculated plan means the table is usable.
///
/// `CreateTable` while waiting means DescribeTable has not caught up with
/// the create yet.
fn readiness(plan: ProvisionPlan) -> std::result::Result<bool, ProvisionError> {
    match plan {
        ProvisionPlan::Ready { .. } => Ok(true),
        ProvisionPlan::WaitForActive { .. } | ProvisionPlan::CreateTable { .. } => Ok(false),
        ProvisionPlan::SchemaMismatch {
            table_name,
            expected,
            found,
        } => Err(ProvisionError::SchemaMismatch {
            table_name,
            expected: format_key_schema(&expected),
            found: format_key_schema(&found),
        }),
        ProvisionPlan::TableUnusable { status, .. } => {
            let kind = match status {
                TableStatus::Deleting => UnavailableKind::MissingTable,
                _ => UnavailableKind::Service,
            };
            Err(StorageError::unavailable(kind, "provision", format!("table is {status}")).into())
        }
    }
}

/// Runs `check` until it reports ready, sleeping `interval` between checks.
///
/// The last check happens no later than `max_wait` after the first one.
async fn poll_until_ready<F, Fut>(
    table_name: &str,
    max_wait: Duration,
    interval: Duration,
    mut check: F,
) -> std::result::Result<(), ProvisionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<bool, ProvisionError>>,
{
    let deadline = tokio::time::Instant::now() + max_wait;

    loop {
        if check().await? {
            return Ok(());
        }

        let now = tokio::time::Instant::now();
        if now >= deadline {
            return Err(ProvisionError::Timeout {
                table_name: table_name.to_string(),
                waited: max_wait,
            });
        }

        tracing::debug!(table = table_name, "waiting for table to become active");
        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}

#[async_trait]
impl SessionRepository for DynamoDbSessionStore {
    async fn put(&self, key: &SessionKey, mut session_data: SessionData) -> Result<()> {
        number::normalize(&mut session_data);
        let now = timestamp::format(&Utc::now());

        self.client
            .update_item()
            .table_name(self.table_name())
            .set_key(Some(key_attributes(key)))
            .update_expression(UPSERT_EXPRESSION)
            .expression_attribute_names("#data", SESSION_DATA)
            .expression_attribute_names("#updated", UPDATED_AT)
            .expression_attribute_names("#created", CREATED_AT)
            .expression_attribute_values(":data", session_data_to_attribute(&session_data))
            .expression_attribute_values(":now", AttributeValue::S(now))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, "put"))?;

        tracing::debug!(%key, "session stored");
        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<SessionRecord>> {
        let result = self
            .client
            .get_item()
            .table_name(self.table_name())
            .set_key(Some(key_attributes(key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| map_sdk_error(e, "get"))?;

        match result.item {
            Some(item) => Ok(Some(item_to_record(&item)?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &SessionKey) -> Result<()> {
        self.client
            .delete_item()
            .table_name(self.table_name())
            .set_key(Some(key_attributes(key)))
            .send()
            .await
            .map_err(|e| map_sdk_error(e, "delete"))?;

        tracing::debug!(%key, "session deleted");
        Ok(())
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<SessionRecord>> {
        let mut records = Vec::new();
        let mut start_key = None;

        loop {
            let result = self
                .client
                .query()
                .table_name(self.table_name())
                .key_condition_expression("#uid = :uid")
                .expression_attribute_names("#uid", USER_ID)
                .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()))
                .consistent_read(true)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| map_sdk_error(e, "list_for_user"))?;

            for item in result.items() {
                records.push(item_to_record(item)?);
            }

            match result.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        Ok(records)
    }

    async fn provision(
        &self,
        max_wait: Duration,
    ) -> std::result::Result<ProvisionOutcome, ProvisionError> {
        let plan = self.plan_provision().await?;
        tracing::info!(table = %self.table_name(), ?plan, "provisioning session table");

        let outcome = match plan {
            ProvisionPlan::CreateTable { config } => self.create_table(&config).await?,
            ProvisionPlan::Ready { .. } => return Ok(ProvisionOutcome::AlreadyExists),
            other => {
                readiness(other)?;
                ProvisionOutcome::AlreadyExists
            }
        };

        self.wait_until_active(max_wait).await?;
        tracing::info!(table = %self.table_name(), ?outcome, "session table ready");
        Ok(outcome)
    }
}
