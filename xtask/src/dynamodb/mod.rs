//! DynamoDB session table commands.

mod error;
mod smoke;

pub use error::{DynamodbError, Result};

use crate::prelude::*;
use dialoguer::Confirm;
use nativeiq::storage::dynamodb::planning::{format_provision_plan, ProvisionPlan};
use nativeiq::storage::DynamoDbSessionStore;
use nativeiq::Config;
use nativeiq_core::storage::{ProvisionOutcome, SessionRepository};

/// DynamoDB session table commands.
#[derive(Debug, clap::Parser)]
pub struct DynamodbCommand {
    #[command(subcommand)]
    pub action: DynamodbAction,
}

/// Available DynamoDB actions.
#[derive(Debug, clap::Subcommand)]
pub enum DynamodbAction {
    /// Create the session table if needed and wait until it is active.
    Provision(ProvisionCommand),

    /// Write, read back and delete a test session.
    SmokeTest(SmokeTestCommand),
}

/// Create the session table if needed.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Create the Native IQ session table if needed.

The table is keyed by user_id (partition) and session_id (sort) and billed
per request. An existing table with the same key schema counts as ready; an
existing table with a different key schema is reported as an error.

The command shows a plan before applying and asks for confirmation.

Environment variables:
  AWS_ENDPOINT_URL       - Use local DynamoDB (e.g., http://localhost:8000)
  AWS_REGION             - AWS region (defaults to us-east-1)
  AWS_PROFILE            - AWS profile to use for credentials
  NATIVE_IQ_ENVIRONMENT  - Value of the Environment tag (defaults to Development)
  PROVISION_MAX_WAIT_SECONDS - Activation wait when --max-wait is not given (defaults to 120)")]
pub struct ProvisionCommand {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,

    /// Table name to use.
    #[arg(long, env = "DYNAMODB_TABLE_NAME", default_value = "native_iq_sessions")]
    pub table_name: String,

    /// Seconds to wait for the table to become active.
    #[arg(long)]
    pub max_wait: Option<u64>,
}

/// Write, read back and delete a test session.
#[derive(Debug, clap::Parser)]
#[command(long_about = "Verify the session table end to end.

Writes the session test_user_123/test_session_456, reads it back, deletes it
and checks it is gone. The table must already exist.")]
pub struct SmokeTestCommand {
    /// Table name to use.
    #[arg(long, env = "DYNAMODB_TABLE_NAME", default_value = "native_iq_sessions")]
    pub table_name: String,
}

/// Main entry point for dynamodb command.
pub async fn run(command: DynamodbCommand, global: crate::Global) -> Result<()> {
    match command.action {
        DynamodbAction::Provision(cmd) => run_provision(cmd, &global).await,
        DynamodbAction::SmokeTest(cmd) => run_smoke_test(cmd, &global).await,
    }
}

/// Environment configuration with the command line overrides applied.
fn load_config(table_name: String, max_wait: Option<u64>) -> Config {
    let mut config = Config {
        table_name,
        ..Config::from_env()
    };
    if let Some(seconds) = max_wait {
        config.provision_max_wait_seconds = seconds;
    }
    config
}

async fn connect(config: Config) -> (Config, DynamoDbSessionStore) {
    let store = DynamoDbSessionStore::from_config(&config).await;
    (config, store)
}

async fn run_provision(cmd: ProvisionCommand, global: &crate::Global) -> Result<()> {
    let (config, store) = connect(load_config(cmd.table_name, cmd.max_wait)).await;

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), config.target_display());
        aprintln!();
    }

    let plan = store.plan_provision().await?;

    if !global.is_silent() {
        aprintln!("{}", p_c("Provision Plan:"));
        for line in format_provision_plan(&plan) {
            if line.starts_with('+') {
                aprintln!("  {}", p_g(&line));
            } else if line.starts_with('!') {
                aprintln!("  {}", p_r(&line));
            } else if line.starts_with('~') {
                aprintln!("  {}", p_y(&line));
            } else {
                aprintln!("  {}", line);
            }
        }
        aprintln!();
    }

    if matches!(plan, ProvisionPlan::Ready { .. }) {
        if !global.is_silent() {
            aprintln!("{}", p_g("Session table is ready."));
        }
        return Ok(());
    }

    if matches!(plan, ProvisionPlan::CreateTable { .. }) && !cmd.force {
        let confirmed = Confirm::new()
            .with_prompt("Create this table?")
            .default(true)
            .interact()
            .map_err(|e| DynamodbError::Prompt(e.to_string()))?;

        if !confirmed {
            return Err(DynamodbError::UserCancelled);
        }
    }

    if !global.is_silent() {
        aprintln!(
            "{}",
            p_b(&format!(
                "Provisioning (waiting up to {}s)...",
                config.provision_max_wait_seconds
            ))
        );
    }

    let outcome = store.provision(config.provision_max_wait()).await?;

    if !global.is_silent() {
        match outcome {
            ProvisionOutcome::Created => aprintln!("{}", p_g("Session table created.")),
            ProvisionOutcome::AlreadyExists => {
                aprintln!("{}", p_g("Session table already existed and is ready."))
            }
        }
    }

    Ok(())
}

async fn run_smoke_test(cmd: SmokeTestCommand, global: &crate::Global) -> Result<()> {
    let (config, store) = connect(load_config(cmd.table_name, None)).await;

    if !global.is_silent() {
        aprintln!("{} {}", p_b("Target:"), config.target_display());
        aprintln!("{} {}", p_b("Table:"), config.table_name);
        aprintln!();
    }

    if store.describe_table_state().await?.is_none() {
        return Err(DynamodbError::TableNotFound {
            table_name: config.table_name,
        });
    }

    let steps = smoke::run_smoke_test(&store, chrono::Utc::now()).await?;

    if !global.is_silent() {
        for step in &steps {
            aprintln!("  {} {}", p_g(&format!("{:<7}", step.name)), step.detail);
        }
        aprintln!();
        aprintln!("{}", p_g("Smoke test passed."));
    }

    Ok(())
}
