pub mod config;
pub mod recommend;
pub mod score_detail;
pub mod set_type;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDateTime;
use mealtable_app::{
    Clock, FixedClock, RecommendationApplicationService, RecommendationRepositories, SystemClock,
};
use mealtable_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use mealtable_core::errors::{ApplicationError, InterfaceError};
use mealtable_db::{FixtureDataset, InMemoryRepositories, SeedSummary};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    correlation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>, data: Option<Value>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            correlation_id: None,
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Maps an application failure through the interface error layer.
    pub fn from_application_error(command: &str, error: ApplicationError) -> Self {
        let correlation_id = format!("cli-{command}-{}", std::process::id());
        let interface = error.into_interface(correlation_id);
        let (error_class, exit_code) = match &interface {
            InterfaceError::BadRequest { .. } => ("bad_request", 2),
            InterfaceError::NotFound { .. } => ("not_found", 3),
            InterfaceError::ServiceUnavailable { .. } => ("service_unavailable", 4),
            InterfaceError::Internal { .. } => ("internal", 5),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: format!("{} ({interface})", interface.user_message()),
            correlation_id: Some(interface.correlation_id().to_string()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn to_data<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Settings shared by every command that talks to the recommendation service.
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub overrides: ConfigOverrides,
    /// Pins the service clock instead of reading local time.
    pub at: Option<NaiveDateTime>,
}

impl RuntimeOptions {
    pub fn load_config(&self) -> Result<AppConfig, mealtable_core::config::ConfigError> {
        AppConfig::load(LoadOptions {
            config_path: self.config_path.clone(),
            require_file: self.config_path.is_some(),
            overrides: self.overrides.clone(),
        })
    }

    fn clock(&self) -> Arc<dyn Clock> {
        match self.at {
            Some(at) => Arc::new(FixedClock(at)),
            None => Arc::new(SystemClock),
        }
    }
}

/// Loaded configuration plus a service backed by freshly seeded repositories.
pub struct ServiceRuntime {
    pub config: AppConfig,
    pub service: RecommendationApplicationService,
    pub seeded: SeedSummary,
    runtime: tokio::runtime::Runtime,
}

impl ServiceRuntime {
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

/// Runs the bootstrap sequence, returning a ready-made failure for the first stage that breaks.
pub(crate) fn bootstrap(command: &str, options: &RuntimeOptions) -> Result<ServiceRuntime, CommandResult> {
    let config = options.load_config().map_err(|error| {
        CommandResult::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    })?;
    crate::init_logging(&config.logging);

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })?;

    let repositories = Arc::new(InMemoryRepositories::default());
    let seeded = runtime
        .block_on(seed_repositories(&config, &repositories))
        .map_err(|error| CommandResult::failure(command, "fixture_load", format!("{error:#}"), 4))?;

    let service = RecommendationApplicationService::new(
        RecommendationRepositories::in_memory(repositories),
        &config,
        options.clock(),
    );
    Ok(ServiceRuntime { config, service, seeded, runtime })
}

async fn seed_repositories(
    config: &AppConfig,
    repositories: &InMemoryRepositories,
) -> anyhow::Result<SeedSummary> {
    let dataset = match &config.data.fixture_path {
        Some(path) => FixtureDataset::load(path)
            .with_context(|| format!("failed to load fixture dataset `{}`", path.display()))?,
        None => FixtureDataset::sample().context("failed to decode bundled sample dataset")?,
    };
    let summary = dataset.seed(repositories).await.context("failed to seed repositories")?;

    let source = match &config.data.fixture_path {
        Some(path) => path.display().to_string(),
        None => "bundled".to_string(),
    };
    info!(
        event_name = "cli.repositories.seeded",
        stores = summary.stores,
        members = summary.members,
        source = source.as_str(),
        "repositories seeded"
    );
    Ok(summary)
}
