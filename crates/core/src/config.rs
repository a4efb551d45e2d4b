use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::recommendation::ScoringParameters;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AppConfig {
    pub scoring: ScoringConfig,
    pub recommendation: RecommendationConfig,
    pub data: DataConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoringConfig {
    pub decay_per_day: f64,
    pub cold_start_min_records: u32,
    pub default_reference_budget: u32,
    pub history_window_days: u32,
    pub freshness_window_days: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationConfig {
    pub default_radius_km: f64,
    pub min_radius_km: f64,
    pub max_radius_km: f64,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Score candidate sets on scoped worker threads.
    pub parallel_scoring: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataConfig {
    /// JSON dataset seeding the in-memory repositories.
    pub fixture_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub fixture_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub default_radius_km: Option<f64>,
    pub parallel_scoring: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let parameters = ScoringParameters::default();
        Self {
            scoring: ScoringConfig {
                decay_per_day: parameters.decay_per_day,
                cold_start_min_records: parameters.cold_start_min_records as u32,
                default_reference_budget: parameters.default_reference_budget,
                history_window_days: parameters.history_window_days as u32,
                freshness_window_days: parameters.freshness_window_days as u32,
            },
            recommendation: RecommendationConfig {
                default_radius_km: 0.5,
                min_radius_km: 0.1,
                max_radius_km: 10.0,
                default_page_size: 20,
                max_page_size: 100,
                parallel_scoring: false,
            },
            data: DataConfig { fixture_path: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl ScoringConfig {
    pub fn parameters(&self) -> ScoringParameters {
        ScoringParameters {
            decay_per_day: self.decay_per_day,
            cold_start_min_records: self.cold_start_min_records as usize,
            default_reference_budget: self.default_reference_budget,
            history_window_days: i64::from(self.history_window_days),
            freshness_window_days: i64::from(self.freshness_window_days),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("mealtable.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(scoring) = patch.scoring {
            if let Some(decay_per_day) = scoring.decay_per_day {
                self.scoring.decay_per_day = decay_per_day;
            }
            if let Some(cold_start_min_records) = scoring.cold_start_min_records {
                self.scoring.cold_start_min_records = cold_start_min_records;
            }
            if let Some(default_reference_budget) = scoring.default_reference_budget {
                self.scoring.default_reference_budget = default_reference_budget;
            }
            if let Some(history_window_days) = scoring.history_window_days {
                self.scoring.history_window_days = history_window_days;
            }
            if let Some(freshness_window_days) = scoring.freshness_window_days {
                self.scoring.freshness_window_days = freshness_window_days;
            }
        }

        if let Some(recommendation) = patch.recommendation {
            if let Some(default_radius_km) = recommendation.default_radius_km {
                self.recommendation.default_radius_km = default_radius_km;
            }
            if let Some(min_radius_km) = recommendation.min_radius_km {
                self.recommendation.min_radius_km = min_radius_km;
            }
            if let Some(max_radius_km) = recommendation.max_radius_km {
                self.recommendation.max_radius_km = max_radius_km;
            }
            if let Some(default_page_size) = recommendation.default_page_size {
                self.recommendation.default_page_size = default_page_size;
            }
            if let Some(max_page_size) = recommendation.max_page_size {
                self.recommendation.max_page_size = max_page_size;
            }
            if let Some(parallel_scoring) = recommendation.parallel_scoring {
                self.recommendation.parallel_scoring = parallel_scoring;
            }
        }

        if let Some(data) = patch.data {
            if let Some(fixture_path) = data.fixture_path {
                self.data.fixture_path = Some(fixture_path);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let scoring = &mut self.scoring;
        if let Some(value) = env_value::<f64>("MEALTABLE_SCORING_DECAY_PER_DAY")? {
            scoring.decay_per_day = value;
        }
        if let Some(value) = env_value::<u32>("MEALTABLE_SCORING_COLD_START_MIN_RECORDS")? {
            scoring.cold_start_min_records = value;
        }
        if let Some(value) = env_value::<u32>("MEALTABLE_SCORING_DEFAULT_REFERENCE_BUDGET")? {
            scoring.default_reference_budget = value;
        }
        if let Some(value) = env_value::<u32>("MEALTABLE_SCORING_HISTORY_WINDOW_DAYS")? {
            scoring.history_window_days = value;
        }
        if let Some(value) = env_value::<u32>("MEALTABLE_SCORING_FRESHNESS_WINDOW_DAYS")? {
            scoring.freshness_window_days = value;
        }

        let recommendation = &mut self.recommendation;
        if let Some(value) = env_value::<f64>("MEALTABLE_RECOMMENDATION_DEFAULT_RADIUS_KM")? {
            recommendation.default_radius_km = value;
        }
        if let Some(value) = env_value::<f64>("MEALTABLE_RECOMMENDATION_MIN_RADIUS_KM")? {
            recommendation.min_radius_km = value;
        }
        if let Some(value) = env_value::<f64>("MEALTABLE_RECOMMENDATION_MAX_RADIUS_KM")? {
            recommendation.max_radius_km = value;
        }
        if let Some(value) = env_value::<u32>("MEALTABLE_RECOMMENDATION_DEFAULT_PAGE_SIZE")? {
            recommendation.default_page_size = value;
        }
        if let Some(value) = env_value::<u32>("MEALTABLE_RECOMMENDATION_MAX_PAGE_SIZE")? {
            recommendation.max_page_size = value;
        }
        if let Some(value) = env_value::<bool>("MEALTABLE_RECOMMENDATION_PARALLEL_SCORING")? {
            recommendation.parallel_scoring = value;
        }

        if let Some(path) = env_value::<PathBuf>("MEALTABLE_DATA_FIXTURE_PATH")? {
            self.data.fixture_path = Some(path);
        }

        // The LOGGING_* spelling wins over the short aliases.
        let level = match env_value::<String>("MEALTABLE_LOGGING_LEVEL")? {
            Some(level) => Some(level),
            None => env_value::<String>("MEALTABLE_LOG_LEVEL")?,
        };
        if let Some(level) = level {
            self.logging.level = level;
        }
        let format = match env_value::<LogFormat>("MEALTABLE_LOGGING_FORMAT")? {
            Some(format) => Some(format),
            None => env_value::<LogFormat>("MEALTABLE_LOG_FORMAT")?,
        };
        if let Some(format) = format {
            self.logging.format = format;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(fixture_path) = overrides.fixture_path {
            self.data.fixture_path = Some(fixture_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(default_radius_km) = overrides.default_radius_km {
            self.recommendation.default_radius_km = default_radius_km;
        }
        if let Some(parallel_scoring) = overrides.parallel_scoring {
            self.recommendation.parallel_scoring = parallel_scoring;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_scoring(&self.scoring)?;
        validate_recommendation(&self.recommendation)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("mealtable.toml"), PathBuf::from("config/mealtable.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands every `${VAR}` with the value of the environment variable `VAR`.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let (var, tail) =
            rest[start + 2..].split_once('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = tail;
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_scoring(scoring: &ScoringConfig) -> Result<(), ConfigError> {
    if !scoring.decay_per_day.is_finite() || scoring.decay_per_day < 0.0 {
        return Err(ConfigError::Validation(
            "scoring.decay_per_day must be a finite, non-negative rate".to_string(),
        ));
    }

    if scoring.default_reference_budget == 0 {
        return Err(ConfigError::Validation(
            "scoring.default_reference_budget must be greater than zero (KRW)".to_string(),
        ));
    }

    if scoring.history_window_days == 0 || scoring.freshness_window_days == 0 {
        return Err(ConfigError::Validation(
            "scoring.history_window_days and scoring.freshness_window_days must be greater than zero"
                .to_string(),
        ));
    }

    if scoring.freshness_window_days > scoring.history_window_days {
        return Err(ConfigError::Validation(
            "scoring.freshness_window_days cannot exceed scoring.history_window_days".to_string(),
        ));
    }

    Ok(())
}

fn validate_recommendation(recommendation: &RecommendationConfig) -> Result<(), ConfigError> {
    let RecommendationConfig { default_radius_km, min_radius_km, max_radius_km, .. } =
        *recommendation;
    let radius_range_valid = min_radius_km > 0.0 && min_radius_km <= max_radius_km;
    if !radius_range_valid {
        return Err(ConfigError::Validation(
            "recommendation.min_radius_km must be positive and not above max_radius_km".to_string(),
        ));
    }

    if default_radius_km < min_radius_km || default_radius_km > max_radius_km {
        return Err(ConfigError::Validation(format!(
            "recommendation.default_radius_km must be in range {min_radius_km}..={max_radius_km}"
        )));
    }

    if recommendation.max_page_size == 0 {
        return Err(ConfigError::Validation(
            "recommendation.max_page_size must be greater than zero".to_string(),
        ));
    }

    if recommendation.default_page_size == 0
        || recommendation.default_page_size > recommendation.max_page_size
    {
        return Err(ConfigError::Validation(
            "recommendation.default_page_size must be in range 1..=max_page_size".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

/// Parses `key` from the environment. Unset and blank values count as absent.
fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    let Some(raw) = env::var(key).ok().filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    match raw.trim().parse::<T>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(ConfigError::InvalidEnvOverride { key: key.to_string(), value: raw }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    scoring: Option<ScoringPatch>,
    recommendation: Option<RecommendationPatch>,
    data: Option<DataPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    decay_per_day: Option<f64>,
    cold_start_min_records: Option<u32>,
    default_reference_budget: Option<u32>,
    history_window_days: Option<u32>,
    freshness_window_days: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationPatch {
    default_radius_km: Option<f64>,
    min_radius_km: Option<f64>,
    max_radius_km: Option<f64>,
    default_page_size: Option<u32>,
    max_page_size: Option<u32>,
    parallel_scoring: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct DataPatch {
    fixture_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
