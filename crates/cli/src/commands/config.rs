use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use mealtable_core::config::AppConfig;
use serde_json::{json, Map, Value as JsonValue};
use toml::Value;

use crate::commands::{CommandResult, RuntimeOptions};

/// Config keys with the environment variable that can set each one.
const FIELDS: &[(&str, &[&str])] = &[
    ("scoring.decay_per_day", &["MEALTABLE_SCORING_DECAY_PER_DAY"]),
    ("scoring.cold_start_min_records", &["MEALTABLE_SCORING_COLD_START_MIN_RECORDS"]),
    ("scoring.default_reference_budget", &["MEALTABLE_SCORING_DEFAULT_REFERENCE_BUDGET"]),
    ("scoring.history_window_days", &["MEALTABLE_SCORING_HISTORY_WINDOW_DAYS"]),
    ("scoring.freshness_window_days", &["MEALTABLE_SCORING_FRESHNESS_WINDOW_DAYS"]),
    ("recommendation.default_radius_km", &["MEALTABLE_RECOMMENDATION_DEFAULT_RADIUS_KM"]),
    ("recommendation.min_radius_km", &["MEALTABLE_RECOMMENDATION_MIN_RADIUS_KM"]),
    ("recommendation.max_radius_km", &["MEALTABLE_RECOMMENDATION_MAX_RADIUS_KM"]),
    ("recommendation.default_page_size", &["MEALTABLE_RECOMMENDATION_DEFAULT_PAGE_SIZE"]),
    ("recommendation.max_page_size", &["MEALTABLE_RECOMMENDATION_MAX_PAGE_SIZE"]),
    ("recommendation.parallel_scoring", &["MEALTABLE_RECOMMENDATION_PARALLEL_SCORING"]),
    ("data.fixture_path", &["MEALTABLE_DATA_FIXTURE_PATH"]),
    ("logging.level", &["MEALTABLE_LOGGING_LEVEL", "MEALTABLE_LOG_LEVEL"]),
    ("logging.format", &["MEALTABLE_LOGGING_FORMAT", "MEALTABLE_LOG_FORMAT"]),
];

pub fn run(options: &RuntimeOptions) -> CommandResult {
    let config = match options.load_config() {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let config_file_path = detect_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let overridden = overridden_keys(options);

    let effective = match serde_json::to_value(&config) {
        Ok(value) => value,
        Err(error) => {
            return CommandResult::failure("config", "serialization", error.to_string(), 5)
        }
    };

    let mut fields = Map::new();
    for (key_path, env_keys) in FIELDS {
        let source = if overridden.contains(key_path) {
            "cli".to_string()
        } else {
            field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
        };
        fields.insert(
            (*key_path).to_string(),
            json!({ "value": lookup(&effective, key_path), "source": source }),
        );
    }

    CommandResult::success(
        "config",
        "effective config (source precedence: cli > env > file > default)",
        Some(json!({ "fields": fields, "scoring_parameters": scoring_summary(&config) })),
    )
}

fn scoring_summary(config: &AppConfig) -> JsonValue {
    serde_json::to_value(config.scoring.parameters()).unwrap_or(JsonValue::Null)
}

fn overridden_keys(options: &RuntimeOptions) -> Vec<&'static str> {
    let overrides = &options.overrides;
    let mut keys = Vec::new();
    if overrides.fixture_path.is_some() {
        keys.push("data.fixture_path");
    }
    if overrides.log_level.is_some() {
        keys.push("logging.level");
    }
    if overrides.log_format.is_some() {
        keys.push("logging.format");
    }
    if overrides.default_radius_km.is_some() {
        keys.push("recommendation.default_radius_km");
    }
    if overrides.parallel_scoring.is_some() {
        keys.push("recommendation.parallel_scoring");
    }
    keys
}

fn detect_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return path.exists().then(|| path.to_path_buf());
    }

    let root = PathBuf::from("mealtable.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/mealtable.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

static MISSING: JsonValue = JsonValue::Null;

fn lookup<'a>(root: &'a JsonValue, key_path: &str) -> &'a JsonValue {
    key_path.split('.').fold(root, |current, key| current.get(key).unwrap_or(&MISSING))
}
