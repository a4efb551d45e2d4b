pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand};
use mealtable_app::{SortBy, StoreTypeFilter};
use mealtable_core::config::{ConfigOverrides, LogFormat, LoggingConfig};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use crate::commands::recommend::RecommendArgs;
use crate::commands::RuntimeOptions;

#[derive(Debug, Parser)]
#[command(
    name = "mealtable",
    about = "Mealtable store recommendation CLI",
    long_about = "Score nearby stores for a member, explain a single store's score, and inspect configuration.",
    after_help = "Examples:\n  mealtable recommend 1 --sort-by distance\n  mealtable score-detail 1 101\n  mealtable config"
)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    #[arg(long, global = true, help = "Config file path (defaults to mealtable.toml or config/mealtable.toml)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "JSON dataset used to seed the repositories")]
    fixtures: Option<PathBuf>,
    #[arg(long, global = true, help = "Log filter, e.g. info or mealtable_core=debug")]
    log_level: Option<String>,
    #[arg(long, global = true, value_parser = parse_log_format, help = "compact, pretty or json")]
    log_format: Option<LogFormat>,
    #[arg(long, global = true, help = "Evaluate at this local time, e.g. 2026-10-19T12:30:00")]
    at: Option<NaiveDateTime>,
    #[arg(long, global = true, help = "Radius in km used when a request names none")]
    default_radius: Option<f64>,
    #[arg(long, global = true, help = "Score candidates on worker threads")]
    parallel: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Rank stores around a member and return one page of recommendations")]
    Recommend {
        member_id: i64,
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<Decimal>,
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<Decimal>,
        #[arg(long, help = "Search radius in km")]
        radius: Option<f64>,
        #[arg(long, default_value = "score", value_parser = parse_sort)]
        sort_by: SortBy,
        #[arg(long, help = "Keep stores in categories the member dislikes")]
        include_disliked: bool,
        #[arg(long)]
        open_now: bool,
        #[arg(long, default_value = "all", value_parser = parse_store_type)]
        store_type: StoreTypeFilter,
        #[arg(long, default_value_t = 0)]
        page: u32,
        #[arg(long)]
        size: Option<u32>,
    },
    #[command(about = "Break a single store's score into weighted components")]
    ScoreDetail {
        member_id: i64,
        store_id: i64,
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<Decimal>,
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<Decimal>,
    },
    #[command(about = "Switch a member's recommendation type and show the re-ranked first page")]
    SetType {
        member_id: i64,
        #[arg(help = "SAVER, ADVENTURER or BALANCED")]
        recommendation_type: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

fn parse_sort(value: &str) -> Result<SortBy, String> {
    value.parse::<SortBy>().map_err(|error| error.to_string())
}

fn parse_store_type(value: &str) -> Result<StoreTypeFilter, String> {
    value.parse::<StoreTypeFilter>().map_err(|error| error.to_string())
}

fn parse_log_format(value: &str) -> Result<LogFormat, String> {
    value.parse::<LogFormat>().map_err(|error| error.to_string())
}

impl GlobalArgs {
    fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            config_path: self.config.clone(),
            overrides: ConfigOverrides {
                fixture_path: self.fixtures.clone(),
                log_level: self.log_level.clone(),
                log_format: self.log_format,
                default_radius_km: self.default_radius,
                parallel_scoring: self.parallel.then_some(true),
            },
            at: self.at,
        }
    }
}

/// Installs the global subscriber on stderr so stdout stays a single JSON document.
/// Later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder =
        tracing_subscriber::fmt().with_target(false).with_env_filter(filter).with_writer(std::io::stderr);

    let _ = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.global.runtime_options();

    let result = match cli.command {
        Command::Recommend {
            member_id,
            latitude,
            longitude,
            radius,
            sort_by,
            include_disliked,
            open_now,
            store_type,
            page,
            size,
        } => commands::recommend::run(
            &options,
            RecommendArgs {
                member_id,
                latitude,
                longitude,
                radius_km: radius,
                sort_by,
                include_disliked,
                open_now,
                store_type,
                page,
                size,
            },
        ),
        Command::ScoreDetail { member_id, store_id, latitude, longitude } => {
            commands::score_detail::run(&options, member_id, store_id, latitude, longitude)
        }
        Command::SetType { member_id, recommendation_type } => {
            commands::set_type::run(&options, member_id, &recommendation_type)
        }
        Command::Config => commands::config::run(&options),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
