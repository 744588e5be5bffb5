//! Sleepscope CLI - Command-line interface for the Sleepscope dashboard core
//!
//! Commands:
//! - render: Build one dashboard page and print its frame as JSON
//! - kpis: Print the overview KPIs for an occupation
//! - options: List the values accepted by each filter control
//! - validate: Load the datasets and report data-hygiene findings

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use sleepscope::aggregate::Kpis;
use sleepscope::filter::{by_occupation, occupation_options, Selector, SortOrder};
use sleepscope::normalizer::NormalizationReport;
use sleepscope::types::{AgeGroup, Category, DayType};
use sleepscope::{
    load_datasets, Dashboard, DashboardConfig, DashboardError, Datasets, Page,
    Viewport, PRODUCER_NAME, SLEEPSCOPE_VERSION,
};

/// Sleepscope - Sleep and late-night behavior dashboard data
#[derive(Parser)]
#[command(name = "sleepscope")]
#[command(version = SLEEPSCOPE_VERSION)]
#[command(about = "Shape sleep and late-night behavior datasets into chart geometry", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Where the datasets come from
#[derive(Args)]
struct DataArgs {
    /// Dashboard config file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the four CSV files (overrides the config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one page and print the frame
    Render {
        #[command(flatten)]
        data: DataArgs,

        /// Page to render
        #[arg(long)]
        page: Option<PageArg>,

        /// Occupation filter for the overview page ("all" for everyone)
        #[arg(long)]
        occupation: Option<String>,

        /// Age-group filter for the platform impact chart
        #[arg(long)]
        age_group: Option<String>,

        /// Day type for the behavior heatmap
        #[arg(long)]
        day_type: Option<DayTypeArg>,

        /// Country ranking direction
        #[arg(long)]
        sort: Option<SortArg>,

        /// Health record id to focus on the radar chart
        #[arg(long)]
        focus: Option<String>,

        /// Container width in pixels
        #[arg(long)]
        width: Option<f64>,

        /// Container height in pixels
        #[arg(long)]
        height: Option<f64>,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format (defaults to pretty JSON on a terminal)
        #[arg(long)]
        output_format: Option<OutputFormat>,
    },

    /// Print overview KPIs
    Kpis {
        #[command(flatten)]
        data: DataArgs,

        /// Occupation filter ("all" for everyone)
        #[arg(long, default_value = "all")]
        occupation: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List filter options
    Options {
        #[command(flatten)]
        data: DataArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report NaN fields and unrecognized categories per dataset
    Validate {
        #[command(flatten)]
        data: DataArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PageArg {
    Overview,
    Behavior,
    Health,
    Global,
}

impl From<PageArg> for Page {
    fn from(arg: PageArg) -> Self {
        match arg {
            PageArg::Overview => Page::Overview,
            PageArg::Behavior => Page::Behavior,
            PageArg::Health => Page::Health,
            PageArg::Global => Page::Global,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DayTypeArg {
    Weekday,
    Weekend,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Compact JSON on one line
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SleepscopeCliError> {
    match cli.command {
        Commands::Render {
            data,
            page,
            occupation,
            age_group,
            day_type,
            sort,
            focus,
            width,
            height,
            output,
            output_format,
        } => {
            let mut config = load_config(&data)?;
            if let Some(page) = page {
                config.initial.page = page.into();
            }
            if let Some(occupation) = occupation {
                config.initial.filters.occupation = Selector::parse(&occupation);
            }
            if let Some(age_group) = age_group {
                config.initial.filters.age_group = Selector::parse(&age_group);
            }
            if let Some(day_type) = day_type {
                config.initial.filters.day_type = match day_type {
                    DayTypeArg::Weekday => DayType::Weekday,
                    DayTypeArg::Weekend => DayType::Weekend,
                };
            }
            if let Some(sort) = sort {
                config.initial.filters.sort = match sort {
                    SortArg::Asc => SortOrder::Ascending,
                    SortArg::Desc => SortOrder::Descending,
                };
            }
            config.viewport = Viewport::new(
                width.unwrap_or(config.viewport.width),
                height.unwrap_or(config.viewport.height),
            );

            cmd_render(&config, focus.as_deref(), &output, output_format)
        }

        Commands::Kpis {
            data,
            occupation,
            json,
        } => cmd_kpis(&open_datasets(&data)?, &occupation, json),

        Commands::Options { data, json } => cmd_options(&open_datasets(&data)?, json),

        Commands::Validate { data, json } => cmd_validate(&open_datasets(&data)?, json),
    }
}

fn load_config(data: &DataArgs) -> Result<DashboardConfig, SleepscopeCliError> {
    let mut config = match &data.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };
    if let Some(dir) = &data.data_dir {
        config.data_dir = dir.clone();
    }
    Ok(config)
}

fn open_datasets(data: &DataArgs) -> Result<Datasets, SleepscopeCliError> {
    let config = load_config(data)?;
    Ok(load_datasets(&config.dataset_paths())?)
}

fn cmd_render(
    config: &DashboardConfig,
    focus: Option<&str>,
    output: &Path,
    output_format: Option<OutputFormat>,
) -> Result<(), SleepscopeCliError> {
    let mut dashboard = Dashboard::open(config)?;

    if let Some(id) = focus {
        if dashboard.state().page != Page::Overview {
            log::warn!("--focus only affects the overview page");
        }
        dashboard.focus_record(id)?;
    }

    let frame = dashboard.render()?;
    let to_stdout = output.to_string_lossy() == "-";
    let format = output_format.unwrap_or(if to_stdout && atty::is(atty::Stream::Stdout) {
        OutputFormat::JsonPretty
    } else {
        OutputFormat::Json
    });

    let output_data = match format {
        OutputFormat::Json => serde_json::to_string(&frame)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&frame)?,
    };

    if to_stdout {
        println!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_kpis(datasets: &Datasets, occupation: &str, json: bool) -> Result<(), SleepscopeCliError> {
    let selector = Selector::parse(occupation);
    let subset = by_occupation(&datasets.health, &selector);
    let kpis = Kpis::compute(&subset);

    if json {
        println!("{}", serde_json::to_string_pretty(&kpis)?);
        return Ok(());
    }

    let display = kpis.display();
    println!("KPIs ({})", String::from(selector));
    println!("====================");
    println!("Respondents:        {}", display.total);
    println!("Avg sleep (h):      {}", display.avg_sleep_hours);
    println!("Avg stress:         {}", display.avg_stress);
    println!("Avg daily steps:    {}", display.avg_daily_steps);
    println!("Disorder rate (%):  {}", display.disorder_rate_pct);

    Ok(())
}

#[derive(serde::Serialize)]
struct OptionsReport {
    pages: Vec<&'static str>,
    occupations: Vec<String>,
    age_groups: Vec<String>,
    day_types: Vec<String>,
}

fn cmd_options(datasets: &Datasets, json: bool) -> Result<(), SleepscopeCliError> {
    let report = OptionsReport {
        pages: Page::ALL.iter().map(|p| p.as_str()).collect(),
        occupations: occupation_options(&datasets.health),
        age_groups: AgeGroup::DECLARED
            .iter()
            .map(|g| g.label().to_string())
            .collect(),
        day_types: [DayType::Weekday, DayType::Weekend]
            .iter()
            .map(|d| d.label().to_string())
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pages:       {}", report.pages.join(", "));
        println!("Occupations: all, {}", report.occupations.join(", "));
        println!("Age groups:  all, {}", report.age_groups.join(", "));
        println!("Day types:   {}", report.day_types.join(", "));
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct ValidationReport {
    producer: String,
    version: String,
    datasets: Vec<NormalizationReport>,
}

fn cmd_validate(datasets: &Datasets, json: bool) -> Result<(), SleepscopeCliError> {
    let report = ValidationReport {
        producer: PRODUCER_NAME.to_string(),
        version: SLEEPSCOPE_VERSION.to_string(),
        datasets: datasets.reports(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        for dataset in &report.datasets {
            let status_icon = if dataset.nan_fields > 0 {
                "[ERR]"
            } else if !dataset.unrecognized_categories.is_empty() {
                "[WARN]"
            } else {
                "[OK]"
            };
            println!(
                "  {} {}: {} records, {} NaN fields",
                status_icon,
                dataset.dataset.as_str(),
                dataset.records,
                dataset.nan_fields
            );
            for value in &dataset.unrecognized_categories {
                println!("      unrecognized category: {}", value);
            }
        }
    }

    let nan_fields: usize = report.datasets.iter().map(|d| d.nan_fields).sum();
    if nan_fields > 0 {
        Err(SleepscopeCliError::ValidationFailed(nan_fields))
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum SleepscopeCliError {
    Io(std::io::Error),
    Dashboard(DashboardError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<std::io::Error> for SleepscopeCliError {
    fn from(e: std::io::Error) -> Self {
        SleepscopeCliError::Io(e)
    }
}

impl From<DashboardError> for SleepscopeCliError {
    fn from(e: DashboardError) -> Self {
        SleepscopeCliError::Dashboard(e)
    }
}

impl From<serde_json::Error> for SleepscopeCliError {
    fn from(e: serde_json::Error) -> Self {
        SleepscopeCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SleepscopeCliError> for CliError {
    fn from(e: SleepscopeCliError) -> Self {
        match e {
            SleepscopeCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SleepscopeCliError::Dashboard(e) => {
                let (code, hint) = match &e {
                    DashboardError::Load { .. } | DashboardError::CsvError(_) => (
                        "LOAD_ERROR",
                        "Check --data-dir points at the four dataset CSV files",
                    ),
                    DashboardError::MissingColumn { .. } => {
                        ("SCHEMA_ERROR", "Compare the CSV header with the expected columns")
                    }
                    DashboardError::Config(_) | DashboardError::JsonError(_) => {
                        ("CONFIG_ERROR", "Check the config file")
                    }
                    DashboardError::UnknownRecord(_) => {
                        ("UNKNOWN_RECORD", "Use a Person ID from the health dataset")
                    }
                    DashboardError::UnknownPage(_) => (
                        "UNKNOWN_PAGE",
                        "Valid pages: overview, behavior, health, global",
                    ),
                    DashboardError::IoError(_) => ("IO_ERROR", "Check file paths and permissions"),
                    DashboardError::InvalidDomain(_) | DashboardError::InvalidBuckets(_) => {
                        ("SCALE_ERROR", "Check the viewport size and data values")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            SleepscopeCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SleepscopeCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} numeric fields could not be parsed", count),
                hint: Some("Run 'sleepscope validate' without --json for details".to_string()),
            },
        }
    }
}
