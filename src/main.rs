use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use plotters::style::RGBColor;

mod burndown;
mod chart;
mod config;
mod error;
mod fetch;
mod models;
mod process;
mod report;

use chart::ChartOptions;
use config::Config;
use fetch::ProjectClient;
use models::{AggregationBucket, BurndownSeries, ProcessedItem};

#[derive(Parser)]
#[command(name = "project-burndown")]
#[command(about = "Burndown charts for GitHub Projects", long_about = None)]
struct Cli {
    /// Logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    None,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the project and render task and estimate burndown charts
    Chart(ChartArgs),
    /// Fetch the project and print per-day completions without rendering
    Summary {
        /// Numeric project field used for the weighted burndown
        #[arg(long, default_value = "Estimate")]
        estimate_field: String,
    },
}

#[derive(Args)]
struct ChartArgs {
    /// First day of the sprint (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,
    /// Last day of the sprint, inclusive (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,
    /// Sprint or milestone label appended to the chart titles
    #[arg(long)]
    sprint: Option<String>,
    /// Numeric project field used for the weighted burndown
    #[arg(long, default_value = "Estimate")]
    estimate_field: String,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    #[arg(long, default_value = "burndown_tasks.png")]
    tasks_file: PathBuf,
    #[arg(long, default_value = "burndown_estimates.png")]
    estimates_file: PathBuf,
    #[arg(long, default_value = "blue", value_parser = chart::parse_color)]
    tasks_color: RGBColor,
    #[arg(long, default_value = "green", value_parser = chart::parse_color)]
    estimates_color: RGBColor,
    /// Also write each series as CSV next to its chart
    #[arg(long)]
    csv: bool,
    /// Open the rendered charts with the system image viewer
    #[arg(long)]
    show: bool,
}

impl ChartArgs {
    /// Checks the arguments clap cannot check on its own.
    fn validate(&self) -> anyhow::Result<()> {
        if self.end < self.start {
            bail!("--end ({}) must not be before --start ({})", self.end, self.start);
        }
        Ok(())
    }
}

fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.log_level);

    if let Commands::Chart(args) = &cli.command {
        args.validate()?;
    }

    let config = Config::from_env().context("invalid environment configuration")?;
    let client = ProjectClient::new(&config)?;

    let items = client
        .fetch_project_items(&config.org, &config.project_title)
        .await
        .with_context(|| format!("failed to fetch items for '{}'", config.project_title))?;
    let processed = process::process_items(&items);

    match cli.command {
        Commands::Chart(args) => run_chart(&config, &processed, &args)?,
        Commands::Summary { estimate_field } => {
            let closed_tasks = process::calculate_by_date(&processed, None)?;
            let closed_estimates = process::calculate_by_date(&processed, Some(&estimate_field))?;
            let total_estimate = process::total_estimate(&processed, &estimate_field)?;
            let summary = report::build_summary(
                &config.project_title,
                processed.len(),
                &closed_tasks,
                &estimate_field,
                total_estimate,
                &closed_estimates,
            );
            print!("{summary}");
        }
    }

    Ok(())
}

fn run_chart(config: &Config, processed: &[ProcessedItem], args: &ChartArgs) -> anyhow::Result<()> {
    let title = match &args.sprint {
        Some(sprint) => format!("{} Burndown Chart ({})", config.project_title, sprint),
        None => format!("{} Burndown Chart", config.project_title),
    };

    let total_tasks = processed.len();
    let closed_tasks = process::calculate_by_date(processed, None)?;
    log::info!("total tasks: {}, closed tasks per day: {:?}", total_tasks, closed_tasks);

    let total_estimate = process::total_estimate(processed, &args.estimate_field)?;
    let closed_estimates = process::calculate_by_date(processed, Some(&args.estimate_field))?;
    log::info!(
        "total {}: {}, closed per day: {:?}",
        args.estimate_field,
        total_estimate,
        closed_estimates
    );

    let tasks_path = args.out_dir.join(&args.tasks_file);
    let estimates_path = args.out_dir.join(&args.estimates_file);

    render_metric(
        &closed_tasks,
        args,
        total_tasks as f64,
        &ChartOptions {
            title: &title,
            y_label: "Remaining Tasks",
            output_path: &tasks_path,
            color: args.tasks_color,
        },
    )?;

    let y_label = format!("Remaining {}", args.estimate_field);
    render_metric(
        &closed_estimates,
        args,
        total_estimate,
        &ChartOptions {
            title: &title,
            y_label: &y_label,
            output_path: &estimates_path,
            color: args.estimates_color,
        },
    )?;

    if args.show {
        for path in [&tasks_path, &estimates_path] {
            chart::present(path)?;
        }
    }

    Ok(())
}

fn render_metric(
    closed_per_day: &AggregationBucket,
    args: &ChartArgs,
    total: f64,
    options: &ChartOptions<'_>,
) -> anyhow::Result<()> {
    let series = BurndownSeries::compute(closed_per_day, args.start, args.end, total);
    chart::render_burndown_chart(&series, options)?;

    if args.csv {
        report::write_series_csv(&series, &csv_path(options.output_path))?;
    }
    Ok(())
}

fn csv_path(chart_path: &Path) -> PathBuf {
    chart_path.with_extension("csv")
}
