//! sastrend command line interface.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use sastrend::trend::Direction;
use sastrend::{run_trend, ReportMedium, RunSummary, TrendConfig, TrendOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sastrend")]
#[command(about = "Longitudinal trend reports from SAST report archives")]
#[command(version)]
struct Cli {
    /// Print debug-level progress detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a directory of exported reports and write a trend report
    Trend {
        /// Directory containing the exported analysis reports
        #[arg(short, long, default_value = "./reports")]
        reports_dir: PathBuf,

        /// Output file (default: trend-report-<date> inside the reports directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only analyze reports whose project key or name contains this text
        #[arg(short, long)]
        project_filter: Option<String>,

        /// Output medium
        #[arg(short, long, value_enum, default_value = "html")]
        medium: MediumArg,

        /// Config file (default: ./sastrend.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum MediumArg {
    Html,
    Markdown,
}

impl From<MediumArg> for ReportMedium {
    fn from(value: MediumArg) -> ReportMedium {
        match value {
            MediumArg::Html => ReportMedium::Html,
            MediumArg::Markdown => ReportMedium::Markdown,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "✗".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "sastrend=debug"
    } else {
        "sastrend=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Trend {
            reports_dir,
            output,
            project_filter,
            medium,
            config,
        } => {
            let config = TrendConfig::load(config.as_deref()).context("loading configuration")?;
            let mut options = TrendOptions::new(reports_dir).with_medium(medium.into());
            if let Some(filter) = project_filter {
                options = options.with_project_filter(filter);
            }
            if let Some(path) = output {
                options = options.with_output(path);
            }

            let summary = run_trend(&options, &config)?;
            print_banner(&summary);
            Ok(())
        }
        Commands::Version => {
            println!("sastrend {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn print_banner(run: &RunSummary) {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("{}", "✓ Trend report generated successfully!".green().bold());
    println!("{rule}");
    println!();
    println!("Project: {}", run.project_name);
    println!("Analysis Period: {}", run.period_label);
    println!("Reports Analyzed: {}", run.report_count);
    if run.rejected > 0 {
        println!("Reports Rejected: {}", run.rejected);
    }
    if run.duplicates > 0 {
        println!("Duplicates Dropped: {}", run.duplicates);
    }
    println!();
    let verdict = match run.verdict {
        Direction::Improving => "IMPROVING".green().bold(),
        Direction::Declining => "DECLINING".red().bold(),
        Direction::Stable => "STABLE".normal(),
    };
    println!("Overall Trend: {verdict}");
    println!("Quality Gate Pass Rate: {:.0}%", run.gate_pass_rate);
    println!();
    println!("Report saved to: {}", run.output_path.display());
    if let Some(dir) = &run.chart_dir {
        println!("Charts written to: {}", dir.display());
    }
    println!("{rule}");
}
