use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use prod_plan::export::{self, ReportDate};
use prod_plan::week::date_label;
use prod_plan::{
    ParsedPlan, PlanConfig, PlanRequest, day_label, export_file_name, load_sheet, parse_plan,
    parse_week, summarize_lines,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Xlsx,
    Csv,
    /// One entry per row with a product code
    Json,
    /// Entries grouped by line and shift
    Grouped,
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json | OutputFormat::Grouped => "json",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "prod-plan")]
#[command(version, about = "Extract the active production entries of a planning workbook")]
struct Cli {
    /// JSON plan config (overrides PLAN_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract one day
    Day(DayArgs),
    /// Extract Monday..Friday of the week containing --date into one workbook
    Week(WeekArgs),
    /// Print the JSON schema of the plan config
    Schema,
}

#[derive(Args, Debug)]
struct Selection {
    /// Planning workbook (.xlsx, .xlsm, .xls, .xlsb or .ods)
    input: PathBuf,

    /// Day to extract, yyyy-mm-dd or dd/mm/yyyy (default: today)
    #[arg(short, long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Shift to keep (default: all)
    #[arg(short, long)]
    shift: Option<String>,
}

#[derive(Args, Debug)]
struct DayArgs {
    #[command(flatten)]
    selection: Selection,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Xlsx)]
    format: OutputFormat,

    /// Output file; text formats go to stdout when omitted
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Report date for the grouped format (default: --date)
    #[arg(long)]
    report_date: Option<String>,

    /// Log per-line totals
    #[arg(long)]
    summary: bool,
}

#[derive(Args, Debug)]
struct WeekArgs {
    #[command(flatten)]
    selection: Selection,

    /// Output workbook (default: plano_semana_<monday>.xlsx)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    let t = s.trim();
    NaiveDate::parse_from_str(t, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(t, "%d/%m/%Y"))
        .map_err(|_| format!("'{}' is neither yyyy-mm-dd nor dd/mm/yyyy", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = config::Config::from_env().load_plan_config(cli.config)?;

    match cli.command {
        Command::Day(args) => run_day(args, cfg).await,
        Command::Week(args) => run_week(args, cfg).await,
        Command::Schema => {
            let schema = schemars::schema_for!(PlanConfig);
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

async fn run_day(args: DayArgs, cfg: PlanConfig) -> Result<(), Box<dyn std::error::Error>> {
    let date = args
        .selection
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let shift = args.selection.shift.filter(|s| !s.trim().is_empty());
    let sheet = load_sheet(&args.selection.input).await?;

    let request = PlanRequest::new(Some(date), shift.clone());
    let plan = parse_plan(&sheet, &request, &cfg)?;
    tracing::info!(
        rows = plan.rows.len(),
        ops = plan.stats.op_list.len(),
        total_hcs = plan.stats.total_hcs,
        total_prog = plan.stats.total_prog,
        "Plan for {}",
        day_label(date, shift.as_deref())
    );
    if args.summary {
        log_line_summaries(&plan);
    }

    let bytes = match args.format {
        OutputFormat::Xlsx => export::to_xlsx(&plan.rows, &cfg.xlsx_sheet_name)?,
        OutputFormat::Csv => export::to_csv(&plan.rows, &cfg.csv)?.into_bytes(),
        OutputFormat::Json => export::to_flat_json(&plan.rows)?.into_bytes(),
        OutputFormat::Grouped => {
            let report_date = match args.report_date {
                Some(s) => ReportDate::Text(s),
                None => ReportDate::Date(date),
            };
            export::to_grouped_json(&plan.rows, Some(&report_date), cfg.max_skus_per_linha)?
                .into_bytes()
        }
    };

    match (args.out, args.format) {
        (Some(path), _) => write_output(path, bytes).await,
        (None, OutputFormat::Xlsx) => {
            let path = PathBuf::from(export_file_name(
                &day_label(date, shift.as_deref()),
                args.format.extension(),
            ));
            write_output(path, bytes).await
        }
        (None, _) => {
            println!("{}", String::from_utf8_lossy(&bytes).trim_end());
            Ok(())
        }
    }
}

async fn run_week(args: WeekArgs, cfg: PlanConfig) -> Result<(), Box<dyn std::error::Error>> {
    let anchor = args
        .selection
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let shift = args.selection.shift.filter(|s| !s.trim().is_empty());
    let sheet = Arc::new(load_sheet(&args.selection.input).await?);

    let days = parse_week(sheet, anchor, shift, Arc::new(cfg)).await?;
    for day in &days {
        tracing::info!(
            rows = day.plan.rows.len(),
            total_prog = day.plan.stats.total_prog,
            warnings = day.plan.warnings.len(),
            "Day {}",
            day.label
        );
    }

    let bytes = export::week_to_xlsx(&days)?;
    let path = match (args.out, days.first()) {
        (Some(path), _) => path,
        (None, Some(first)) => PathBuf::from(export_file_name(
            &format!("semana {}", date_label(first.date)),
            "xlsx",
        )),
        (None, None) => PathBuf::from(export_file_name("semana", "xlsx")),
    };
    write_output(path, bytes).await
}

fn log_line_summaries(plan: &ParsedPlan) {
    for line in summarize_lines(&plan.rows) {
        tracing::info!(
            linha = line.linha,
            skus = line.rows.len(),
            total_prog = line.total_prog,
            peak_hcs = line.peak_hcs,
            "Line summary"
        );
    }
}

async fn write_output(path: PathBuf, bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
    tokio::fs::write(&path, bytes).await?;
    tracing::info!(path = %path.display(), "Wrote export");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dates_accept_iso_and_brazilian_forms() {
        let d = NaiveDate::from_ymd_opt(2025, 10, 23).unwrap();
        assert_eq!(parse_date("2025-10-23"), Ok(d));
        assert_eq!(parse_date("23/10/2025"), Ok(d));
        assert!(parse_date("23-10").is_err());
    }

    #[test]
    fn cli_parses_day_command() {
        let cli = Cli::try_parse_from([
            "prod-plan", "day", "plano.xlsx", "--date", "23/10/2025", "--shift", "1", "-f",
            "grouped",
        ])
        .unwrap();
        match cli.command {
            Command::Day(args) => {
                assert_eq!(args.selection.shift.as_deref(), Some("1"));
                assert!(matches!(args.format, OutputFormat::Grouped));
                assert_eq!(args.format.extension(), "json");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
