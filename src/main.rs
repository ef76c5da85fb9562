//! tabula - print and query typed CSV tables

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use tabula::config::{Config, Layout, OutputFormat};
use tabula::logging::init_logging;
use tabula::model::{ColumnType, Record};
use tabula::output::print_table;
use tabula::parser::{self, read_records};
use tabula::queries::rides::{parse_date, RideRecord};
use tabula::queries::{
    greatest_increase, people_on_route, read_portfolio, read_portfolio_dat, rides_per_route,
    route_count, total_cost,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLayout {
    Columns,
    Rows,
}

impl From<CliLayout> for Layout {
    fn from(l: CliLayout) -> Self {
        match l {
            CliLayout::Columns => Layout::Columns,
            CliLayout::Rows => Layout::Rows,
        }
    }
}

/// Print and query typed CSV tables
#[derive(Parser, Debug)]
#[command(name = "tabula")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a file into a typed store and print it as a table
    Show(ShowArgs),
    /// Total cost of a stock portfolio (.csv with header or headerless .dat)
    Cost(CostArgs),
    /// Answer ridership questions about a route/date/daytype/rides CSV
    Rides(RidesArgs),
}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// File to load
    file: PathBuf,

    /// Column types in file order: str, int or float (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    types: Vec<String>,

    /// Column names for files without a header line (comma-separated)
    #[arg(long, value_delimiter = ',')]
    header: Vec<String>,

    /// Columns to print, in order (comma-separated); defaults to all
    #[arg(short, long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Output format: text, csv or html
    #[arg(short, long, default_value = "text")]
    format: String,

    /// How the store holds its data
    #[arg(long, value_enum, default_value = "columns")]
    layout: CliLayout,

    /// First row to print
    #[arg(long)]
    start: Option<usize>,

    /// Row to stop before
    #[arg(long)]
    end: Option<usize>,

    /// Print the sum of a numeric column instead of the table
    #[arg(long)]
    sum: Option<String>,
}

#[derive(clap::Args, Debug)]
struct CostArgs {
    /// Portfolio file
    file: PathBuf,

    /// Also print the holdings in this format (text, csv or html)
    #[arg(long)]
    show: Option<String>,
}

#[derive(clap::Args, Debug)]
struct RidesArgs {
    /// Ridership CSV
    file: PathBuf,

    /// Route for a single-day lookup (needs --date)
    #[arg(long, requires = "date")]
    route: Option<String>,

    /// Date for a single-day lookup, MM/DD/YYYY (needs --route)
    #[arg(long, requires = "route")]
    date: Option<String>,

    /// Number of routes to list by ridership increase
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Baseline year for the increase ranking
    #[arg(long, default_value_t = 2001)]
    from_year: i32,

    /// Comparison year for the increase ranking
    #[arg(long, default_value_t = 2011)]
    to_year: i32,

    /// Output format for the per-route table: text, csv or html
    #[arg(short, long, default_value = "text")]
    format: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(clean) => {
            if clean {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1) // Some rows were skipped
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(command: Command) -> Result<bool> {
    match command {
        Command::Show(args) => show(args),
        Command::Cost(args) => cost(args),
        Command::Rides(args) => rides(args),
    }
}

fn show(args: ShowArgs) -> Result<bool> {
    // Resolve the formatter before reading anything
    let format: OutputFormat = args.format.parse()?;

    let mut config = Config::new(&args.file)
        .with_columns(args.columns)
        .with_output_format(format)
        .with_layout(args.layout.into());
    if !args.types.is_empty() {
        let types = args
            .types
            .iter()
            .map(|t| t.parse::<ColumnType>())
            .collect::<tabula::Result<Vec<_>>>()?;
        config = config.with_types(types);
    }
    if !args.header.is_empty() {
        config = config.with_header(args.header);
    }

    let ingest = parser::load(&config)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    for error in &ingest.errors {
        eprintln!("Skipped {}", error);
    }
    let clean = ingest.is_clean();

    let store = match (args.start, args.end) {
        (None, None) => ingest.store,
        (start, end) => ingest
            .store
            .slice(start.unwrap_or(0)..end.unwrap_or(usize::MAX))?,
    };

    if let Some(column) = args.sum {
        let is_int = store
            .schema()
            .columns()
            .iter()
            .any(|c| c.name == column && c.column_type == ColumnType::Int);
        if is_int {
            println!("{}", store.sum_int(&column)?);
        } else {
            println!("{}", store.sum_float(&column)?);
        }
        return Ok(clean);
    }

    let columns: Vec<String> = if config.columns.is_empty() {
        store.column_names().into_iter().map(String::from).collect()
    } else {
        config.columns.clone()
    };
    print_table(store.iter(), &columns, config.output_format)?;
    Ok(clean)
}

fn cost(args: CostArgs) -> Result<bool> {
    let format = args
        .show
        .as_deref()
        .map(str::parse::<OutputFormat>)
        .transpose()?;

    let (stocks, skipped) = if is_dat(&args.file) {
        read_portfolio_dat(&args.file)
    } else {
        read_portfolio(&args.file)
    }
    .with_context(|| format!("Failed to read portfolio: {}", args.file.display()))?;

    if let Some(format) = format {
        print_table(&stocks, &["name", "shares", "price"], format)?;
        println!();
    }
    println!("Total portfolio cost: {}", total_cost(&stocks));
    Ok(skipped.is_empty())
}

fn is_dat(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("dat"))
}

fn rides(args: RidesArgs) -> Result<bool> {
    let format: OutputFormat = args.format.parse()?;
    let (records, skipped) = read_records::<RideRecord>(&args.file)
        .with_context(|| format!("Failed to read ridership: {}", args.file.display()))?;

    println!("Routes: {}", route_count(&records));

    if let (Some(route), Some(date)) = (&args.route, &args.date) {
        let Some(day) = parse_date(date) else {
            bail!("Invalid date '{}', expected MM/DD/YYYY", date);
        };
        println!(
            "Rides on route {} on {}: {}",
            route,
            day.format("%B %d, %Y"),
            people_on_route(&records, route, day)?
        );
    }

    println!();
    let totals: Vec<Record> = rides_per_route(&records)?
        .into_iter()
        .map(|(route, rides)| Record::new().with("route", route).with("rides", rides))
        .collect();
    print_table(&totals, &["route", "rides"], format)?;

    let before = year_range(args.from_year)?;
    let after = year_range(args.to_year)?;
    println!();
    println!(
        "Greatest increase {} to {}:",
        args.from_year, args.to_year
    );
    for (route, delta) in greatest_increase(&records, before, after, args.top)? {
        println!("{}: {}", route, delta);
    }

    Ok(skipped.is_empty())
}

fn year_range(year: i32) -> Result<(chrono::NaiveDate, chrono::NaiveDate)> {
    let start = chrono::NaiveDate::from_ymd_opt(year, 1, 1);
    let end = chrono::NaiveDate::from_ymd_opt(year, 12, 31);
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => bail!("Year out of range: {}", year),
    }
}
