use crate::predictor::OutputFormat;
use crate::utils::Result;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="resistotype",
          version=&**FULL_VERSION,
          about="Antibiotic resistance prediction from k-mer coverage",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Predict antibiotic susceptibility")]
    Predict(PredictArgs),
    #[clap(about = "Reference Install Validator")]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("predict")))]
#[command(arg_required_else_help(true))]
pub struct PredictArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "install-dir")]
    #[clap(help = "Directory containing data/staph/antibiotics")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_dir_exists)]
    pub install_dir: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "coverage")]
    #[clap(help = "K-mer count table(s), one per sample (KMER COUNT per line, optionally gzipped)")]
    #[clap(value_name = "COUNTS")]
    #[clap(num_args = 1..)]
    #[arg(value_parser = check_file_exists)]
    pub coverage_paths: Vec<PathBuf>,

    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(help = "Output file [default: stdout]")]
    #[clap(value_name = "OUTPUT")]
    #[arg(value_parser = check_prefix_path)]
    pub output_path: Option<PathBuf>,

    #[clap(short = 'f')]
    #[clap(long = "format")]
    #[clap(help = "Output format (tsv or json)")]
    #[clap(value_name = "FORMAT")]
    #[clap(default_value = "tsv")]
    pub format: OutputFormat,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "sample-name")]
    #[clap(value_name = "SAMPLE_NAME")]
    #[clap(help = "Sample name (only with a single coverage table)")]
    #[clap(default_value = None)]
    #[arg(value_parser = check_sample_name_nonempty)]
    pub sample_name: Option<String>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "ignore-first")]
    #[clap(value_name = "NODES")]
    #[clap(help = "Nodes to ignore at the start of each mutation allele")]
    #[clap(default_value = "0")]
    pub ignore_first: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "ignore-last")]
    #[clap(value_name = "NODES")]
    #[clap(help = "Nodes to ignore at the end of each mutation allele")]
    #[clap(default_value = "0")]
    pub ignore_last: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "expected-depth")]
    #[clap(value_name = "DEPTH")]
    #[clap(help = "Expected k-mer depth [default: estimated from the coverage table]")]
    pub expected_depth: Option<u32>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-percent-covered")]
    #[clap(value_name = "PERCENT")]
    #[clap(help = "Minimum percentage of nodes covered to call a gene or allele present")]
    #[clap(default_value = "80")]
    #[arg(value_parser = percent_in_range)]
    pub min_percent_covered: u8,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-reads")]
    #[clap(value_name = "READS")]
    #[clap(help = "Minimum estimated read count to call a mutation allele present")]
    #[clap(default_value = "1")]
    pub min_reads: u32,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "minor-fraction")]
    #[clap(value_name = "FRAC")]
    #[clap(help = "Depth fraction of the expected depth below which a gene is a minor population")]
    #[clap(default_value = "0.2")]
    #[arg(value_parser = ensure_unit_float)]
    pub minor_fraction: f64,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "min-kmer-count")]
    #[clap(value_name = "COUNT")]
    #[clap(help = "Minimum count of k-mers used to estimate the expected depth")]
    #[clap(default_value = "2")]
    pub min_kmer_count: u32,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("validate")))]
#[command(arg_required_else_help(true))]
pub struct ValidateArgs {
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "install-dir")]
    #[clap(help = "Directory containing data/staph/antibiotics")]
    #[clap(value_name = "DIR")]
    #[arg(value_parser = check_dir_exists)]
    pub install_dir: PathBuf,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(path.to_path_buf())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_dir_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.is_dir() {
        Err(format!("Directory does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_sample_name_nonempty(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        Err("Sample name cannot be an empty string".to_string())
    } else {
        Ok(s.to_string())
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn percent_in_range(s: &str) -> Result<u8> {
    let value: u8 = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid percentage", s))?;
    if value <= 100 {
        Ok(value)
    } else {
        Err(format!("Percentage must be at most 100, got: {}", value))
    }
}
