use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use clap::Subcommand;
use robonav::{OutputFormat, generator};
use tracing_subscriber::EnvFilter;

mod generate;
mod navigate;

use generate::run_generate;
use navigate::{run_check, run_navigate};

#[derive(Parser)]
#[command(
    name = "robonav",
    version,
    about = "Robot navigation over hill/hole terrain datasets",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run every dataset in an input file and report the outcomes
    Run {
        /// Input dataset file (`-` reads stdin)
        input: PathBuf,
        /// Write the report here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
        /// Report format
        #[arg(long, default_value_t = OutputFormat::Text, value_enum)]
        format: OutputFormat,
        /// Include every step (moves, blocks, erosion) in the report
        #[arg(long, default_value_t = false)]
        trace: bool,
    },
    /// Parse an input file and summarize its datasets without running them
    Check {
        /// Input dataset file (`-` reads stdin)
        input: PathBuf,
    },
    /// Write random datasets in the input format
    Generate {
        /// Number of datasets
        #[arg(long, default_value_t = generator::DEFAULT_DATASETS)]
        datasets: usize,
        /// Grid width
        #[arg(long, default_value_t = generator::DEFAULT_WIDTH)]
        width: usize,
        /// Grid height
        #[arg(long, default_value_t = generator::DEFAULT_HEIGHT)]
        height: usize,
        /// Tallest hill; also the upper bound for strength
        #[arg(long, default_value_t = generator::DEFAULT_MAX_HILL)]
        max_hill: u32,
        /// Deepest hole; also the upper bound for agility
        #[arg(long, default_value_t = generator::DEFAULT_MAX_HOLE)]
        max_hole: u32,
        /// Probability (0..=1) that a cell is flat
        #[arg(long, default_value_t = generator::DEFAULT_FLAT_RATIO)]
        flat_ratio: f64,
        /// Directives per dataset
        #[arg(long, default_value_t = generator::DEFAULT_MOVES)]
        moves: usize,
        /// Optional RNG seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
        /// Write the datasets here instead of stdout
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

pub fn run() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Run {
            input,
            output,
            format,
            trace,
        } => run_navigate(&input, output.as_deref(), format, trace),
        Command::Check { input } => run_check(&input),
        Command::Generate {
            datasets,
            width,
            height,
            max_hill,
            max_hole,
            flat_ratio,
            moves,
            seed,
            output,
        } => run_generate(
            generator::GenerateCommand {
                datasets,
                width,
                height,
                max_hill,
                max_hole,
                flat_ratio,
                moves,
                seed,
            },
            output.as_deref(),
        ),
    }
}

fn read_input(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("read stdin: {}", e))?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| format!("read {}: {}", path.display(), e))
}

fn write_output(path: Option<&Path>, contents: &str) -> Result<(), String> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("create {}: {}", parent.display(), e))?;
            }
            fs::write(path, contents).map_err(|e| format!("write {}: {}", path.display(), e))
        }
        None => {
            print!("{}", contents);
            Ok(())
        }
    }
}
