use clap::{Parser, Subcommand, ValueEnum};
use pathline_core::release::{write_csv, write_package, PackageOptions};
use pathline_core::{translate, AnalysisConfig, EventTable, ReleaseSpec, StructuredGrid};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Particle-tracking release translation and capture analysis
#[derive(Parser, Debug)]
#[command(name = "pathline")]
#[command(about = "Translate particle releases and analyze tracking output", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand a face-subdivision release specification into release points
    Translate {
        /// Release specification (JSON)
        #[arg(short, long)]
        spec: PathBuf,

        /// Grid definition (JSON)
        #[arg(short, long)]
        grid: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Prp)]
        format: Format,

        /// Write model z (prp) or model x/y/z (csv) instead of local cell coordinates
        #[arg(long)]
        model_coords: bool,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Capture area and travel-time statistics of a tracking run
    Analyze {
        /// Tracking event table (comma or whitespace separated)
        #[arg(short, long)]
        events: PathBuf,

        /// Reason code of terminal events
        #[arg(short, long, default_value_t = AnalysisConfig::default().terminal_reason)]
        terminal_reason: i64,

        /// Report one result per release group
        #[arg(long)]
        by_group: bool,

        /// Output file for the JSON report (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Point-release package input
    Prp,
    /// CSV point listing
    Csv,
}

fn open_output(path: Option<&Path>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(File::create(p)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn run(command: Command) -> pathline_core::Result<()> {
    match command {
        Command::Translate {
            spec,
            grid,
            format,
            model_coords,
            output,
        } => {
            let release = ReleaseSpec::load(spec)?;
            let grid = StructuredGrid::load(grid)?;
            let points = translate(&release, grid.shape())?;

            let mut out = open_output(output.as_deref())?;
            match format {
                Format::Prp => {
                    let options = PackageOptions {
                        local_z: !model_coords,
                        drape: release.drape,
                    };
                    write_package(&mut out, &points, &grid, options)?;
                }
                Format::Csv => {
                    write_csv(&mut out, &points, model_coords.then_some(&grid))?;
                }
            }
            out.flush()?;
            info!("Wrote {} release points", points.len());
        }
        Command::Analyze {
            events,
            terminal_reason,
            by_group,
            output,
        } => {
            let table = EventTable::load(&events)?;
            info!("Loaded {} events from {}", table.len(), events.display());
            let report = AnalysisConfig::default()
                .with_terminal_reason(terminal_reason)
                .with_by_group(by_group)
                .run(&table)?;

            let mut out = open_output(output.as_deref())?;
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
