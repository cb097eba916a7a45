use std::error::Error;
use std::io::{self, Write};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use uld_core::reports::Reports;
use uld_core::types::BreakpointContext;
use uld_core::{Inspector, Runtime};
use uld_utils::{info, init_logging, init_logging_for_session, init_logging_with_level, LogFormat, LogLevel};

mod sample;

/// Reference host for the ULD runtime inspector.
#[derive(Parser, Debug)]
#[command(name = "uld")]
#[command(version)]
#[command(about = "Reference host for the ULD runtime inspector", long_about = None)]
struct Cli
{
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Fire a static breakpoint over the sample heap and open the console
    Demo
    {
        /// Breakpoint number shown in the banner
        #[arg(long, default_value_t = 1)]
        breakpoint: u32,
        /// Source file shown in the banner
        #[arg(long, default_value = "Program.ul")]
        file: String,
        /// Source line number shown in the banner
        #[arg(long, default_value_t = 12)]
        line: u32,
        /// Source line text shown in the banner
        #[arg(long, default_value = "    breakpoint;")]
        source: String,
        /// Log level (error, warn, info, debug, trace); overrides RUST_LOG
        #[arg(long)]
        log_level: Option<LogLevel>,
        /// Log to stderr instead of the session log file
        #[arg(long, default_value_t = false)]
        console_log: bool,
    },
    /// Print registry reports for the sample heap and exit (headless mode)
    Report
    {
        /// Which report to print
        #[arg(long, value_enum, default_value_t = ReportKind::All)]
        kind: ReportKind,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ReportKind
{
    Alloc,
    Asm,
    Types,
    All,
}

fn main()
{
    let cli = Cli::parse();

    if let Err(e) = run_command(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(cli: Cli) -> Result<(), Box<dyn Error>>
{
    match cli.command {
        Commands::Demo {
            breakpoint,
            file,
            line,
            source,
            log_level,
            console_log,
        } => {
            // The console owns the terminal, so logs go to a file unless asked otherwise
            if console_log {
                init_logging_with_level(log_level.unwrap_or(LogLevel::Info), LogFormat::Pretty)?;
            } else {
                let log_file = init_logging_for_session(log_level)?;
                info!(path = %log_file.display(), "session logging initialized");
            }

            let heap = sample::build()?;
            info!(objects = heap.allocations().len(), "sample heap ready");

            let ctx = BreakpointContext::new(breakpoint, file, line, source);
            Inspector::new(&heap).static_debug(&ctx);

            println!("Program resumed after breakpoint {breakpoint}");
            Ok(())
        }
        Commands::Report { kind } => {
            init_logging()?;

            let heap = sample::build()?;
            let reports = Reports::new(&heap);
            let mut out = io::stdout().lock();

            if matches!(kind, ReportKind::Alloc | ReportKind::All) {
                reports.allocations(&mut out)?;
            }
            if matches!(kind, ReportKind::Asm | ReportKind::All) {
                reports.assemblies(&mut out)?;
            }
            if matches!(kind, ReportKind::Types | ReportKind::All) {
                reports.types(&mut out)?;
            }
            out.flush()?;
            Ok(())
        }
    }
}
