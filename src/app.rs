//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - sets up logging
//! - fetches e-Stat data and runs the analysis
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use crate::cli::{AnalyzeArgs, Command};
use crate::data::{HttpStatsSource, StatFetcher};
use crate::domain::Prefecture;
use crate::error::AppError;

pub mod pipeline;

use pipeline::{AnalysisOutcome, FETCH_FAILED_NOTICE};

/// Entry point for the `estat` binary.
pub fn run() -> Result<(), AppError> {
    // We want `estat` and `estat -p tokyo` to behave like `estat tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => {
            crate::logging::init_logging(LevelFilter::INFO);
            handle_analyze(args)
        }
        Command::Prefectures => {
            print!("{}", crate::report::format_prefectures());
            Ok(())
        }
        Command::Tui(args) => {
            // stderr belongs to the alternate screen; RUST_LOG sends events to a file.
            let log_path = crate::logging::init_tui_logging();
            let res = crate::tui::run(args);
            if let Some(path) = log_path {
                eprintln!("Log written to {}", path.display());
            }
            res
        }
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let request = args.request();
    let fetcher = StatFetcher::new(HttpStatsSource::from_env(args.app_id.clone())?);

    let run = match pipeline::run_analysis(&fetcher, &request) {
        AnalysisOutcome::Ready(run) => run,
        AnalysisOutcome::Unavailable { .. } => {
            return Err(AppError::unavailable(FETCH_FAILED_NOTICE));
        }
    };

    println!("{}", crate::report::format_run_summary(&run));
    println!("{}", crate::report::format_merged_table(&run.result.merged));

    if args.show_plot() {
        let title = format!("{} demand vs supply", prefecture_label(request.prefecture));
        println!(
            "{}",
            crate::plot::render_ascii_plot(&run.result.merged, &title, args.width, args.height)
        );
    }

    if let Some(path) = &args.export {
        crate::io::export::write_merged_csv(path, &run)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::export::write_result_json(path, &run)?;
    }

    Ok(())
}

fn prefecture_label(p: Prefecture) -> String {
    format!("{} ({})", p.display_name(), p.romaji())
}

/// Rewrite argv so `estat` defaults to `estat tui`.
///
/// Rules:
/// - `estat`                      -> `estat tui`
/// - `estat -p tokyo ...`         -> `estat tui -p tokyo ...`
/// - `estat --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "analyze" | "prefectures" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
