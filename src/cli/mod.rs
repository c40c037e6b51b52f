//! Command-line parsing for the e-Stat correlation tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetch/analysis code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{AnalysisRequest, DEFAULT_DEMAND_ID, DEFAULT_SUPPLY_ID, Prefecture};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "estat",
    version,
    about = "Prefecture tourism correlation analysis on e-Stat data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both series, print the merged table, correlation and advisory.
    Analyze(AnalyzeArgs),
    /// List the selectable prefectures and their area codes.
    Prefectures,
    /// Launch the interactive TUI.
    ///
    /// The flags seed the initial prefecture and ids; everything can be changed
    /// inside the UI.
    Tui(AnalyzeArgs),
}

/// Common options for an analysis run.
#[derive(Debug, Parser, Clone)]
pub struct AnalyzeArgs {
    /// Prefecture to analyze.
    #[arg(short = 'p', long, value_enum, default_value_t = Prefecture::Hokkaido)]
    pub prefecture: Prefecture,

    /// Statistic table id for the demand side (guest nights).
    #[arg(long, default_value = DEFAULT_DEMAND_ID)]
    pub demand_id: String,

    /// Statistic table id for the supply side (room occupancy rate).
    #[arg(long, default_value = DEFAULT_SUPPLY_ID)]
    pub supply_id: String,

    /// e-Stat application id (overrides ESTAT_APP_ID).
    #[arg(long)]
    pub app_id: Option<String>,

    /// Render an ASCII chart in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 72)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Export the merged table to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full analysis result to JSON.
    #[arg(long = "export-json")]
    pub export_json: Option<PathBuf>,
}

impl AnalyzeArgs {
    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest {
            prefecture: self.prefecture,
            demand_id: self.demand_id.trim().to_string(),
            supply_id: self.supply_id.trim().to_string(),
        }
    }

    pub fn show_plot(&self) -> bool {
        self.plot && !self.no_plot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults() {
        let cli = Cli::parse_from(["estat", "analyze"]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.request(), AnalysisRequest::default());
        assert!(args.show_plot());
        assert!(args.app_id.is_none());
    }

    #[test]
    fn analyze_flags() {
        let cli = Cli::parse_from([
            "estat",
            "analyze",
            "-p",
            "okinawa",
            "--demand-id",
            " 0000000001 ",
            "--supply-id",
            "0000000002",
            "--no-plot",
            "--export",
            "out.csv",
        ]);
        let Command::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        let req = args.request();
        assert_eq!(req.prefecture, Prefecture::Okinawa);
        assert_eq!(req.demand_id, "0000000001");
        assert_eq!(req.supply_id, "0000000002");
        assert!(!args.show_plot());
        assert_eq!(args.export, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn unknown_prefecture_is_rejected() {
        assert!(Cli::try_parse_from(["estat", "analyze", "-p", "atlantis"]).is_err());
    }
}
