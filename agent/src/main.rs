//! Single-agent ads diagnosis loop.
//!
//! Investigates why an ASIN's advertising underperforms: runs the belief
//! update loop over scenario data files, persists a trace, and renders
//! reports from persisted traces.

use std::path::{Path, PathBuf};

use agent::core::action::WEAK_CONFIDENCE;
use agent::core::types::{AdsMode, Flags};
use agent::exit_codes;
use agent::io::config::{AgentConfig, load_config, write_config};
use agent::io::invoker::FsInvoker;
use agent::io::scenario::load_scenario;
use agent::io::trace::load_trace;
use agent::logging;
use agent::render::TerminalSink;
use agent::report::render_report;
use agent::run::{RunRequest, run_diagnosis};
use agent::sink::EventSink;
use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agent", version, about = "Single-agent ads diagnosis loop")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file to edit and pass to `run`.
    Init {
        /// Destination path for the config file.
        #[arg(long, default_value = "agent.toml")]
        config: PathBuf,
    },
    /// Run the diagnosis loop against a scenario.
    Run {
        /// Path to the scenario JSON file.
        #[arg(long)]
        scenario: PathBuf,
        /// Directory with tool data files; defaults to the scenario's directory.
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Path to the agent TOML config; defaults apply if missing.
        #[arg(long, default_value = "agent.toml")]
        config: PathBuf,
        /// Override the configured ads aggregation level.
        #[arg(long, value_enum)]
        mode: Option<CliAdsMode>,
        /// Simulate ads metrics data being unavailable.
        #[arg(long)]
        break_ads: bool,
        /// Simulate competitor data being unavailable.
        #[arg(long)]
        break_competitor: bool,
        /// Simulate listing audit data being unavailable.
        #[arg(long)]
        break_audit: bool,
        /// Simulate inventory data being unavailable.
        #[arg(long)]
        break_inventory: bool,
    },
    /// Print the stored event log and final plan of a persisted trace.
    Replay {
        /// Path to a trace JSON file.
        trace: PathBuf,
    },
    /// Render a markdown report from a persisted trace.
    Report {
        /// Path to a trace JSON file.
        trace: PathBuf,
        /// Output path; defaults to the trace path with a `.md` extension.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliAdsMode {
    Keyword,
    Campaign,
}

impl From<CliAdsMode> for AdsMode {
    fn from(mode: CliAdsMode) -> Self {
        match mode {
            CliAdsMode::Keyword => AdsMode::Keyword,
            CliAdsMode::Campaign => AdsMode::Campaign,
        }
    }
}

fn main() {
    logging::init();
    match dispatch() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn dispatch() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Init { config } => cmd_init(&config),
        Command::Run {
            scenario,
            data_dir,
            config,
            mode,
            break_ads,
            break_competitor,
            break_audit,
            break_inventory,
        } => cmd_run(
            &scenario,
            data_dir,
            &config,
            mode,
            Flags {
                break_ads,
                break_competitor,
                break_audit,
                break_inventory,
            },
        ),
        Command::Replay { trace } => cmd_replay(&trace),
        Command::Report { trace, out } => cmd_report(&trace, out),
    }
}

fn cmd_init(config_path: &Path) -> Result<i32> {
    if config_path.exists() {
        return Err(anyhow!(
            "config already exists at {}",
            config_path.display()
        ));
    }
    write_config(config_path, &AgentConfig::default())?;
    println!("config: {}", config_path.display());
    Ok(exit_codes::OK)
}

fn cmd_run(
    scenario_path: &Path,
    data_dir: Option<PathBuf>,
    config_path: &Path,
    mode: Option<CliAdsMode>,
    flags: Flags,
) -> Result<i32> {
    let scenario = load_scenario(scenario_path)?;
    let scenario_dir = match data_dir {
        Some(dir) => dir,
        None => scenario_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("scenario path has no parent directory"))?,
    };
    let mut config = load_config(config_path)?;
    if let Some(mode) = mode {
        config.ads_mode = mode.into();
    }

    let mut sink = TerminalSink::new(std::io::stdout());
    let outcome = run_diagnosis(
        &FsInvoker,
        &RunRequest {
            scenario,
            scenario_dir,
            flags,
        },
        &config,
        &mut sink,
    )?;
    println!("\ntrace: {}", outcome.trace_path.display());

    if outcome.action.confidence < WEAK_CONFIDENCE {
        return Ok(exit_codes::NO_CONFIDENT_DIAGNOSIS);
    }
    Ok(exit_codes::OK)
}

fn cmd_replay(trace_path: &Path) -> Result<i32> {
    let trace = load_trace(trace_path)?;
    println!(
        "run {} ({} steps, goal {})",
        trace.run_id, trace.steps, trace.scenario.goal
    );
    for entry in &trace.entries {
        let event = serde_json::to_string(&entry.event)?;
        println!("[{}] step {}: {}", entry.timestamp, entry.step, event);
    }
    let mut sink = TerminalSink::new(std::io::stdout());
    sink.finished(&trace.final_state.action);
    Ok(exit_codes::OK)
}

fn cmd_report(trace_path: &Path, out: Option<PathBuf>) -> Result<i32> {
    let trace = load_trace(trace_path)?;
    let report = render_report(&trace)?;
    let out = out.unwrap_or_else(|| trace_path.with_extension("md"));
    std::fs::write(&out, report).with_context(|| format!("write {}", out.display()))?;
    println!("report: {}", out.display());
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_with_break_flag() {
        let cli = Cli::parse_from([
            "agent",
            "run",
            "--scenario",
            "scenarios/scenario_low_impr.json",
            "--break-competitor",
        ]);
        let Command::Run {
            scenario,
            break_competitor,
            break_ads,
            ..
        } = cli.command
        else {
            panic!("expected run command");
        };
        assert_eq!(scenario, PathBuf::from("scenarios/scenario_low_impr.json"));
        assert!(break_competitor);
        assert!(!break_ads);
    }

    #[test]
    fn parse_report_with_output_path() {
        let cli = Cli::parse_from([
            "agent",
            "report",
            "traces/trace_20250114_153045.json",
            "--out",
            "summary.md",
        ]);
        let Command::Report { trace, out } = cli.command else {
            panic!("expected report command");
        };
        assert!(trace.ends_with("trace_20250114_153045.json"));
        assert_eq!(out, Some(PathBuf::from("summary.md")));
    }

    #[test]
    fn init_writes_defaults_once() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("agent.toml");

        let code = cmd_init(&path).expect("init");
        assert_eq!(code, exit_codes::OK);
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg, AgentConfig::default());

        // A second init must not clobber an existing config.
        assert!(cmd_init(&path).is_err());
    }

    #[test]
    fn parse_mode_override() {
        let cli = Cli::parse_from([
            "agent",
            "run",
            "--scenario",
            "s.json",
            "--mode",
            "campaign",
        ]);
        let Command::Run { mode, .. } = cli.command else {
            panic!("expected run command");
        };
        assert!(matches!(mode, Some(CliAdsMode::Campaign)));
    }
}
