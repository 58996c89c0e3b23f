//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use warroom_domain::OutputFormat;

/// Output format for workflow reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputArg {
    /// Full report with every phase
    Full,
    /// Only the synthesis
    Synthesis,
    /// JSON report
    Json,
}

impl From<OutputArg> for OutputFormat {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Full => OutputFormat::Full,
            OutputArg::Synthesis => OutputFormat::Synthesis,
            OutputArg::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for warroom
#[derive(Parser, Debug)]
#[command(name = "warroom")]
#[command(author, version, about = "War room - a panel of expert agents deliberates and reaches consensus")]
#[command(long_about = r#"
Warroom puts a task in front of a panel of expert agents, phase by phase,
then clusters their answers into a confidence-scored recommendation.

Phases run in order: brainstorm, development, product, ux, design,
marketing, security, testing. Low-confidence runs iterate.

Configuration files are loaded from (in priority order):
1. WARROOM_* environment variables (nested keys use __)
2. --config <path>     Explicit config file
3. ./warroom.toml      Project-level config
4. ~/.config/warroom/config.toml   Global config

Example:
  warroom run "Build a chat app for remote teams"
  warroom run --phase development --phase security "Add SSO to our dashboard"
  warroom ask --agent security-architect "Is JWT in local storage acceptable?"
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration sources and the merged configuration, then exit
    #[arg(long, global = true)]
    pub show_config: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full workflow on a task
    Run(RunArgs),
    /// Ask a single agent a question
    Ask(AskArgs),
    /// List the agent catalog grouped by category
    Agents,
    /// List the phase plan with eligible agents
    Phases,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// The task to deliberate
    pub task: String,

    /// Restrict the run to these phases (repeatable, plan order is kept)
    #[arg(short, long = "phase", value_name = "NAME")]
    pub phases: Vec<String>,

    /// Maximum number of full passes over the phases
    #[arg(long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Response language (en-US, pt-BR, es-ES, fr-FR, de-DE)
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// Output format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputArg>,

    /// Include the deep analysis layer in the synthesis
    #[arg(long)]
    pub deep: bool,

    /// Ignore configured providers and use the offline backend
    #[arg(long)]
    pub offline: bool,

    /// Append workflow events to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub events_log: Option<PathBuf>,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Agent id from the catalog
    #[arg(short, long, value_name = "ID")]
    pub agent: String,

    /// The question to ask
    pub question: String,

    /// Optional background for the question
    #[arg(long, value_name = "TEXT")]
    pub context: Option<String>,

    /// Response language
    #[arg(short, long, value_name = "CODE")]
    pub language: Option<String>,

    /// Ignore configured providers and use the offline backend
    #[arg(long)]
    pub offline: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments() {
        let cli = Cli::try_parse_from([
            "warroom",
            "-vv",
            "run",
            "--phase",
            "ux",
            "--phase",
            "security",
            "--max-iterations",
            "2",
            "--output",
            "json",
            "--offline",
            "Build a chat app",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Some(Command::Run(run)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(run.task, "Build a chat app");
        assert_eq!(run.phases, vec!["ux", "security"]);
        assert_eq!(run.max_iterations, Some(2));
        assert_eq!(run.output.map(OutputFormat::from), Some(OutputFormat::Json));
        assert!(run.offline);
    }

    #[test]
    fn test_ask_requires_agent() {
        assert!(Cli::try_parse_from(["warroom", "ask", "question"]).is_err());
        let cli = Cli::try_parse_from(["warroom", "ask", "--agent", "qa-lead", "How?"]).unwrap();
        assert!(matches!(cli.command, Some(Command::Ask(ref a)) if a.agent == "qa-lead"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["warroom", "agents", "--no-config"]).unwrap();
        assert!(cli.no_config);
        assert!(matches!(cli.command, Some(Command::Agents)));
    }
}
