//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for interview-coach
#[derive(Parser, Debug)]
#[command(name = "coach")]
#[command(author, version, about = "Automated technical interview with adaptive difficulty")]
#[command(long_about = r#"
interview-coach runs a simulated technical interview against an LLM backend.

Three agents cooperate behind the scenes: an observer classifies every
answer, an interviewer drives the visible dialogue, and an evaluator writes
the final feedback when the interview ends.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./coach.toml        Project-level config
3. ~/.config/interview-coach/config.toml   Global config

Example:
  coach
  coach --model gpt-4o --max-turns 10
  coach --job-description ./jd.txt
"#)]
pub struct Cli {
    /// Model identifier, as understood by the completion backend
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Maximum number of interview turns
    #[arg(long, value_name = "N")]
    pub max_turns: Option<u32>,

    /// Path to a job description file the interview should target
    #[arg(short, long, value_name = "PATH")]
    pub job_description: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the welcome banner
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["coach", "--model", "gpt-4o", "--max-turns", "5", "-vv"]);
        assert_eq!(cli.model.as_deref(), Some("gpt-4o"));
        assert_eq!(cli.max_turns, Some(5));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.no_config);
    }

    #[test]
    fn defaults_are_empty() {
        let cli = Cli::parse_from(["coach"]);
        assert!(cli.model.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.quiet);
    }
}
