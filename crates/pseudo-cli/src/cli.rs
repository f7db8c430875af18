//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "pseudo", version, about = "Run pseudocode programs")]
pub struct Cli {
    /// Log interpreter activity at debug level (overrides PSEUDO_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// When to colour diagnostics.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto, global = true)]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Execute a program file.
    Run {
        file: PathBuf,
        /// Print errors as JSON on stdout.
        #[arg(long)]
        json: bool,
        /// Seed for RAND, for reproducible runs.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Start an interactive session.
    Repl {
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    /// The subcommand to run; a bare `pseudo` starts the REPL.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Repl { seed: None })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_arguments_means_repl() {
        let cli = Cli::try_parse_from(["pseudo"]).expect("parse");
        assert_eq!(cli.command(), Command::Repl { seed: None });
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn run_with_flags() {
        let cli = Cli::try_parse_from([
            "pseudo", "run", "prog.pseudo", "--json", "--seed", "7", "--verbose", "--color", "never",
        ])
        .expect("parse");
        assert!(cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
        assert_eq!(
            cli.command(),
            Command::Run {
                file: PathBuf::from("prog.pseudo"),
                json: true,
                seed: Some(7),
            }
        );
    }

    #[test]
    fn run_requires_a_file() {
        assert!(Cli::try_parse_from(["pseudo", "run"]).is_err());
    }
}
