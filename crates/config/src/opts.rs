//! solcst command-line options.

use crate::{CheckKind, ColorChoice, ErrorFormat, Threads, TreeFormat};
use std::path::PathBuf;

#[cfg(feature = "clap")]
use clap::{Args, Parser, Subcommand, ValueHint};

/// Concrete syntax trees and lint passes for Solidity sources.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "clap", derive(Parser))]
#[cfg_attr(feature = "clap", command(name = "solcst", version, arg_required_else_help = true))]
pub struct Opts {
    /// Number of threads to use. Zero specifies the number of logical cores.
    #[cfg_attr(
        feature = "clap",
        arg(long, short = 'j', visible_alias = "jobs", global = true, default_value_t)
    )]
    pub threads: Threads,

    /// Coloring.
    #[cfg_attr(
        feature = "clap",
        arg(help_heading = "Display options", long, value_enum, global = true, default_value_t)
    )]
    pub color: ColorChoice,
    /// How errors and other messages are produced.
    #[cfg_attr(
        feature = "clap",
        arg(help_heading = "Display options", long, value_enum, global = true, default_value_t)
    )]
    pub error_format: ErrorFormat,

    #[cfg_attr(feature = "clap", command(subcommand))]
    pub command: Command,
}

/// The action to perform.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "clap", derive(Subcommand))]
pub enum Command {
    /// Parse files and report syntax errors.
    Parse(ParseArgs),
    /// Run an analysis listener over every `.sol` file in a directory tree.
    Check(CheckArgs),
}

/// Arguments of `solcst parse`.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "clap", derive(Args))]
pub struct ParseArgs {
    /// Files to parse.
    #[cfg_attr(feature = "clap", arg(required = true, value_hint = ValueHint::FilePath))]
    pub paths: Vec<PathBuf>,
    /// Print the parse tree of each file.
    #[cfg_attr(feature = "clap", arg(long))]
    pub tree: bool,
    /// Parse tree output format.
    #[cfg_attr(feature = "clap", arg(long, value_enum, default_value_t, requires = "tree"))]
    pub tree_format: TreeFormat,
    /// Print the token stream of each file.
    #[cfg_attr(feature = "clap", arg(long))]
    pub tokens: bool,
}

/// Arguments of `solcst check`.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "clap", derive(Args))]
pub struct CheckArgs {
    /// Directory to search for `.sol` files, recursively.
    #[cfg_attr(feature = "clap", arg(value_hint = ValueHint::DirPath))]
    pub dir: PathBuf,
    /// The check to run.
    #[cfg_attr(feature = "clap", arg(long, short, value_enum))]
    pub check: CheckKind,
}

#[cfg(all(test, feature = "clap"))]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[test]
    fn parse_check_command() {
        let opts = Opts::try_parse_from([
            "solcst",
            "check",
            "contracts",
            "--check",
            "missing-restricted",
            "-j",
            "2",
        ])
        .unwrap();
        assert_eq!(opts.threads.get(), 2);
        let Command::Check(args) = opts.command else { panic!("expected check") };
        assert_eq!(args.check, CheckKind::MissingRestricted);
        assert_eq!(args.dir, PathBuf::from("contracts"));
    }

    #[test]
    fn tree_format_requires_tree() {
        assert!(Opts::try_parse_from(["solcst", "parse", "a.sol", "--tree-format", "json"]).is_err());
        let opts =
            Opts::try_parse_from(["solcst", "parse", "a.sol", "--tree", "--tree-format", "json"])
                .unwrap();
        let Command::Parse(args) = opts.command else { panic!("expected parse") };
        assert_eq!(args.tree_format, TreeFormat::Json);
    }
}
