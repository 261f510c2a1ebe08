//! Command-line arguments and subcommands for the btree CLI.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{ColorMode, OutputFormat};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "btree",
    version,
    about = "Lexer, parser and validator for behavior tree scripts."
)]
pub struct BtreeArgs {
    /// Configuration file. Defaults to ./btree.yaml when present.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// When to color output.
    #[arg(long, value_enum, global = true)]
    pub color: Option<ColorMode>,

    /// Log more (-v info, -vv debug, -vvv trace). BTREE_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lex, parse and validate scripts and report every diagnostic.
    Check {
        /// Script files, or directories to search for .btree files.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Diagnostic format.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Field manifest enabling the attribute check.
        #[arg(long, value_name = "FILE")]
        fields: Option<PathBuf>,
    },
    /// Print the token stream of a script.
    Tokens {
        #[arg(required = true)]
        file: PathBuf,

        /// Print the tokens as JSON.
        #[arg(long)]
        json: bool,
    },
    /// List the validation rules a `check` would run.
    Rules {
        /// Field manifest enabling the attribute check.
        #[arg(long, value_name = "FILE")]
        fields: Option<PathBuf>,
    },
    /// Print the parsed imports and task tree of a script.
    Tree {
        #[arg(required = true)]
        file: PathBuf,

        /// Print the tree as JSON.
        #[arg(long)]
        json: bool,
    },
}
