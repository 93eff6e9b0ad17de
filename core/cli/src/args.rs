//! Command line arguments for the `pi` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "pi",
    author,
    version,
    about = "Data-driven lexer, parser and symbol inference",
    long_about = "The 'pi' command runs the pi pipeline over source files: lex, parse, \
populate symbols and infer their types, or compute completions at a cursor position. \
The language is chosen from the file extension unless --lang is given."
)]
pub(crate) struct Cli {
    /// TOML configuration file. Missing files fall back to the defaults.
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Language name, overriding detection from the file extension.
    #[arg(long, global = true)]
    pub(crate) lang: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the tokens of a file.
    Lex {
        path: PathBuf,
        /// Include whitespace and comment tokens.
        #[arg(long)]
        all: bool,
    },
    /// Print the syntax tree of a file.
    Parse {
        path: PathBuf,
        /// Recovery policy on parse errors; overrides the configuration.
        #[arg(long, value_enum)]
        recovery: Option<Recovery>,
    },
    /// Populate symbols and infer their types for a file or a directory.
    Symbols(SymbolsArgs),
    /// Completions, or the definition with --lookup, at a cursor position.
    Complete(CompleteArgs),
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Recovery {
    Abandon,
    Resync,
}

#[derive(Args)]
pub(crate) struct SymbolsArgs {
    /// Source file, or a directory searched recursively.
    pub(crate) path: PathBuf,
    /// Keep function parameters and locals in the output.
    #[arg(long)]
    pub(crate) fun_internal: bool,
    /// Print JSON instead of an indented tree.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args)]
pub(crate) struct CompleteArgs {
    pub(crate) path: PathBuf,
    /// One-based line of the cursor.
    #[arg(long)]
    pub(crate) line: u32,
    /// One-based column of the cursor; defaults to the end of the line.
    #[arg(long)]
    pub(crate) col: Option<u32>,
    /// Show the definition of the term before the cursor instead.
    #[arg(long)]
    pub(crate) lookup: bool,
}
