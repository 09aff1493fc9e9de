//! Command-line argument definitions for the sptgen CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the generated
//! module prefix, overwrite behavior, and logging verbosity.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use sptgen::TestKind;

/// Command-line arguments for the SPT test generator
#[derive(Parser, Debug)]
#[command(name = "sptgen", author, version, about, long_about = None)]
pub struct Args {
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "SPTGEN_LOG")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// The sptgen subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover Java test projects and assemble them into fixture files
    Discover(DiscoverArgs),
    /// Generate SPT test files from marked-up fixture files
    Generate(GenerateArgs),
    /// Generate SPT move-class test files from before/after fixture pairs
    GenerateMoves(GenerateMovesArgs),
}

#[derive(clap::Args, Debug)]
pub struct DiscoverArgs {
    /// Directories with input directories and files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for output directories and files
    #[arg(short = 'o', long = "out")]
    pub output: PathBuf,

    /// Force overwrite of existing files
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct GenerateArgs {
    /// Directories with input directories and files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for output directories and files
    #[arg(short = 'o', long = "out")]
    pub output: PathBuf,

    /// Module prefix for SPT tests
    #[arg(long = "module", default_value = "refret")]
    pub module_prefix: String,

    /// Force overwrite of existing files
    #[arg(short, long)]
    pub force: bool,

    /// Include test suites that have no reference test cases
    #[arg(short, long)]
    pub all: bool,

    /// Kinds of SPT tests to generate
    #[arg(
        short = 'k',
        long = "kind",
        value_enum,
        default_values_t = [KindArg::Parsing, KindArg::Analysis, KindArg::Refret]
    )]
    pub kinds: Vec<KindArg>,
}

#[derive(clap::Args, Debug)]
pub struct GenerateMovesArgs {
    /// Directories with input directories and files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for output directories and files
    #[arg(short = 'o', long = "out")]
    pub output: PathBuf,

    /// Module prefix for SPT tests
    #[arg(long = "module", default_value = "refactoring")]
    pub module_prefix: String,

    /// Force overwrite of existing files
    #[arg(short, long)]
    pub force: bool,
}

/// The kinds of SPT tests the `generate` subcommand can emit.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Parsing,
    Analysis,
    Refret,
}

impl KindArg {
    /// The output subdirectory for this kind.
    pub fn submodule(self) -> &'static str {
        match self {
            KindArg::Parsing => "parsing",
            KindArg::Analysis => "analysis",
            KindArg::Refret => "refret",
        }
    }
}

impl From<KindArg> for TestKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Parsing => TestKind::Parsing,
            KindArg::Analysis => TestKind::Analysis,
            KindArg::Refret => TestKind::RefRet,
        }
    }
}
