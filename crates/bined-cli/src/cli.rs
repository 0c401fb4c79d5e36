use std::path::PathBuf;

use bined_core::{CodeCharactersCase, CodeType};
use bined_runtime::BitSwapOperation;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::commands::{run_bookmarks, run_convert, run_dump, run_list, run_macro};
use crate::error::Result;

#[derive(Debug, Parser)]
#[command(
    name = "bined",
    about = "Replay BinEd macros, convert bytes and dump binary files",
    version
)]
pub struct Cli {
    /// Print results and errors as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit log events as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List stored macros.
    List(ListArgs),

    /// Replay a stored macro on a file.
    Run(RunArgs),

    /// Apply a bit swap conversion to a file.
    Convert(ConvertArgs),

    /// Print a code dump of a file.
    Dump(DumpArgs),

    /// Show or edit stored bookmarks.
    Bookmarks(BookmarksArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Preferences file holding the macros.
    #[arg(long)]
    pub prefs: PathBuf,

    /// Decode every step and report the first bad line per macro.
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Preferences file holding the macros.
    #[arg(long)]
    pub prefs: PathBuf,

    /// Index of the macro to run; defaults to the last active macro.
    #[arg(long = "macro")]
    pub index: Option<usize>,

    /// Editor configuration (TOML, or JSON with a `.json` extension).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start with the caret in the text preview instead of the code matrix.
    #[arg(long)]
    pub text: bool,

    /// File to edit.
    pub input: PathBuf,

    /// Where to write the result; the input is left untouched without it.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SwapArg {
    Invert,
    Reverse,
    SwapPairs,
}

impl From<SwapArg> for BitSwapOperation {
    fn from(arg: SwapArg) -> Self {
        match arg {
            SwapArg::Invert => Self::InvertBits,
            SwapArg::Reverse => Self::ReverseBytesOrder,
            SwapArg::SwapPairs => Self::SwapPairs,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(long, value_enum)]
    pub op: SwapArg,

    /// First byte of the converted range; the whole file without it.
    #[arg(long)]
    pub start: Option<u64>,

    /// Length of the converted range, up to the file end by default.
    #[arg(long)]
    pub length: Option<u64>,

    pub input: PathBuf,

    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CodeTypeArg {
    Binary,
    Octal,
    Decimal,
    Hex,
}

impl From<CodeTypeArg> for CodeType {
    fn from(arg: CodeTypeArg) -> Self {
        match arg {
            CodeTypeArg::Binary => Self::Binary,
            CodeTypeArg::Octal => Self::Octal,
            CodeTypeArg::Decimal => Self::Decimal,
            CodeTypeArg::Hex => Self::Hexadecimal,
        }
    }
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    pub input: PathBuf,

    #[arg(long, value_enum, default_value = "hex")]
    pub code_type: CodeTypeArg,

    #[arg(long, default_value_t = 16)]
    pub bytes_per_row: u64,

    #[arg(long)]
    pub lowercase: bool,

    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Bytes to show, up to the file end by default.
    #[arg(long)]
    pub length: Option<u64>,
}

impl DumpArgs {
    #[must_use]
    pub fn characters_case(&self) -> CodeCharactersCase {
        if self.lowercase {
            CodeCharactersCase::Lower
        } else {
            CodeCharactersCase::Upper
        }
    }
}

#[derive(Debug, Args)]
pub struct BookmarksArgs {
    #[arg(long)]
    pub prefs: PathBuf,

    #[command(subcommand)]
    pub action: Option<BookmarkAction>,
}

#[derive(Debug, Subcommand)]
pub enum BookmarkAction {
    /// List bookmarks (the default).
    List,
    /// Append a bookmark.
    Add {
        #[arg(long)]
        start: u64,
        #[arg(long)]
        length: u64,
        /// Colour as `#rrggbb`.
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove the bookmark at an index.
    Remove { index: usize },
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let json = cli.json;
    let output = match cli.command {
        Commands::List(args) => run_list(&args)?,
        Commands::Run(args) => run_macro(&args)?,
        Commands::Convert(args) => run_convert(&args)?,
        Commands::Dump(args) => run_dump(&args)?,
        Commands::Bookmarks(args) => run_bookmarks(&args)?,
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&output.json)?);
    } else if !output.text.is_empty() {
        print!("{}", output.text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{BookmarkAction, Cli, Commands, SwapArg};

    #[test]
    fn global_json_flag_follows_subcommand() {
        let cli = Cli::try_parse_from(["bined", "convert", "--op", "swap-pairs", "in.bin", "--json"])
            .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Convert(ref args) if args.op == SwapArg::SwapPairs && args.output.is_none()
        ));
    }

    #[test]
    fn run_accepts_macro_index() {
        let cli = Cli::try_parse_from([
            "bined", "run", "--prefs", "p.json", "--macro", "2", "in.bin", "-o", "out.bin",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.index, Some(2));
        assert_eq!(args.output.as_deref(), Some(std::path::Path::new("out.bin")));
    }

    #[test]
    fn bookmarks_add_parses_colour() {
        let cli = Cli::try_parse_from([
            "bined", "bookmarks", "--prefs", "p.json", "add", "--start", "4", "--length", "2",
            "--color", "#ff0000",
        ])
        .unwrap();
        let Commands::Bookmarks(args) = cli.command else {
            panic!("expected bookmarks");
        };
        assert!(matches!(
            args.action,
            Some(BookmarkAction::Add { start: 4, length: 2, color: Some(ref c) }) if c == "#ff0000"
        ));
    }

    #[test]
    fn unknown_conversion_is_rejected() {
        assert!(Cli::try_parse_from(["bined", "convert", "--op", "rot13", "in.bin"]).is_err());
    }
}
