use std::path::PathBuf;

use clap::{ArgGroup, Parser};

#[derive(Parser, Debug, Clone)]
#[command(name = "bugfinder", about = "Run Python code and explain why it failed", version)]
#[command(group(ArgGroup::new("source").args(["file", "code"]).multiple(false)))]
#[command(group(ArgGroup::new("format").args(["json", "md", "no_md"]).multiple(false)))]
#[command(group(ArgGroup::new("info").args(["list_explanations", "explain"]).multiple(false)))]
pub struct Cli {
    /// Python source file to analyze ("-" reads stdin).
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Analyze this code instead of a file.
    #[arg(short = 'c', long = "code", value_name = "CODE")]
    pub code: Option<String>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Render the report as Markdown.
    #[arg(long)]
    pub md: bool,
    /// Plain colored text even if PRETTIFY_MARKDOWN=true.
    #[arg(long = "no-md")]
    pub no_md: bool,

    /// Include the formatted failure trace.
    #[arg(long)]
    pub trace: bool,

    /// Python interpreter to run the code with.
    #[arg(long, value_name = "PATH")]
    pub python: Option<String>,

    /// Kill the run after this many seconds (0 = no limit).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Open the terminal editor (preloaded with FILE or CODE if given).
    #[arg(long)]
    pub tui: bool,

    /// List every explained failure type.
    #[arg(short = 'l', long = "list-explanations", visible_alias = "le")]
    pub list_explanations: bool,

    /// Show the explanation for one failure type name.
    #[arg(long, value_name = "TYPE")]
    pub explain: Option<String>,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
