use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "apex-pmd")]
#[command(author, version)]
#[command(about = "Run PMD on Apex sources and report its findings")]
#[command(
    long_about = "apex-pmd runs the PMD static analyzer on Salesforce Apex sources, parses its \
    CSV report and turns every finding into a diagnostic with a severity derived from PMD's \
    priority. Results are printed on the command line or published to editors through the \
    language server."
)]
#[command(after_help = "\
EXAMPLES:

    # Analyse the current directory
    apex-pmd check

    # Analyse one class and fail if anything is reported
    apex-pmd check --check force-app/main/default/classes/Foo.cls

    # Show the PMD command without running it
    apex-pmd check --dry-run

    # Turn a saved PMD CSV report into diagnostics
    apex-pmd parse report.csv

CONFIGURATION:

apex-pmd looks for configuration files in this order:
  1. Explicit --config path
  2. apex-pmd.toml or .apex-pmd.toml in current/parent directories
  3. ~/.config/apex-pmd/config.toml (XDG)
  4. Built-in defaults

Example .apex-pmd.toml:

    pmd_path = \"tools/pmd-bin-6.55.0\"
    ruleset = \"config/apex-ruleset.xml\"
    error_threshold = 1
    warning_threshold = 3")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, global = true)]
    #[arg(help = "Path to configuration file")]
    #[arg(
        long_help = "Path to a custom configuration file. If not specified, apex-pmd will \
        search for .apex-pmd.toml or apex-pmd.toml in the current directory and its parents, \
        then fall back to ~/.config/apex-pmd/config.toml."
    )]
    pub config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One colored line per diagnostic
    #[default]
    Human,
    /// Diagnostics grouped by file, as JSON
    Json,
}

/// Settings that take precedence over the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct PmdArgs {
    /// PMD installation directory
    #[arg(long, env = "APEX_PMD_PATH", value_name = "DIR")]
    pub pmd_path: Option<PathBuf>,

    /// Ruleset XML passed to PMD
    #[arg(long, env = "APEX_PMD_RULESET", value_name = "FILE")]
    pub ruleset: Option<PathBuf>,

    /// Priorities at or below this are errors
    #[arg(long, env = "APEX_PMD_ERROR_THRESHOLD", value_name = "PRIORITY")]
    pub error_threshold: Option<i64>,

    /// Priorities at or below this are warnings
    #[arg(long, env = "APEX_PMD_WARNING_THRESHOLD", value_name = "PRIORITY")]
    pub warning_threshold: Option<i64>,

    /// Java launcher used to start PMD
    #[arg(long, env = "APEX_PMD_JAVA", value_name = "PROGRAM")]
    pub java: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run PMD on a file or directory
    #[command(
        long_about = "Run PMD on a file or directory and print one diagnostic per finding. \
        Ranges are narrowed to the content of the reported line, so columns match what an \
        editor would underline. When some rows were skipped or a reported file could not be \
        read, the summary also shows the number of issues PMD itself reported."
    )]
    #[command(after_help = "\
EXAMPLES:

    # Analyse the current directory
    apex-pmd check

    # JSON output grouped by file
    apex-pmd check --format json src/classes

    # Exit with code 1 when PMD reports anything
    apex-pmd check --check src/classes

EXIT CODES:

  0  Run completed
  1  --check was given and diagnostics were found
  2  PMD could not be started (missing installation or ruleset) or failed without output")]
    Check {
        /// File or directory to analyse (current directory if not provided)
        #[arg(help = "File or directory to analyse")]
        target: Option<PathBuf>,

        #[command(flatten)]
        pmd: PmdArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Exit with code 1 if any diagnostics are produced
        #[arg(long)]
        check: bool,

        /// Print the PMD command instead of running it
        #[arg(long)]
        dry_run: bool,
    },
    /// Convert a saved PMD CSV report into diagnostics
    #[command(
        long_about = "Read a PMD report produced with `-f csv` and print the diagnostics it \
        describes, exactly as `check` would after running PMD itself."
    )]
    #[command(after_help = "\
EXAMPLES:

    # Parse a saved report
    apex-pmd parse report.csv

    # Parse from stdin
    pmd -d src -f csv -R rules.xml | apex-pmd parse --format json")]
    Parse {
        /// Input file (stdin if not provided)
        #[arg(help = "PMD CSV report")]
        file: Option<PathBuf>,

        #[command(flatten)]
        pmd: PmdArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
        format: OutputFormat,

        /// Exit with code 1 if any diagnostics are produced
        #[arg(long)]
        check: bool,
    },
    /// Start the Language Server Protocol server
    #[command(
        long_about = "Start the apex-pmd Language Server Protocol (LSP) server. The server runs \
        PMD when Apex files are opened or saved and publishes the findings as diagnostics."
    )]
    #[command(after_help = "\
The LSP server communicates via stdin/stdout and is typically launched automatically by your \
editor's LSP client. You generally don't need to run this command manually.")]
    Lsp,
}
