use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;

use apex_pmd::config::{self, Config, ConfigOverrides};
use apex_pmd::linter::{Diagnostic, LintRunner, MemorySink, MemoryStatus, RunState, Severity};

mod cli;
use cli::{Cli, Commands, OutputFormat, PmdArgs};

/// Exit code for runs that could not produce a report.
const EXIT_RUN_FAILED: i32 = 2;

fn read_all(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn start_dir_for(input_path: Option<&Path>) -> io::Result<PathBuf> {
    match input_path {
        Some(p) if p.is_dir() => Ok(p.to_path_buf()),
        Some(p) => Ok(p.parent().unwrap_or(Path::new(".")).to_path_buf()),
        None => std::env::current_dir(),
    }
}

fn load_config(explicit: Option<&Path>, input: Option<&Path>, pmd: PmdArgs) -> io::Result<Config> {
    let start_dir = start_dir_for(input)?;
    let (mut cfg, cfg_path) = config::load(explicit, &start_dir)?;

    if let Some(path) = &cfg_path {
        log::debug!("Using config from: {}", path.display());
    } else {
        log::debug!("Using default config");
    }

    ConfigOverrides {
        pmd_path: pmd.pmd_path,
        ruleset_path: pmd.ruleset,
        error_threshold: pmd.error_threshold,
        warning_threshold: pmd.warning_threshold,
        java: pmd.java,
    }
    .apply(&mut cfg);

    Ok(cfg)
}

fn main() -> io::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            target,
            pmd,
            format,
            check,
            dry_run,
        } => {
            let cfg = load_config(cli.config.as_deref(), target.as_deref(), pmd)?;
            let target = match target {
                Some(t) => t,
                None => std::env::current_dir()?,
            };
            let runner = LintRunner::new(cfg);
            let rt = tokio::runtime::Runtime::new()?;

            if dry_run {
                match rt.block_on(runner.command_for(&target)) {
                    Ok(command) => println!("{command}"),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(EXIT_RUN_FAILED);
                    }
                }
                return Ok(());
            }

            let sink = MemorySink::new();
            let status = MemoryStatus::new();
            let state = rt.block_on(runner.run(&target, &sink, &status));
            finish(state, &sink, format, check)
        }
        Commands::Parse {
            file,
            pmd,
            format,
            check,
        } => {
            let cfg = load_config(cli.config.as_deref(), file.as_deref(), pmd)?;
            let report = read_all(file.as_ref())?;
            let runner = LintRunner::new(cfg);
            let rt = tokio::runtime::Runtime::new()?;

            let sink = MemorySink::new();
            let status = MemoryStatus::new();
            let state = rt.block_on(runner.publish_output(report, &sink, &status));
            finish(state, &sink, format, check)
        }
        #[cfg(feature = "lsp")]
        Commands::Lsp => {
            // LSP needs tokio runtime
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async { apex_pmd::lsp::run().await })?;
            Ok(())
        }
        #[cfg(not(feature = "lsp"))]
        Commands::Lsp => {
            eprintln!("Error: apex-pmd was built without the `lsp` feature");
            std::process::exit(EXIT_RUN_FAILED);
        }
    }
}

fn finish(state: RunState, sink: &MemorySink, format: OutputFormat, check: bool) -> io::Result<()> {
    let report = match state {
        RunState::Completed(report) => report,
        RunState::Failed(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_RUN_FAILED);
        }
        other => {
            eprintln!("Error: run ended in state {}", other.name());
            std::process::exit(EXIT_RUN_FAILED);
        }
    };

    if let Some(e) = &report.process_error {
        eprintln!("warning: PMD reported an error: {}", e);
    }
    for path in &report.unreadable {
        eprintln!("warning: could not read {}, its diagnostics were dropped", path);
    }

    let files = sink.snapshot();
    let total: usize = files.values().map(Vec::len).sum();

    match format {
        OutputFormat::Human => print_diagnostics(&files, total, report.issue_count, check),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&files).map_err(io::Error::other)?;
            println!("{json}");
        }
    }

    if check && total > 0 {
        std::process::exit(1);
    }

    Ok(())
}

/// `issue_count` is PMD's own count (output lines minus the header row). It
/// differs from `total` when rows were skipped or files could not be read.
fn print_diagnostics(
    files: &BTreeMap<String, Vec<Diagnostic>>,
    total: usize,
    issue_count: usize,
    check: bool,
) {
    if total == 0 {
        if !check {
            println!("No issues found");
        }
        print_issue_count(total, issue_count);
        return;
    }

    for (path, diagnostics) in files {
        for diag in diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "\x1b[31merror\x1b[0m",     // red
                Severity::Warning => "\x1b[33mwarning\x1b[0m", // yellow
                Severity::Hint => "\x1b[34mhint\x1b[0m",       // blue
            };

            println!(
                "{severity_str}[{}]: {} at {}:{}:{}",
                diag.rule,
                diag.message,
                path,
                diag.range.start.line + 1,
                diag.range.start.character + 1
            );
        }
    }

    println!("\nFound {} issue(s)", total);
    print_issue_count(total, issue_count);
}

fn print_issue_count(total: usize, issue_count: usize) {
    if issue_count != total {
        println!("PMD reported {} issue(s)", issue_count);
    }
}
