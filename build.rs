use clap::{Command, CommandFactory};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;
use std::fs;
use std::io::Result;
use std::path::Path;

#[path = "src/cli.rs"]
mod cli;

const BIN_NAME: &str = "apex-pmd";
const MAN_DIR: &str = "target/man";

/// Render `cmd` as a man page titled `title`.
fn render_man(cmd: Command, title: &str) -> Result<String> {
    let mut buffer = Vec::new();
    Man::new(cmd).title(title).render(&mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn write_man_pages(out_dir: &Path) -> Result<()> {
    fs::create_dir_all(out_dir)?;
    let cli = cli::Cli::command();

    fs::write(
        out_dir.join(format!("{BIN_NAME}.1")),
        render_man(cli.clone(), BIN_NAME)?,
    )?;

    // apex-pmd-check.1, apex-pmd-parse.1, apex-pmd-lsp.1
    for sub in cli.get_subcommands().filter(|s| s.get_name() != "help") {
        let title = format!("{BIN_NAME}-{}", sub.get_name());
        let page = render_man(sub.clone(), &title)?
            .replace(&format!("{} \\-", sub.get_name()), &format!("{title} \\-"));
        fs::write(out_dir.join(format!("{title}.1")), page)?;
    }

    Ok(())
}

fn main() -> Result<()> {
    if let Some(out_dir) = std::env::var_os("OUT_DIR") {
        let mut cli = cli::Cli::command();
        for shell in [
            Shell::Bash,
            Shell::Fish,
            Shell::Zsh,
            Shell::PowerShell,
            Shell::Elvish,
        ] {
            generate_to(shell, &mut cli, BIN_NAME, &out_dir)?;
        }
    }

    write_man_pages(Path::new(MAN_DIR))?;

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}
