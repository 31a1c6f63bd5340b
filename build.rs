//! Build script rendering manual pages for `flowprobe` and each of its
//! subcommands from the CLI definition.

use std::{
    env,
    fs,
    path::{Path, PathBuf},
};

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli.rs"]
mod cli;

fn render(cmd: Command, title: &str, out_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mut buf: Vec<u8> = Vec::new();
    Man::new(cmd).title(title).section("1").render(&mut buf)?;
    fs::write(out_dir.join(format!("{title}.1")), buf)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?).join("man");
    fs::create_dir_all(&out_dir)?;

    let cmd = cli::Cli::command();
    for sub in cmd.get_subcommands() {
        render(sub.clone(), &format!("flowprobe-{}", sub.get_name()), &out_dir)?;
    }
    render(cmd, "flowprobe", &out_dir)?;

    Ok(())
}
