use std::{env, fs, process};

use anyhow::{Context, Result};
use notemark_engine::parse;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: notemark <file.md>");
        process::exit(2);
    };

    let source = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let document = parse(&source);
    let json = serde_json::to_string_pretty(&document).context("serializing document")?;
    println!("{json}");
    Ok(())
}
