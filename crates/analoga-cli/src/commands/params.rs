//! Parameter listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use analoga_synth::{PARAMS, ParamUnit};
use clap::Args;

#[derive(Args)]
pub struct ParamsArgs {
    /// Only show parameters in this group (e.g. "Filter")
    #[arg(short, long)]
    group: Option<String>,
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    let params: Vec<_> = PARAMS
        .iter()
        .filter(|p| {
            args.group
                .as_deref()
                .is_none_or(|g| p.group.eq_ignore_ascii_case(g))
        })
        .collect();

    if params.is_empty() {
        anyhow::bail!(
            "No parameters in group '{}'",
            args.group.as_deref().unwrap_or_default()
        );
    }

    println!(
        "  {:16}  {:20}  {:10}  {:>10}  {}",
        "Id", "Name", "Group", "Default", "Range"
    );
    println!(
        "  {:16}  {:20}  {:10}  {:>10}  {}",
        "--", "----", "-----", "-------", "-----"
    );

    for p in params {
        let range = match p.unit {
            ParamUnit::Toggle => "off/on".to_string(),
            ParamUnit::Choice => format!("0..{}", p.max),
            unit => format!("{}..{} {}", p.min, p.max, unit.suffix()),
        };
        println!(
            "  {:16}  {:20}  {:10}  {:>10}  {}",
            p.string_id, p.name, p.group, p.default, range.trim_end()
        );
    }

    println!();
    println!("Set with: analoga render out.wav --set NAME=VALUE");
    Ok(())
}
