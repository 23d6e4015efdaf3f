//! Console mode listing command.

use analoga_effects::CONSOLE_MODES;
use clap::Args;

#[derive(Args)]
pub struct ConsolesArgs {}

pub fn run(_args: ConsolesArgs) -> anyhow::Result<()> {
    println!("Console Modes");
    println!("=============");
    println!();

    for (index, mode) in CONSOLE_MODES.iter().enumerate() {
        let mut stages = vec!["eq"];
        if mode.tone2.is_some() {
            stages.push("eq2");
        }
        if mode.compressor.is_some() {
            stages.push("comp");
        }
        stages.push("sat");
        println!("  {:>2}  {:18}  {}", index, mode.name, stages.join(" → "));
    }

    println!();
    println!("Select with: analoga render out.wav --set CONSOLE_ON=1 --set CONSOLE_MODEL=<n>");
    Ok(())
}
