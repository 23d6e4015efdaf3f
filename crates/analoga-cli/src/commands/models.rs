//! Model listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use analoga_synth::{FALLBACK_PROFILE, FilterPath, MODEL_NAMES, Shaper, model_profile};
use clap::Args;

#[derive(Args)]
pub struct ModelsArgs {
    /// Show the filter voicing of each model
    #[arg(short, long)]
    verbose: bool,
}

pub fn run(args: ModelsArgs) -> anyhow::Result<()> {
    println!("Models");
    println!("======");
    println!();

    if args.verbose {
        println!(
            "  {:>3}  {:16}  {:6}  {:6}  {:5}  {:5}  {}",
            "#", "Name", "Filter", "Mode", "Drive", "Gain", "Shaper"
        );
        println!(
            "  {:>3}  {:16}  {:6}  {:6}  {:5}  {:5}  {}",
            "-", "----", "------", "----", "-----", "----", "------"
        );
    }

    for (index, name) in MODEL_NAMES.iter().enumerate() {
        let profile = model_profile(index as i32);
        if args.verbose {
            let path = match profile.path {
                FilterPath::Ladder => "ladder",
                FilterPath::Svf => "svf",
            };
            let fallback = if profile == FALLBACK_PROFILE { " *" } else { "" };
            println!(
                "  {:>3}  {:16}  {:6}  {:6}  {:5.2}  {:5.2}  {}{}",
                index,
                name,
                path,
                format!("{:?}", profile.mode),
                profile.drive,
                profile.gain,
                shaper_label(profile.shaper),
                fallback
            );
        } else {
            println!("  {:>3}  {}", index, name);
        }
    }

    println!();
    if args.verbose {
        println!("* shares the default voicing");
    } else {
        println!("Use 'analoga models --verbose' for filter voicings.");
    }
    Ok(())
}

fn shaper_label(shaper: Shaper) -> String {
    match shaper {
        Shaper::Identity => "clean".to_string(),
        Shaper::Tanh(k) => format!("tanh({k:.2}x)"),
        Shaper::Blend {
            linear,
            amount,
            drive,
        } => format!("{linear:.1}x + {amount:.1}tanh({drive:.1}x)"),
        Shaper::Cubic(k) => format!("cubic({k:.2})"),
        Shaper::Rational => "x/(1+|x|)".to_string(),
        Shaper::EvenTanh => "x·tanh(x)".to_string(),
    }
}
