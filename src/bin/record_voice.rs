//! record-voice CLI entry point.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use voice_clone_rs::audio::{AudioIo, AudioSample};
use voice_clone_rs::cli::RecordArgs;
use voice_clone_rs::interrupt::Interrupt;
use voice_clone_rs::logging;
use voice_clone_rs::preprocess::{AudioPreprocessor, Processed, remove_outputs};
use voice_clone_rs::record::Recorder;
use voice_clone_rs::validate::ValidationReport;

fn main() -> Result<()> {
    let args = RecordArgs::parse();
    logging::init(args.verbose);
    let interrupt = Interrupt::install().context("Failed to install Ctrl-C handler")?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let preprocessor = AudioPreprocessor::new();
    let sample = match &args.input {
        Some(input) => load_input(input)?,
        None => Recorder::new()
            .record(args.duration, &interrupt)
            .context("Recording failed")?,
    };

    if interrupt.is_triggered() {
        bail!("Interrupted");
    }

    let processed = if args.split {
        preprocessor
            .process_chunks(sample, &args.output, &interrupt)
            .context("Failed to process audio")?
    } else {
        vec![
            preprocessor
                .process(sample, &args.output)
                .context("Failed to process audio")?,
        ]
    };

    if interrupt.is_triggered() {
        remove_outputs(&processed);
        bail!("Interrupted");
    }

    print_results(&processed);
    Ok(())
}

/// Validate and load an existing recording.
fn load_input(input: &Path) -> Result<AudioSample> {
    if !input.is_file() {
        bail!("Input file not found: {}", input.display());
    }

    println!("Validating input audio...");
    let sample = AudioIo::load(input)
        .with_context(|| format!("Failed to load audio file: {}", input.display()))?;
    let size = AudioIo::file_size(input)?;
    let report = ValidationReport::from_sample(input, &sample, size);
    println!("{report}");
    report.log();

    Ok(sample)
}

fn print_results(processed: &[Processed]) {
    for item in processed {
        println!("\n{}", item.report);
        item.report.log();
    }

    println!("\n✓ Voice sample ready!");
    for item in processed {
        println!("  {}", item.path.display());
    }

    if let Some(first) = processed.first() {
        let name = first
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "my_voice".to_string());
        println!("\nYou can now use this voice with:");
        println!("  voice-clone \"Your text here\" --voice {name}");
    }
}
