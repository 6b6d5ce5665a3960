//! voice-clone CLI entry point.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::warn;
use voice_clone_rs::backend::HttpEngine;
use voice_clone_rs::cli::SynthArgs;
use voice_clone_rs::config::ConfigResolver;
use voice_clone_rs::interrupt::Interrupt;
use voice_clone_rs::logging;
use voice_clone_rs::synth::{BatchReport, GenerationRequest, SynthesisOrchestrator};

fn main() -> Result<()> {
    let args = SynthArgs::parse();
    logging::init(args.verbose);
    let interrupt = Interrupt::install().context("Failed to install Ctrl-C handler")?;

    let resolver = ConfigResolver::from_path(&args.config);
    let voice = match resolver.resolve_voice(&args.voice) {
        Ok(voice) => voice,
        Err(e) => {
            print_available_voices(&resolver);
            return Err(e).context("Voice lookup failed");
        }
    };
    println!("Using voice: {} ({})", voice.name, voice.sample_path.display());

    let mut config = resolver.into_config();
    let engine = HttpEngine::from_config(&config.model).context("Failed to create engine client")?;

    if let Some(dir) = &args.batch {
        // Batch files share one set of parameters, so overrides go into the config.
        if let Some(temperature) = args.temperature {
            config.model.temperature = temperature;
        }
        if let Some(speed) = args.speed {
            config.model.speed = speed;
        }
        if args.output.is_some() {
            warn!("--output is ignored in batch mode");
        }

        let mut orchestrator = SynthesisOrchestrator::new(engine, config);
        let report = orchestrator
            .generate_batch(dir, &voice, args.language, &interrupt)
            .with_context(|| format!("Batch generation failed for {}", dir.display()))?;
        print_batch_summary(&report);
        return Ok(());
    }

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read text file: {}", path.display()))?,
        None => args.text.clone().unwrap_or_default(),
    };

    let request = GenerationRequest {
        language: args.language,
        temperature: args.temperature,
        speed: args.speed,
        output: args.output.clone(),
        ..GenerationRequest::new(text, voice)
    };

    let mut orchestrator = SynthesisOrchestrator::new(engine, config);
    let path = orchestrator
        .generate(&request)
        .context("Failed to generate speech")?;

    if interrupt.is_triggered() {
        bail!("Interrupted");
    }

    print_result(&path);
    Ok(())
}

fn print_available_voices(resolver: &ConfigResolver) {
    let mut names: Vec<String> = resolver.config().voices.keys().cloned().collect();
    if let Ok(found) = resolver.library().list() {
        names.extend(found.into_iter().map(|profile| profile.name));
    }
    names.sort();
    names.dedup();

    if names.is_empty() {
        eprintln!("No voices available. Record one with: record-voice --output voices/<name>.wav");
    } else {
        eprintln!("Available voices: {}", names.join(", "));
    }
}

fn print_result(path: &Path) {
    println!("\n✓ Success! Audio saved to: {}", path.display());
    if let Ok(metadata) = fs::metadata(path) {
        println!("  File size: {:.1} KB", metadata.len() as f64 / 1024.0);
    }
}

fn print_batch_summary(report: &BatchReport) {
    println!("\nBatch complete: {} file(s) generated", report.outputs.len());
    for path in &report.outputs {
        println!("  ✓ {}", path.display());
    }
    for path in &report.skipped {
        println!("  - {} (empty, skipped)", path.display());
    }
    if !report.failures.is_empty() {
        println!("{} file(s) failed:", report.failures.len());
        for failure in &report.failures {
            println!("  ✗ {}: {}", failure.file.display(), failure.error);
        }
    }
}
