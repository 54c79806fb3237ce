//! BatchShrink CLI - interactive shrinker for oversized images
//!
//! Asks for a folder, then resizes every oversized JPEG/PNG in it into the
//! `output` folder next to the executable.

use std::process;
use std::time::Duration;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use batchshrink::discovery::prompt_scan_root;
use batchshrink::parallel::ProgressTracker;
use batchshrink::{init, prepare_output_dir, BatchOutcome, Config, Pipeline, RunReport};

/// BatchShrink - shrink the oversized images of a folder
#[derive(Parser)]
#[command(
    name = "batchshrink",
    version,
    about = "Interactively shrink oversized images in a folder",
    long_about = "BatchShrink asks for a folder, skips files whose names match the ignore list, \
                  and resizes every JPEG/PNG with a side above the threshold so its long side \
                  fits the target size. Results keep their filename and EXIF metadata and are \
                  written to the `output` folder next to the executable. Settings can be \
                  changed with a batchshrink.toml or batchshrink.yaml file in that same folder."
)]
struct Cli {}

#[tokio::main]
async fn main() {
    let _cli = Cli::parse();

    let config = match Config::discover() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = init(&config) {
        eprintln!("{}: Failed to initialize BatchShrink: {}", style("Error").red().bold(), e);
        process::exit(1);
    }

    println!("{}", style("Image Resizer").bold());
    println!();
    println!(
        "Resizes images wider or taller than {} px to at most {} px, skipping ignored files.",
        config.resize.threshold, config.resize.target
    );
    println!();

    let output_dir = match config.output_dir().and_then(|dir| {
        prepare_output_dir(&dir)?;
        Ok(dir)
    }) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}: Cannot prepare output folder: {}", style("Error").red().bold(), e);
            process::exit(1);
        }
    };
    debug!("Output folder: {:?}", output_dir);

    let root = match prompt_scan_root() {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{}: {}", style("Error").red().bold(), e.user_message());
            process::exit(1);
        }
    };

    let bar = progress_bar();
    let pipeline = Pipeline::new(config, output_dir).with_progress(ProgressTracker::new().with_bar(bar.clone()));

    let outcome = pipeline.run(&root).await;
    bar.finish_and_clear();

    match outcome {
        Ok(report) => print_report(&report, &pipeline),
        Err(e) => {
            eprintln!("{}: Processing failed: {}", style("Error").red().bold(), e.user_message());
            process::exit(1);
        }
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
    {
        bar.set_style(bar_style.progress_chars("#>-"));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Print what the run did; every path here exits with status 0
fn print_report(report: &RunReport, pipeline: &Pipeline) {
    let resolution = &report.resolution;
    if resolution.fallback_used {
        println!(
            "{}: Too few images in the chosen folder, used {}",
            style("Info").blue().bold(),
            resolution.root.display()
        );
    }

    for skipped in &report.skipped {
        println!("{}: {}", style("Skipped").yellow(), skipped);
    }

    println!(
        "{} image(s) measured, {} oversized",
        report.measured, report.oversized
    );

    match &report.outcome {
        BatchOutcome::NothingToDo => {
            println!(
                "{}: No image needs resizing, nothing to do.",
                style("Done").green().bold()
            );
        }
        BatchOutcome::TooMany { count, limit } => {
            println!(
                "{}: {} images need resizing, more than the limit of {}. \
                 Nothing was resized; check that this is the right folder.",
                style("Warning").yellow().bold(),
                count,
                limit
            );
        }
        BatchOutcome::Completed(result) => {
            println!();
            result.print_summary();
            println!();
            println!(
                "{}: {} image(s) written to {}",
                style("Done").green().bold(),
                result.successful(),
                pipeline.output_dir().display()
            );
        }
    }
}
