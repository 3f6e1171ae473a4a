//! Batch CLI command

use std::path::Path;
use std::time::Instant;

use crate::batch::{batch_inspect, find_asset_files};
use crate::cli::progress::{LOOKING_GLASS, TRUCK, print_done, print_step, simple_bar};
use crate::options::DecodeOptions;

/// Decode every model and motion file under `dir` and print a summary.
pub fn execute(dir: &Path, options: &DecodeOptions, quiet: bool) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(1, 2, LOOKING_GLASS, &format!("Scanning {}...", dir.display()));
    }
    let files = find_asset_files(dir);
    if files.is_empty() {
        anyhow::bail!("no .mod, .scm or .mot files found in {}", dir.display());
    }

    if !quiet {
        print_step(2, 2, TRUCK, &format!("Decoding {} files...", files.len()));
    }
    let pb = (!quiet).then(|| simple_bar(files.len() as u64, "Decoding"));
    let result = batch_inspect(&files, options, |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    });
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    for line in &result.results {
        println!("{line}");
    }
    println!();
    println!(
        "Decoded {} files, {} failed",
        result.success_count, result.fail_count
    );

    if !quiet {
        print_done(started.elapsed());
    }
    Ok(())
}
