//! Progress bar utilities for bulk loads

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for inserting `total` rows into `table`
pub fn row_progress(total: u64, table: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    pb.set_message(format!("Inserting rows into '{}'", table));
    pb
}
