//! # photo-dedup-remote CLI
//!
//! Command-line interface for the remote photo duplicate detector.
//!
//! ## Usage
//! ```bash
//! photo-dedup-remote run photos.csv --threshold 1
//! photo-dedup-remote run photos.csv --workers 20 --output json
//! ```

mod cli;

use photo_dedup_remote::Result;

fn main() -> Result<()> {
    cli::run()
}
