#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

pub const SAMPLE_LISTINGS: &str = "listings_sample.csv";

/// Header shared by the generated listing files.
pub const LISTING_HEADER: &str = "listing_id,latitude,longitude,room_type,guests,ttm_avg_rate_native,ttm_occupancy,superhost";

/// Returns the absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes a listing file with [`LISTING_HEADER`] and the given data lines.
    pub fn write_listings(&self, name: &str, lines: &[String]) -> PathBuf {
        let mut contents = String::from(LISTING_HEADER);
        contents.push('\n');
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }
        self.write(name, &contents)
    }
}

/// One data line matching [`LISTING_HEADER`].
pub fn listing_line(
    id: &str,
    room_type: &str,
    guests: i64,
    rate: i64,
    occupancy: f64,
    superhost: bool,
) -> String {
    format!("{id},-8.65,115.13,{room_type},{guests},{rate},{occupancy},{superhost}")
}
