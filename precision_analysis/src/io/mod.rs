//! File input and output helpers for pose data.

use std::fs::File;
use std::io::{self, Read, Write};

pub mod poses;

pub use poses::{
    format_record, parse_points, parse_records, parse_records_strict, read_poses, write_records,
    PoseError, PoseRecord,
};

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Writes a string to a file, replacing any existing contents.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}
