// ABOUTME: Builds ready-to-load SQL scripts from an import header and exported data
// ABOUTME: Concatenates header, COPY TEXT data and the \. end-of-data marker

use crate::export::statements::END_OF_DATA;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Write `header`, the contents of `data_path`, and the end-of-data marker to `output_path`
///
/// The data is copied verbatim. A newline is inserted before `\.` when the
/// data does not already end with one. Returns the number of data bytes copied.
pub fn assemble_script(header: &str, data_path: &Path, output_path: &Path) -> Result<u64> {
    let mut data = File::open(data_path)
        .with_context(|| format!("Failed to open exported data: {}", data_path.display()))?;
    let needs_newline = !ends_with_newline(&mut data)
        .with_context(|| format!("Failed to read exported data: {}", data_path.display()))?;

    let out = File::create(output_path)
        .with_context(|| format!("Failed to create script: {}", output_path.display()))?;
    let mut out = BufWriter::new(out);

    out.write_all(header.as_bytes())?;
    if !header.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    let copied = std::io::copy(&mut data, &mut out)
        .with_context(|| format!("Failed to copy data into {}", output_path.display()))?;
    if needs_newline {
        out.write_all(b"\n")?;
    }
    writeln!(out, "{}", END_OF_DATA)?;
    out.flush()
        .with_context(|| format!("Failed to write script: {}", output_path.display()))?;

    tracing::debug!(
        "Assembled {} ({} data bytes)",
        output_path.display(),
        copied
    );
    Ok(copied)
}

/// True for an empty file or one whose last byte is `\n`; leaves the cursor at the start
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(true);
    }

    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    file.seek(SeekFrom::Start(0))?;
    Ok(last[0] == b'\n')
}
