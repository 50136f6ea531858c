//! TSV Sources
//!
//! Reads and writes pre-sorted `key<TAB>value` text, one entry per line.
//!
//! ## Format
//! ```text
//! apple\t3
//! banana\t7
//! cherry\t
//! ```
//! - The key ends at the first tab; the value is the rest of the line
//!   (it may itself contain tabs, or be empty)
//! - Blank lines are skipped
//! - `\r\n` line endings are accepted
//!
//! Order is not checked here. Merging with validation enabled reports an
//! unsorted file.

use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{AccumergeError, Result};

/// Parse entries from a reader
pub fn parse_entries<R: BufRead>(reader: R) -> Result<Vec<(String, String)>> {
    let mut entries = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }
        let (key, value) = line.split_once('\t').ok_or_else(|| AccumergeError::Parse {
            line: idx + 1,
            reason: "missing tab separator".to_string(),
        })?;
        entries.push((key.to_string(), value.to_string()));
    }
    Ok(entries)
}

/// Read every entry of the file at `path`
pub fn read_entries(path: &Path) -> Result<Vec<(String, String)>> {
    let file = File::open(path)?;
    let entries = parse_entries(BufReader::new(file))?;
    debug!(path = %path.display(), entries = entries.len(), "Read TSV source");
    Ok(entries)
}

/// Write entries as TSV lines, returning the number written
pub fn write_entries<W, I, K, V>(writer: &mut W, entries: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = (K, V)>,
    K: Display,
    V: Display,
{
    let mut written = 0;
    for (key, value) in entries {
        writeln!(writer, "{}\t{}", key, value)?;
        written += 1;
    }
    Ok(written)
}
