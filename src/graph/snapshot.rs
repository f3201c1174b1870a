//! src/graph/snapshot.rs
//!
//! Two-column text persistence for a channel's series.
//!
//! ```text
//! #Loop 1
//! 0,1000.5
//! 1,1000.75
//! ```
//!
//! On load the x column is ignored and indices are regenerated, so a file
//! with gaps or reordered x values loads as a dense sequence.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::channel::ChannelId;
use super::data::SeriesStore;
use crate::error::{MonitorError, Result};

pub fn header(id: ChannelId) -> String {
    format!("#Loop {}", id.number())
}

/// Default file name for a channel inside the series directory.
pub fn default_path(dir: &Path, id: ChannelId) -> PathBuf {
    dir.join(format!("loop{}.csv", id.number()))
}

pub fn write_series<W: Write>(mut w: W, id: ChannelId, store: &SeriesStore) -> Result<()> {
    writeln!(w, "{}", header(id))?;
    for s in store.samples() {
        writeln!(w, "{},{}", s.index, s.value)?;
    }
    w.flush()?;
    Ok(())
}

/// Parse a series file. The header must name the channel's loop number.
/// Rows that are not exactly two numbers are skipped.
pub fn read_series<R: BufRead>(r: R, id: ChannelId) -> Result<Vec<f64>> {
    let mut lines = r.lines();
    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(MonitorError::InvalidSeriesFile("empty file".into())),
    };
    let header = header.trim();
    if !header.starts_with('#') || !header.contains(&id.number().to_string()) {
        return Err(MonitorError::InvalidSeriesFile(format!(
            "header {:?} is not for loop {}",
            header,
            id.number()
        )));
    }

    let mut values = Vec::new();
    let mut skipped = 0usize;
    for line in lines {
        let line = line?;
        let parts: Vec<&str> = line.split(',').collect();
        let parsed = match parts.as_slice() {
            [x, y] => x
                .trim()
                .parse::<f64>()
                .ok()
                .and(y.trim().parse::<f64>().ok()),
            _ => None,
        };
        match parsed {
            Some(y) => values.push(y),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(skipped, "series rows skipped");
    }
    Ok(values)
}

pub fn save(path: &Path, id: ChannelId, store: &SeriesStore) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    write_series(BufWriter::new(file), id, store)?;
    info!(?path, samples = store.len(), "series saved");
    Ok(())
}

pub fn load(path: &Path, id: ChannelId) -> Result<Vec<f64>> {
    let file = File::open(path)?;
    let values = read_series(BufReader::new(file), id)?;
    info!(?path, samples = values.len(), "series loaded");
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn writes_header_and_rows() {
        let mut store = SeriesStore::new();
        store.push(1.5);
        store.push(-2.0);
        let mut out = Vec::new();
        write_series(&mut out, ChannelId::Loop2, &store).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "#Loop 2\n0,1.5\n1,-2\n");
    }

    #[test]
    fn header_must_match_channel() {
        let err = read_series(Cursor::new("#Loop 2\n0,1\n"), ChannelId::Loop1).unwrap_err();
        assert!(matches!(err, MonitorError::InvalidSeriesFile(_)));
        assert!(read_series(Cursor::new(""), ChannelId::Loop1).is_err());
    }

    #[test]
    fn bad_rows_are_skipped_and_x_ignored() {
        let text = "#Loop 1\n10,1.0\nfoo,2\n3\n1,2,3\n\n99, 4.5 \n";
        let values = read_series(Cursor::new(text), ChannelId::Loop1).unwrap();
        assert_eq!(values, vec![1.0, 4.5]);
    }
}
