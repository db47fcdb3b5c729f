use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::BusinessRecord;
use crate::error::SearchError;

/// Write records as a pretty-printed JSON array
pub fn write_json(path: &Path, records: &[BusinessRecord]) -> Result<(), SearchError> {
    let file = File::create(path).map_err(|e| SearchError::export(path, e))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, records).map_err(|e| SearchError::export(path, e))?;
    writer.write_all(b"\n").map_err(|e| SearchError::export(path, e))?;
    writer.flush().map_err(|e| SearchError::export(path, e))?;

    Ok(())
}
