//! JSON configuration files: save options and annotation sets.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::annotation::AnnotationSet;
use crate::export::SaveOptions;
use crate::foundation::error::{BakeError, BakeResult};

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> BakeResult<T> {
    let file = File::open(path).map_err(|e| {
        BakeError::validation(format!("open {what} '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        BakeError::validation(format!("parse {what} '{}': {e}", path.display()))
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> BakeResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Read [`SaveOptions`] from a JSON file; missing fields take their defaults.
pub fn load_save_options(path: &Path) -> BakeResult<SaveOptions> {
    let options: SaveOptions = read_json(path, "save options")?;
    tracing::debug!(path = %path.display(), ?options, "loaded save options");
    Ok(options)
}

/// Write `options` as pretty-printed JSON.
pub fn write_save_options(path: &Path, options: &SaveOptions) -> BakeResult<()> {
    write_json(path, options)
}

/// Read an annotation set (a JSON array of annotations).
pub fn load_annotations(path: &Path) -> BakeResult<AnnotationSet> {
    let set: AnnotationSet = read_json(path, "annotations")?;
    tracing::debug!(
        path = %path.display(),
        count = set.annotations().len(),
        "loaded annotations"
    );
    Ok(set)
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
