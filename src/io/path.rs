use std::fmt;
use std::path::{Path, PathBuf};

const MAX_NUMBER_DIGITS: usize = 9;

/// A media path split into `directory`, `base name`, frame `number` and `extension`.
///
/// `shots/plate.0100.exr` splits into `shots/`, `plate.`, `0100`, `.exr`; a number with a leading
/// zero sets the zero-padding used when writing other frames of the sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MediaPath {
    directory: String,
    base_name: String,
    number: String,
    padding: usize,
    extension: String,
}

impl MediaPath {
    /// Split `path` into its components.
    pub fn parse(path: impl AsRef<Path>) -> Self {
        let value = path.as_ref().to_string_lossy().into_owned();

        let file_start = value.rfind(['/', '\\']).map(|i| i + 1).unwrap_or(0);
        let (directory, file) = value.split_at(file_start);

        let (stem, extension) = match file.rfind('.') {
            Some(i) if i > 0 && !file[..i].ends_with('.') => file.split_at(i),
            _ => (file, ""),
        };

        let digits = stem
            .bytes()
            .rev()
            .take_while(u8::is_ascii_digit)
            .count();
        let (base_name, number) = if digits > 0 && digits <= MAX_NUMBER_DIGITS {
            stem.split_at(stem.len() - digits)
        } else {
            (stem, "")
        };

        let padding = if number.len() > 1 && number.starts_with('0') {
            number.len()
        } else {
            0
        };

        Self {
            directory: directory.to_owned(),
            base_name: base_name.to_owned(),
            number: number.to_owned(),
            padding,
            extension: extension.to_owned(),
        }
    }

    /// Directory including the trailing separator, or empty.
    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// File name up to the frame number.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Frame number digits, or empty.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Parsed frame number.
    pub fn number_value(&self) -> Option<i64> {
        self.number.parse().ok()
    }

    /// Zero-padding width, `0` for none.
    pub fn padding(&self) -> usize {
        self.padding
    }

    /// Extension including the leading dot, or empty.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Lowercase extension including the leading dot.
    pub fn extension_lower(&self) -> String {
        self.extension.to_ascii_lowercase()
    }

    /// Same path with `extension` (including the dot) swapped in.
    pub fn with_extension(&self, extension: &str) -> Self {
        Self {
            extension: extension.to_owned(),
            ..self.clone()
        }
    }

    /// The path as given.
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(self.to_string())
    }

    /// Path of `frame` in this sequence, zero-padded to [`MediaPath::padding`].
    pub fn frame_path(&self, frame: i64) -> PathBuf {
        let width = self.padding;
        let number = if frame < 0 {
            format!("-{:0width$}", frame.unsigned_abs())
        } else {
            format!("{frame:0width$}")
        };
        PathBuf::from(format!(
            "{}{}{}{}",
            self.directory, self.base_name, number, self.extension
        ))
    }
}

impl fmt::Display for MediaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            self.directory, self.base_name, self.number, self.extension
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/path.rs"]
mod tests;
