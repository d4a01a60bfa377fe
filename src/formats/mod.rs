//! Readers and writers for localization files
//!
//! Three formats are supported, selected by file extension:
//!
//! - `.json`: a JSON object, arbitrarily nested
//! - `.yaml` / `.yml`: a YAML mapping, arbitrarily nested
//! - `.strings`: Apple `Localizable.strings`, one `"key" = "value";` per line
//!
//! Every reader produces a [`LocalizationTree`] and every writer consumes one,
//! so the translation pipeline never sees format-specific data. Translated
//! output is written from flat keys with [`write_flat`], which keeps `.strings`
//! files flat instead of nesting them first.

pub mod json;
pub mod strings;
pub mod yaml;

use crate::tree::{FlatMap, LocalizationTree, unflatten};
use std::fs;
use std::path::{Path, PathBuf};

/// Error types for reading and writing localization files
#[derive(Debug)]
pub enum FormatError {
    /// The file could not be read or written
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file content is not valid for its format
    Parse { path: PathBuf, message: String },
    /// The file parsed, but its root is not a key-value mapping
    InvalidShape { path: PathBuf, message: String },
    /// The tree could not be encoded for output
    Serialize { path: PathBuf, message: String },
    /// The file extension is not one of the supported formats
    UnsupportedFormat(String),
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::Io { path, source } => {
                write!(f, "I/O error on '{}': {}", path.display(), source)
            }
            FormatError::Parse { path, message } => {
                write!(f, "Failed to parse '{}': {}", path.display(), message)
            }
            FormatError::InvalidShape { path, message } => {
                write!(f, "Invalid content in '{}': {}", path.display(), message)
            }
            FormatError::Serialize { path, message } => {
                write!(f, "Failed to encode '{}': {}", path.display(), message)
            }
            FormatError::UnsupportedFormat(ext) => {
                write!(f, "Unsupported file extension: '{}'", ext)
            }
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for format operations
pub type FormatResult<T> = Result<T, FormatError>;

/// Supported localization file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Strings,
}

impl Format {
    /// Detect the format from a file extension (without the dot)
    pub fn from_extension(ext: &str) -> FormatResult<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "strings" => Ok(Format::Strings),
            other => Err(FormatError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Detect the format from a path's extension
    pub fn from_path(path: &Path) -> FormatResult<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        Self::from_extension(ext)
    }

    /// Canonical extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Strings => "strings",
        }
    }

    /// Parse file content into a tree
    pub fn parse(&self, content: &str, path: &Path) -> FormatResult<LocalizationTree> {
        match self {
            Format::Json => json::parse(content, path),
            Format::Yaml => yaml::parse(content, path),
            Format::Strings => Ok(strings::parse(content)),
        }
    }

    /// Encode a tree as file content
    pub fn render(&self, tree: &LocalizationTree, path: &Path) -> FormatResult<String> {
        match self {
            Format::Json => json::render(tree, path),
            Format::Yaml => yaml::render(tree, path),
            Format::Strings => Ok(strings::render(tree)),
        }
    }
}

/// Read a localization file, choosing the format from its extension
///
/// # Errors
/// - Unsupported extension
/// - File read errors
/// - Malformed content, or a root that is not a mapping
pub fn read(path: &Path) -> FormatResult<LocalizationTree> {
    let format = Format::from_path(path)?;
    read_as(path, format)
}

/// Read a localization file with an explicit format
pub fn read_as(path: &Path, format: Format) -> FormatResult<LocalizationTree> {
    let content = fs::read_to_string(path).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    format.parse(&content, path)
}

/// Write a tree to `path` in the given format
///
/// Missing parent directories are created.
pub fn write(tree: &LocalizationTree, path: &Path, format: Format) -> FormatResult<()> {
    let content = format.render(tree, path)?;
    write_content(path, content)
}

/// Write flat dotted keys to `path` in the given format
///
/// `.strings` entries are written one per key exactly as given, so keys such
/// as `button` and `button.title` both survive. Nested formats unflatten first.
pub fn write_flat(flat: &FlatMap, path: &Path, format: Format) -> FormatResult<()> {
    let content = match format {
        Format::Strings => strings::render_flat(flat),
        Format::Json | Format::Yaml => format.render(&unflatten(flat), path)?,
    };
    write_content(path, content)
}

fn write_content(path: &Path, content: String) -> FormatResult<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| FormatError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, content).map_err(|source| FormatError::Io {
        path: path.to_path_buf(),
        source,
    })
}
