//! Machine translation of localization files
//!
//! Reads a nested JSON, YAML or `.strings` localization file, translates every
//! string value with a chat-completion model, and writes the result back in
//! the same nested shape.
//!
//! - [`tree`] converts between nested trees and flat dotted keys
//! - [`formats`] reads and writes the supported file formats
//! - [`mt`] chunks, dispatches and merges translations
//! - [`config`] builds the command-line interface

pub mod config;
pub mod formats;
pub mod mt;
pub mod tree;

// Re-export the types most callers need
pub use formats::{Format, FormatError};
pub use mt::{
    DispatchConfig, MachineTranslator, MtError, MtResult, OpenAiProvider, Pipeline, RunReport,
    TranslationJob,
};
pub use tree::{FlatMap, LocalizationTree, TreeNode, flatten, unflatten};
