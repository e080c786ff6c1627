//! Host/sandbox filesystem boundary.

pub mod path_translator;

pub use path_translator::{FileKind, FileRef, MountMapping, PathTranslator};
