//! Host → sandbox path translation.
//!
//! The gateway may run inside a container that sees the caller's files under
//! a different root. [`PathTranslator`] rewrites caller-supplied host paths
//! through an ordered list of [`MountMapping`]s. Matching is component-wise
//! (so `/work` does not match `/workspace`), the first matching mapping wins,
//! and the remainder below the mount is resolved lexically so `..` can never
//! climb above the mapped root.

use crate::core::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// One host root exposed to the sandbox under another root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountMapping {
    pub host_root: PathBuf,
    pub sandbox_root: PathBuf,
}

impl MountMapping {
    pub fn new(host_root: impl Into<PathBuf>, sandbox_root: impl Into<PathBuf>) -> Self {
        Self {
            host_root: host_root.into(),
            sandbox_root: sandbox_root.into(),
        }
    }

    /// Mapping that exposes `root` under the same path.
    pub fn identity(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            sandbox_root: root.clone(),
            host_root: root,
        }
    }
}

/// Coarse classification of an attached file, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Code,
    Other,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "jsx", "ts", "tsx", "go", "java", "kt", "swift", "c", "h", "cc", "cpp", "hpp",
    "cs", "rb", "php", "sh", "bash", "zsh", "sql", "html", "css", "scss", "md", "txt", "toml",
    "json", "yaml", "yml", "xml", "lua", "scala", "ex", "exs", "hs", "ml", "proto", "graphql",
];

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(OsStr::to_str) else {
            return FileKind::Other;
        };
        let ext = ext.to_ascii_lowercase();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Image
        } else if CODE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Code
        } else {
            FileKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Code => "code",
            FileKind::Other => "other",
        }
    }
}

/// A caller-supplied file after translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub host_path: PathBuf,
    pub sandbox_path: PathBuf,
    pub kind: FileKind,
}

/// Rewrites host paths into sandbox-visible paths.
#[derive(Debug, Clone, Default)]
pub struct PathTranslator {
    mappings: Vec<MountMapping>,
}

impl PathTranslator {
    pub fn new(mappings: Vec<MountMapping>) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &[MountMapping] {
        &self.mappings
    }

    pub fn translate(&self, host_path: &str) -> Result<FileRef, GatewayError> {
        let path = Path::new(host_path);
        if !path.is_absolute() {
            return Err(GatewayError::PathOutsideWorkspace(host_path.to_string()));
        }

        for mapping in &self.mappings {
            let Ok(remainder) = path.strip_prefix(&mapping.host_root) else {
                continue;
            };
            let sandbox_path = resolve_below(&mapping.sandbox_root, remainder)
                .ok_or_else(|| GatewayError::PathTraversal(host_path.to_string()))?;
            return Ok(FileRef {
                host_path: path.to_path_buf(),
                kind: FileKind::from_path(&sandbox_path),
                sandbox_path,
            });
        }

        Err(GatewayError::PathOutsideWorkspace(host_path.to_string()))
    }

    /// Translate every path, failing on the first error.
    pub fn translate_all<S: AsRef<str>>(&self, paths: &[S]) -> Result<Vec<FileRef>, GatewayError> {
        paths.iter().map(|p| self.translate(p.as_ref())).collect()
    }
}

/// Join `remainder` onto `root`, resolving `.` and `..` lexically.
/// Returns `None` when `..` would climb above `root`.
fn resolve_below(root: &Path, remainder: &Path) -> Option<PathBuf> {
    let mut stack: Vec<&OsStr> = Vec::new();
    for component in remainder.components() {
        match component {
            Component::Normal(part) => stack.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                stack.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    let mut resolved = root.to_path_buf();
    resolved.extend(stack);
    Some(resolved)
}
