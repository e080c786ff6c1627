//! Mount mappings from TOML (`[[mounts]]` array)

use gateway_domain::{ConfigIssue, ConfigIssueCode, MountMapping, PathTranslator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One host root and the sandbox path it is visible under.
///
/// ```toml
/// [[mounts]]
/// host = "/Users/me/projects"
/// sandbox = "/workspace"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMountConfig {
    pub host: PathBuf,
    pub sandbox: PathBuf,
}

/// Validate mounts; both roots must be absolute.
pub fn validate_mounts(mounts: &[FileMountConfig]) -> Vec<ConfigIssue> {
    mounts
        .iter()
        .enumerate()
        .filter(|(_, m)| !m.host.is_absolute() || !m.sandbox.is_absolute())
        .map(|(i, m)| {
            ConfigIssue::error(
                ConfigIssueCode::InvalidMount,
                format!(
                    "mounts[{i}]: '{}' -> '{}' must use absolute paths",
                    m.host.display(),
                    m.sandbox.display()
                ),
            )
        })
        .collect()
}

/// Build the translator. With no mounts configured, `cwd` is exposed under
/// its own path.
pub fn path_translator(mounts: &[FileMountConfig], cwd: &Path) -> PathTranslator {
    if mounts.is_empty() {
        return PathTranslator::new(vec![MountMapping::identity(cwd)]);
    }
    PathTranslator::new(
        mounts
            .iter()
            .map(|m| MountMapping::new(&m.host, &m.sandbox))
            .collect(),
    )
}
