//! Manual packaging file parsing.
//!
//! The override file is TOML with one `[[package]]` table per target
//! package:
//!
//! ```toml
//! [[package]]
//! name = "shared"
//! namespaces = ["Game.Entities", "Game.Net"]
//! ```
//!
//! The file is flattened into (namespace, package) entries in file order;
//! a namespace listed under two packages is rejected later by
//! [`ManualPackaging::from_entries`], before any emission starts.
//!
//! [`ManualPackaging::from_entries`]: protoscribe::ManualPackaging::from_entries

use std::path::Path;

use serde::Deserialize;

use crate::error::PackagingFileError;

#[derive(Debug, Deserialize)]
struct PackagingFile {
    #[serde(default, rename = "package")]
    packages: Vec<PackageEntry>,
}

#[derive(Debug, Deserialize)]
struct PackageEntry {
    name: String,
    namespaces: Vec<String>,
}

/// Parse the packaging file into (namespace, package) entries.
pub fn load(path: &Path) -> Result<Vec<(String, String)>, PackagingFileError> {
    if !path.exists() {
        return Err(PackagingFileError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| PackagingFileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let file: PackagingFile = toml::from_str(&content).map_err(|e| {
        PackagingFileError::InvalidToml {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    Ok(file
        .packages
        .into_iter()
        .flat_map(|entry| {
            let package = entry.name;
            entry
                .namespaces
                .into_iter()
                .map(move |ns| (ns, package.clone()))
        })
        .collect())
}
