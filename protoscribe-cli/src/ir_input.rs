//! Loading of pre-extracted IR programs.
//!
//! The extractor serializes its [`IrProgram`] as JSON; this module reads it
//! back. Extraction itself lives outside this workspace.

use std::path::Path;

use protoscribe::IrProgram;

use crate::error::IrInputError;

/// Loads an [`IrProgram`] from a JSON file.
pub struct IrLoader;

impl IrLoader {
    /// Read and deserialize the program.
    pub fn load(path: &Path) -> Result<IrProgram, IrInputError> {
        if !path.exists() {
            return Err(IrInputError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| IrInputError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| IrInputError::InvalidJson {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
