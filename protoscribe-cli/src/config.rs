//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `protoscribe.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use crate::packaging_file;
use protoscribe::{CompilerConfig, ManualPackaging, PackagingPolicy, Syntax};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "protoscribe.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Input and output paths.
    pub paths: PathsConfig,

    /// Output shape.
    pub output: OutputConfig,

    /// Structural resolution switches.
    pub resolution: ResolutionConfig,
}

/// Input and output paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Dependency resolution path handed to the extractor. The compiler
    /// itself never reads it.
    pub lib_path: Option<PathBuf>,

    /// Root directory all proto files are written under.
    pub out_path: PathBuf,

    /// Manual packaging override file.
    pub manual_packaging_file: Option<PathBuf>,
}

/// Output shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Collapse the whole program into a single dump file.
    pub dump_mode: bool,

    /// Emit proto3 syntax instead of proto2.
    pub proto3: bool,

    /// Mirror package paths as directories under the output root.
    pub package_structured: bool,
}

/// Structural resolution switches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Break import cycles by inlining files instead of failing.
    pub resolve_circular_dependencies: bool,

    /// Rename colliding types instead of failing.
    pub resolve_name_collisions: bool,

    /// Group namespaces sharing a dotted prefix into one package.
    pub automatic_packaging: bool,

    /// Number of leading segments namespaces must share to be grouped.
    pub auto_package_min_depth: usize,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            lib_path: None,
            out_path: PathBuf::from("./protos"),
            manual_packaging_file: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dump_mode: false,
            proto3: false,
            package_structured: true,
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            resolve_circular_dependencies: false,
            resolve_name_collisions: false,
            automatic_packaging: false,
            auto_package_min_depth: 2,
        }
    }
}

impl Config {
    /// Derive the core compiler configuration, loading the manual packaging
    /// table when one is configured.
    pub fn compiler_config(&self) -> CliResult<CompilerConfig> {
        Ok(CompilerConfig {
            syntax: if self.output.proto3 {
                Syntax::Proto3
            } else {
                Syntax::Proto2
            },
            dump_mode: self.output.dump_mode,
            packaging: self.packaging_policy()?,
            resolve_circular_dependencies: self.resolution.resolve_circular_dependencies,
            resolve_name_collisions: self.resolution.resolve_name_collisions,
            package_structured: self.output.package_structured,
        })
    }

    /// Select the packaging policy. The three policies are mutually
    /// exclusive; configuring manual and automatic packaging together is
    /// rejected before compilation starts.
    fn packaging_policy(&self) -> CliResult<PackagingPolicy> {
        match (
            &self.paths.manual_packaging_file,
            self.resolution.automatic_packaging,
        ) {
            (Some(_), true) => Err(ConfigError::invalid_value(
                "automatic_packaging",
                "manual_packaging_file and automatic_packaging are mutually exclusive",
            )
            .into()),
            (Some(path), false) => {
                let entries = packaging_file::load(path)?;
                let manual = ManualPackaging::from_entries(entries)
                    .map_err(protoscribe::CompileError::from)?;
                Ok(PackagingPolicy::Manual(manual))
            }
            (None, true) => Ok(PackagingPolicy::Automatic {
                min_depth: self.resolution.auto_package_min_depth,
            }),
            (None, false) => Ok(PackagingPolicy::Identity),
        }
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref lib_path) = args.lib_path {
            config.paths.lib_path = Some(lib_path.clone());
        }

        if let Some(ref out_path) = args.out_path {
            config.paths.out_path = out_path.clone();
        }

        if let Some(ref file) = args.manual_packaging_file {
            config.paths.manual_packaging_file = Some(file.clone());
        }

        if let Some(dump_mode) = args.dump_mode {
            config.output.dump_mode = dump_mode;
        }

        if let Some(proto3) = args.proto3 {
            config.output.proto3 = proto3;
        }

        if let Some(package_structured) = args.package_structured {
            config.output.package_structured = package_structured;
        }

        if let Some(resolve) = args.resolve_circular_dependencies {
            config.resolution.resolve_circular_dependencies = resolve;
        }

        if let Some(resolve) = args.resolve_name_collisions {
            config.resolution.resolve_name_collisions = resolve;
        }

        if let Some(automatic) = args.automatic_packaging {
            config.resolution.automatic_packaging = automatic;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# protoscribe configuration file

[paths]
# Dependency resolution path for the extractor (unused by the compiler)
# lib_path = "./lib"

# Root directory all compiled proto files are written under
out_path = "./protos"

# Manual packaging override file
# manual_packaging_file = "./packaging.toml"

[output]
# Collapse the whole program into a single dump.proto
dump_mode = false

# Emit proto3 syntax instead of proto2
proto3 = false

# Mirror package paths as directories under the output root
package_structured = true

[resolution]
# Break import cycles by inlining files instead of failing
resolve_circular_dependencies = false

# Rename colliding types instead of failing
resolve_name_collisions = false

# Group namespaces sharing a dotted prefix into one package
automatic_packaging = false

# Number of leading segments namespaces must share to be grouped
auto_package_min_depth = 2
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Extractor dependency path override.
    pub lib_path: Option<PathBuf>,

    /// Output root override.
    pub out_path: Option<PathBuf>,

    /// Manual packaging file override.
    pub manual_packaging_file: Option<PathBuf>,

    /// Dump mode override.
    pub dump_mode: Option<bool>,

    /// proto3 override.
    pub proto3: Option<bool>,

    /// Package structure override.
    pub package_structured: Option<bool>,

    /// Circular dependency resolution override.
    pub resolve_circular_dependencies: Option<bool>,

    /// Name collision resolution override.
    pub resolve_name_collisions: Option<bool>,

    /// Automatic packaging override.
    pub automatic_packaging: Option<bool>,
}
