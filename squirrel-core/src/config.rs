//! Centralized configuration for squirrel-tree.
//!
//! Mirror settings live here so the CLI, the environment and library callers
//! all build a [`FileReactor`](crate::FileReactor) from the same structure.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::reactor::ReactorError;

/// Central configuration for all squirrel components.
///
/// Supports environment variable overrides for runtime customization.
#[derive(Debug, Clone, Default)]
pub struct SquirrelConfig {
    pub mirror: MirrorConfig,
}

/// How files are put from the pool into the mirrored hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlacementMethod {
    /// Copy file contents
    #[default]
    Copy,
    /// Create a hard link to the pool file
    Hardlink,
    /// Create a symbolic link pointing at the pool file
    Symlink,
}

impl PlacementMethod {
    /// All methods, in the order they are listed to users.
    pub const ALL: [PlacementMethod; 3] = [
        PlacementMethod::Copy,
        PlacementMethod::Hardlink,
        PlacementMethod::Symlink,
    ];

    /// Whether the current platform can place files this way.
    pub fn is_supported(self) -> bool {
        match self {
            PlacementMethod::Copy | PlacementMethod::Hardlink => true,
            PlacementMethod::Symlink => cfg!(any(unix, windows)),
        }
    }
}

impl FromStr for PlacementMethod {
    type Err = ReactorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "copy" => Ok(PlacementMethod::Copy),
            "hardlink" => Ok(PlacementMethod::Hardlink),
            "symlink" => Ok(PlacementMethod::Symlink),
            _ => Err(ReactorError::InvalidMethod {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for PlacementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementMethod::Copy => write!(f, "copy"),
            PlacementMethod::Hardlink => write!(f, "hardlink"),
            PlacementMethod::Symlink => write!(f, "symlink"),
        }
    }
}

/// Filesystem mirroring configuration.
///
/// Controls where the hierarchy is built, where files are taken from and
/// which files survive value changes untouched.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Root directory of the mirrored hierarchy
    pub root_dir: PathBuf,
    /// Directory files are taken from
    pub pool_dir: PathBuf,
    /// How files are put in place
    pub method: PlacementMethod,
    /// Regex for file names never cleaned up on value change
    pub ignore_pattern: Option<String>,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            pool_dir: PathBuf::from("/"),
            method: PlacementMethod::Copy,
            ignore_pattern: None,
        }
    }
}

impl MirrorConfig {
    /// Creates a configuration mirroring into `root_dir` with default settings.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Default::default()
        }
    }

    pub fn with_pool(mut self, pool_dir: impl Into<PathBuf>) -> Self {
        self.pool_dir = pool_dir.into();
        self
    }

    pub fn with_method(mut self, method: PlacementMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_ignore_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_pattern = Some(pattern.into());
        self
    }
}

impl SquirrelConfig {
    /// Creates configuration with environment variable overrides.
    ///
    /// Unparsable values are logged and ignored so a bad variable never
    /// prevents startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(root) = std::env::var("SQUIRREL_ROOT_DIR") {
            config.mirror.root_dir = PathBuf::from(root);
        }

        if let Ok(pool) = std::env::var("SQUIRREL_POOL_DIR") {
            config.mirror.pool_dir = PathBuf::from(pool);
        }

        if let Ok(method) = std::env::var("SQUIRREL_METHOD") {
            match method.parse::<PlacementMethod>() {
                Ok(method) => config.mirror.method = method,
                Err(e) => tracing::warn!("Ignoring SQUIRREL_METHOD: {e}"),
            }
        }

        if let Ok(pattern) = std::env::var("SQUIRREL_IGNORE")
            && !pattern.is_empty()
        {
            config.mirror.ignore_pattern = Some(pattern);
        }

        config
    }
}
