use std::path::{Path, PathBuf};

/// Environment variable overriding the data file location
pub const DATA_FILE_ENV: &str = "PMTRACK_FILE";

/// Default data file name, kept next to the `rc` file
pub const DEFAULT_DATA_FILE: &str = "project_management.json";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Resolved runtime settings
///
/// Data file precedence: explicit override, `PMTRACK_FILE`, `data.location=`
/// in `~/.pmtrack/rc`, then `~/.pmtrack/project_management.json`.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_level: String,
}

/// Values read from an `rc` file
#[derive(Debug, Default, PartialEq)]
struct RcValues {
    data_location: Option<PathBuf>,
    log_level: Option<String>,
}

impl Settings {
    /// Directory holding the `rc` file
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pmtrack")
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("rc")
    }

    /// Resolve settings from the process environment and the user's `rc` file
    pub fn resolve(file_override: Option<PathBuf>) -> Settings {
        let env_file = std::env::var(DATA_FILE_ENV).ok().filter(|v| !v.trim().is_empty());
        Self::resolve_from(file_override, env_file, &Self::config_path())
    }

    /// Resolve settings against an explicit `rc` path
    pub fn resolve_from(
        file_override: Option<PathBuf>,
        env_file: Option<String>,
        rc_path: &Path,
    ) -> Settings {
        let rc = match std::fs::read_to_string(rc_path) {
            Ok(contents) => parse_rc(&contents, rc_path.parent().unwrap_or(Path::new("."))),
            Err(_) => RcValues::default(),
        };

        let data_file = file_override
            .or_else(|| env_file.map(PathBuf::from))
            .or(rc.data_location)
            .unwrap_or_else(|| {
                rc_path
                    .parent()
                    .unwrap_or(Path::new("."))
                    .join(DEFAULT_DATA_FILE)
            });

        Settings {
            data_file,
            log_level: rc.log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        }
    }
}

fn parse_rc(contents: &str, rc_dir: &Path) -> RcValues {
    let mut values = RcValues::default();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "data.location" if !value.is_empty() => {
                let path = PathBuf::from(value);
                // Relative paths are relative to the rc file's directory
                values.data_location = Some(if path.is_relative() {
                    rc_dir.join(path)
                } else {
                    path
                });
            }
            "log.level" if !value.is_empty() => {
                values.log_level = Some(value.to_string());
            }
            _ => {}
        }
    }
    values
}
