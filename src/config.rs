//! User configuration (`config.toml`).
//!
//! Problems with the file never stop the program; they are collected as
//! warnings and the defaults are used instead.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const MAX_CONFIG_FILE_BYTES: u64 = 65_536;
const KNOWN_KEYS: &[&str] = &["col_width", "max_display_cols", "log_file", "autosave", "keymap"];

pub const MIN_COL_WIDTH: usize = 4;
pub const MAX_COL_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default display width of a column.
    pub col_width: usize,
    /// Columns beyond this index are not shown.
    pub max_display_cols: usize,
    /// Write a log file while the terminal UI runs.
    pub log_file: bool,
    /// Save the package after every accepted edit.
    pub autosave: bool,
    pub keymap: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            col_width: 12,
            max_display_cols: 1024,
            log_file: true,
            autosave: true,
            keymap: "vim".to_string(),
        }
    }
}

impl Config {
    fn sanitized(mut self) -> Self {
        self.col_width = self.col_width.clamp(MIN_COL_WIDTH, MAX_COL_WIDTH);
        self.max_display_cols = self.max_display_cols.max(1);
        self
    }
}

/// Directory holding `config.toml` and the log file.
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "odsgrid")
}

fn user_config_path() -> Option<PathBuf> {
    let proj = project_dirs()?;
    Some(proj.config_dir().join("config.toml"))
}

/// Path of the log file written while the terminal UI runs.
pub fn log_file_path() -> Option<PathBuf> {
    let proj = project_dirs()?;
    Some(proj.data_local_dir().join("odsgrid.log"))
}

/// Load the configuration from `explicit`, or from the user config dir.
///
/// A missing default file is not an error; a missing explicit one is reported.
pub fn load_config(explicit: Option<&Path>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let path = explicit.map(Path::to_path_buf).or_else(user_config_path);
    let Some(path) = path else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if explicit.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    let config = match std::fs::metadata(&path) {
        Ok(meta) if meta.len() > MAX_CONFIG_FILE_BYTES => {
            warnings.push(format!(
                "Refusing to read {}: file too large ({} bytes, max {})",
                path.display(),
                meta.len(),
                MAX_CONFIG_FILE_BYTES
            ));
            None
        }
        Ok(_) => match std::fs::read_to_string(&path) {
            Ok(content) => parse_config(&content, &path, &mut warnings),
            Err(err) => {
                warnings.push(format!("Failed to read {}: {}", path.display(), err));
                None
            }
        },
        Err(err) => {
            warnings.push(format!(
                "Failed to read metadata for {}: {}",
                path.display(),
                err
            ));
            None
        }
    };

    (config.unwrap_or_default().sanitized(), warnings)
}

fn parse_config(content: &str, path: &Path, warnings: &mut Vec<String>) -> Option<Config> {
    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), err));
            return None;
        }
    };
    for key in table.keys().filter(|k| !KNOWN_KEYS.contains(&k.as_str())) {
        warnings.push(format!("Unknown key '{}' in {}", key, path.display()));
    }
    match toml::Value::Table(table).try_into::<Config>() {
        Ok(config) => Some(config),
        Err(err) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), err));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let (_dir, path) = write_config("col_width = 20\nautosave = false\n");
        let (config, warnings) = load_config(Some(&path));
        assert!(warnings.is_empty());
        assert_eq!(config.col_width, 20);
        assert!(!config.autosave);
        assert_eq!(config.keymap, "vim");
    }

    #[test]
    fn col_width_is_clamped() {
        let (_dir, path) = write_config("col_width = 500\n");
        assert_eq!(load_config(Some(&path)).0.col_width, MAX_COL_WIDTH);
        let (_dir, path) = write_config("col_width = 1\n");
        assert_eq!(load_config(Some(&path)).0.col_width, MIN_COL_WIDTH);
    }

    #[test]
    fn unknown_keys_warn() {
        let (_dir, path) = write_config("colour = \"blue\"\nkeymap = \"emacs\"\n");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config.keymap, "emacs");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("colour"));
    }

    #[test]
    fn bad_files_fall_back_to_defaults() {
        let (_dir, path) = write_config("col_width = \"wide\"\n");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert!(warnings[0].starts_with("Failed to parse"));

        let (_dir, path) = write_config("not toml [");
        let (config, warnings) = load_config(Some(&path));
        assert_eq!(config, Config::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn missing_explicit_file_warns() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(Some(&dir.path().join("nope.toml")));
        assert_eq!(config, Config::default());
        assert!(warnings[0].starts_with("Config file not found"));
    }

    #[test]
    fn oversized_file_is_refused() {
        let (_dir, path) = write_config(&"#".repeat(MAX_CONFIG_FILE_BYTES as usize + 1));
        let (_, warnings) = load_config(Some(&path));
        assert!(warnings[0].starts_with("Refusing to read"));
    }
}
