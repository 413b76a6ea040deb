//! Global configuration management
//! This module handles the loading and parsing of configuration files
//! and environment variables for the application.
//! Usage:
//! ```rust,no_run
//! use docreader::config::Settings;
//! let cfg = Settings::new().unwrap();
//! println!("{}", cfg.server.addr());
//! ```
//!
//! Sources, lowest priority first:
//! 1. the built-in `Config.toml`
//! 2. `Config.toml` next to the executable, or the file given explicitly
//! 3. `DOCREADER__SECTION__KEY` environment variables

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::ConvertOptions;

const BUILTIN: &str = include_str!("../Config.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub upload: UploadSettings,
    pub convert: ConvertSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    pub max_file_bytes: usize,
    pub max_request_bytes: usize,
    /// Empty means the system temp directory
    pub temp_dir: PathBuf,
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConvertSettings {
    pub timeout_secs: u64,
    pub max_zip_depth: usize,
    pub max_zip_entries: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// Used when RUST_LOG is not set
    pub level: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load with an explicit override file instead of the one next to the
    /// executable.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // 1. built-in default config
        let mut builder = Config::builder().add_source(File::from_str(BUILTIN, FileFormat::Toml));

        // 2. external config file
        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()).required(true));
            }
            None => {
                if let Some(external) = beside_executable() {
                    builder = builder.add_source(File::from(external).required(false));
                }
            }
        }

        // 3. environment variables
        builder = builder.add_source(
            Environment::with_prefix("DOCREADER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validated()
    }

    /// Only the built-in defaults, ignoring files and environment.
    pub fn builtin() -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(BUILTIN, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.upload.allowed_extensions = self
            .upload
            .allowed_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        if let Some(bad) = self
            .upload
            .allowed_extensions
            .iter()
            .find(|ext| !ext.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(ConfigError::Message(format!(
                "upload.allowed_extensions: invalid extension '{}'",
                bad
            )));
        }
        if self.upload.max_file_bytes == 0 || self.convert.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "upload.max_file_bytes and convert.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(self)
    }

    /// Archive contents may not unpack to more than a single upload may be.
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            max_zip_depth: self.convert.max_zip_depth,
            max_zip_entries: self.convert.max_zip_entries,
            max_unpacked_bytes: self.upload.max_file_bytes as u64,
        }
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert.timeout_secs)
    }

    pub fn temp_dir(&self) -> PathBuf {
        if self.upload.temp_dir.as_os_str().is_empty() {
            env::temp_dir()
        } else {
            self.upload.temp_dir.clone()
        }
    }

    pub fn is_allowed(&self, file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.upload.allowed_extensions.contains(&ext))
    }
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn beside_executable() -> Option<PathBuf> {
    let exe_path = env::current_exe().ok()?;
    let external = exe_path.parent()?.join("Config.toml");
    fs::metadata(&external).is_ok().then_some(external)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_defaults() {
        let settings = Settings::builtin().unwrap();
        assert_eq!(settings.server.port, 8501);
        assert_eq!(settings.convert.timeout_secs, 60);
        assert!(settings.upload.allowed_extensions.contains(&"docx".to_string()));
        assert_eq!(settings.temp_dir(), env::temp_dir());
    }

    #[test]
    fn extension_check_ignores_case() {
        let settings = Settings::builtin().unwrap();
        assert!(settings.is_allowed("Deck.PPTX"));
        assert!(settings.is_allowed("page.htm"));
        assert!(!settings.is_allowed("notes.csv"));
        assert!(!settings.is_allowed("no_extension"));
    }

    #[test]
    fn explicit_file_overrides_builtin() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n[upload]\nallowed_extensions = [\".CSV\", \"pdf\"]"
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert!(settings.upload.allowed_extensions.contains(&"csv".to_string()));
        assert!(settings.is_allowed("data.csv"));
    }

    #[test]
    fn invalid_extension_is_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[upload]\nallowed_extensions = [\"p df\"]").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn convert_options_follow_settings() {
        let settings = Settings::builtin().unwrap();
        let options = settings.convert_options();
        assert_eq!(options.max_zip_depth, 2);
        assert_eq!(options.max_zip_entries, 200);
        assert_eq!(options.max_unpacked_bytes, 50 * 1024 * 1024);
    }
}
