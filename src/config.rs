use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::map::{MapSettings, TileSource, Viewport};
use crate::models::{Coordinate, DEFAULT_CENTER};

const APP_NAME: &str = "placemark";
const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "placemark.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite file holding the stored places. Defaults to the user data directory.
    pub database_path: Option<PathBuf>,
    /// Key of the blob the place list is stored under.
    pub storage_key: String,
    /// Id of the element the map is mounted into.
    pub container: String,
    pub tiles: TileSource,
    pub default_center: Coordinate,
    pub default_zoom: u8,
    pub located_zoom: u8,
    /// IP geolocation endpoint. Without one, device position is unavailable.
    pub geolocation_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            storage_key: "places".to_string(),
            container: "map".to_string(),
            tiles: TileSource::default(),
            default_center: DEFAULT_CENTER,
            default_zoom: 12,
            located_zoom: 14,
            geolocation_url: None,
        }
    }
}

impl Config {
    /// Load configuration from the user's config directory only.
    /// Falls back to defaults if the file doesn't exist or fails to parse.
    pub fn load_file() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let config_path = get_config_path()?;
        if !config_path.exists() {
            return Ok(Self::default());
        }
        Self::from_file(&config_path)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Apply `PLACEMARK_DB`, `PLACEMARK_STORAGE_KEY` and
    /// `PLACEMARK_GEOLOCATION_URL` on top of the loaded values.
    pub fn with_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = var("PLACEMARK_DB") {
            self.database_path = Some(PathBuf::from(path));
        }
        if let Some(key) = var("PLACEMARK_STORAGE_KEY") {
            self.storage_key = key;
        }
        if let Some(url) = var("PLACEMARK_GEOLOCATION_URL") {
            self.geolocation_url = Some(url).filter(|u| !u.is_empty());
        }
        self
    }

    /// Apply command-line `--db` and `--key` on top of the loaded values.
    pub fn with_cli(
        mut self,
        database_path: Option<PathBuf>,
        storage_key: Option<String>,
    ) -> Self {
        if let Some(path) = database_path {
            self.database_path = Some(path);
        }
        if let Some(key) = storage_key {
            self.storage_key = key;
        }
        self
    }

    /// Save the current configuration to the user config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&get_config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// The database file, resolved against the user data directory when unset.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        Ok(project_dirs()?.data_dir().join(DATABASE_FILE))
    }

    pub fn map_settings(&self) -> MapSettings {
        MapSettings {
            container: self.container.clone(),
            tiles: self.tiles.clone(),
            default_view: Viewport {
                center: self.default_center,
                zoom: self.default_zoom,
            },
            located_zoom: self.located_zoom,
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
        .ok_or_else(|| anyhow::anyhow!("Could not determine user directories"))
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_original_viewport() {
        let config = Config::default();
        let settings = config.map_settings();
        assert_eq!(settings.container, "map");
        assert_eq!(settings.default_view.zoom, 12);
        assert_eq!(settings.located_zoom, 14);
        assert_eq!(
            settings.default_view.center,
            Coordinate::new(-23.5505, -46.6333).unwrap()
        );
        assert!(config.geolocation_url.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"storage_key": "bars", "default_center": [10.0, 20.0]}"#,
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.storage_key, "bars");
        assert_eq!(config.default_center, Coordinate::new(10.0, 20.0).unwrap());
        assert_eq!(config.default_zoom, 12);
    }

    #[test]
    fn test_out_of_range_center_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"default_center": [100.0, 20.0]}"#).unwrap();
        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PLACEMARK_DB", "/tmp/x.db"),
            ("PLACEMARK_STORAGE_KEY", "bars"),
            ("PLACEMARK_GEOLOCATION_URL", "http://localhost/geo"),
        ]
        .into_iter()
        .collect();

        let config = Config::default().with_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/x.db"));
        assert_eq!(config.storage_key, "bars");
        assert_eq!(
            config.geolocation_url.as_deref(),
            Some("http://localhost/geo")
        );
    }

    #[test]
    fn test_saved_file_keeps_overrides_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"storage_key": "bars", "default_zoom": 10}"#).unwrap();

        let file = Config::from_file(&path).unwrap();
        let effective = file
            .clone()
            .with_overrides(|name| (name == "PLACEMARK_STORAGE_KEY").then(|| "env".to_string()))
            .with_cli(Some(PathBuf::from("/tmp/once.db")), None);
        assert_eq!(effective.storage_key, "env");

        file.save_to(&path).unwrap();
        let saved = Config::from_file(&path).unwrap();
        assert_eq!(saved.storage_key, "bars");
        assert_eq!(saved.default_zoom, 10);
        assert!(saved.database_path.is_none());
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = Config::default()
            .with_overrides(|name| (name == "PLACEMARK_STORAGE_KEY").then(|| "env".to_string()))
            .with_cli(None, Some("cli".to_string()));
        assert_eq!(config.storage_key, "cli");
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_empty_geolocation_override_disables_lookup() {
        let config = Config {
            geolocation_url: Some("http://localhost/geo".to_string()),
            ..Config::default()
        }
        .with_overrides(|name| (name == "PLACEMARK_GEOLOCATION_URL").then(String::new));
        assert!(config.geolocation_url.is_none());
    }
}
