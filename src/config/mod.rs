use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::editor::{EditorSettings, DEFAULT_CROP};
use crate::geometry::{Point, Rect, SurfaceSize};
use crate::presets::DEFAULT_PRESET_ORIGIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigPathError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
}

const APP_DIR: &str = "magic-resize";
const APP_CONFIG_FILE: &str = "config.json";
const DEFAULT_OUTPUT_SUBDIR: &str = "Pictures";

/// Editor settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub surface_width: u32,
    pub surface_height: u32,
    pub default_crop: Rect,
    pub preset_origin: Point,
    pub extend_endpoint: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub presets_file: Option<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let surface = SurfaceSize::default();
        Self {
            surface_width: surface.width,
            surface_height: surface.height,
            default_crop: DEFAULT_CROP,
            preset_origin: DEFAULT_PRESET_ORIGIN,
            extend_endpoint: None,
            output_dir: None,
            presets_file: None,
        }
    }
}

impl EditorConfig {
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            surface: SurfaceSize::new(self.surface_width, self.surface_height),
            default_crop: self.default_crop,
            ..EditorSettings::default()
        }
    }

    /// Configured output directory, else `$HOME/Pictures`.
    pub fn resolve_output_dir(&self, home: Option<&Path>) -> Result<PathBuf, ConfigPathError> {
        if let Some(dir) = self.output_dir.as_ref() {
            return Ok(dir.clone());
        }
        let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
        Ok(home.join(DEFAULT_OUTPUT_SUBDIR))
    }
}

pub fn load_editor_config() -> EditorConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_editor_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_editor_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> EditorConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return EditorConfig::default(),
    };
    if !path.exists() {
        return EditorConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            EditorConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            EditorConfig::default()
        }
    }
}

pub fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_dir(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!(
            "magic-resize-config-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join(APP_DIR)).expect("config dir");
        root
    }

    #[test]
    fn app_config_path_prefers_xdg_config_home() {
        let path = app_config_path(
            "magic-resize",
            "config.json",
            Some(Path::new("/tmp/config-root")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/config-root/magic-resize/config.json")
        );
    }

    #[test]
    fn app_config_path_falls_back_to_home_dot_config() {
        let path = app_config_path(
            "magic-resize",
            "config.json",
            Some(Path::new("")),
            Some(Path::new("/tmp/home")),
        )
        .expect("path should resolve");

        assert_eq!(
            path,
            PathBuf::from("/tmp/home/.config/magic-resize/config.json")
        );
    }

    #[test]
    fn app_config_path_errors_when_home_missing_and_xdg_unset() {
        let error = app_config_path("magic-resize", "config.json", None, None).unwrap_err();
        assert_eq!(error, ConfigPathError::MissingHomeDirectory);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let root = config_dir("missing");
        let config = load_editor_config_with(Some(&root), None);
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.default_crop, Rect::new(100.0, 100.0, 400.0, 300.0));
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn partial_config_overrides_only_given_fields() {
        let root = config_dir("partial");
        std::fs::write(
            root.join(APP_DIR).join(APP_CONFIG_FILE),
            r#"{"surface_width": 1024, "extend_endpoint": "http://localhost:8080/extend"}"#,
        )
        .expect("write config");

        let config = load_editor_config_with(Some(&root), None);
        assert_eq!(config.surface_width, 1024);
        assert_eq!(config.surface_height, 600);
        assert_eq!(
            config.extend_endpoint.as_deref(),
            Some("http://localhost:8080/extend")
        );
        assert_eq!(
            config.editor_settings().surface,
            SurfaceSize::new(1024, 600)
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let root = config_dir("malformed");
        std::fs::write(root.join(APP_DIR).join(APP_CONFIG_FILE), "{ not json")
            .expect("write config");
        assert_eq!(
            load_editor_config_with(Some(&root), None),
            EditorConfig::default()
        );
        let _ = std::fs::remove_dir_all(&root);
    }

    #[test]
    fn output_dir_defaults_to_home_pictures() {
        let config = EditorConfig::default();
        assert_eq!(
            config
                .resolve_output_dir(Some(Path::new("/tmp/home")))
                .expect("home is set"),
            PathBuf::from("/tmp/home/Pictures")
        );
        assert_eq!(
            config.resolve_output_dir(None),
            Err(ConfigPathError::MissingHomeDirectory)
        );

        let configured = EditorConfig {
            output_dir: Some(PathBuf::from("/srv/out")),
            ..EditorConfig::default()
        };
        assert_eq!(
            configured.resolve_output_dir(None).expect("configured"),
            PathBuf::from("/srv/out")
        );
    }
}
