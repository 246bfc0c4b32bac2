//! Named output sizes offered to the user.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, Rect};

/// Where a preset's crop window is anchored on the surface.
pub const DEFAULT_PRESET_ORIGIN: Point = Point::new(100.0, 100.0);

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read presets file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid presets json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate preset name: {0}")]
    DuplicateName(String),
    #[error("preset {name} has a zero dimension")]
    ZeroDimension { name: String },
    #[error("unknown preset: {0}")]
    Unknown(String),
}

pub type PresetResult<T> = std::result::Result<T, PresetError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub aspect_ratio_label: String,
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl Preset {
    pub fn new(name: &str, width: u32, height: u32, aspect_ratio_label: &str) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            aspect_ratio_label: aspect_ratio_label.to_string(),
            icon_url: None,
        }
    }

    pub fn crop_rect(&self, origin: Point) -> Rect {
        Rect::new(
            origin.x,
            origin.y,
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

pub trait PresetProvider {
    fn presets(&self) -> Vec<Preset>;
}

/// Common social-media sizes, available without a presets file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinPresets;

impl PresetProvider for BuiltinPresets {
    fn presets(&self) -> Vec<Preset> {
        vec![
            Preset::new("Instagram Post", 1080, 1080, "1:1"),
            Preset::new("Instagram Story", 1080, 1920, "9:16"),
            Preset::new("Facebook Post", 1200, 630, "1.91:1"),
            Preset::new("Twitter Post", 1600, 900, "16:9"),
            Preset::new("LinkedIn Post", 1200, 627, "1.91:1"),
            Preset::new("YouTube Thumbnail", 1280, 720, "16:9"),
            Preset::new("Pinterest Pin", 1000, 1500, "2:3"),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct PresetDocument {
    size_presets: Vec<Preset>,
}

/// Presets parsed from a `{"size_presets": [...]}` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPresetProvider {
    presets: Vec<Preset>,
}

impl JsonPresetProvider {
    pub fn from_json(json: &str) -> PresetResult<Self> {
        let document: PresetDocument = serde_json::from_str(json)?;
        validate(&document.size_presets)?;
        Ok(Self {
            presets: document.size_presets,
        })
    }

    pub fn from_path(path: &Path) -> PresetResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| PresetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let provider = Self::from_json(&contents)?;
        tracing::info!(
            path = %path.display(),
            count = provider.presets.len(),
            "loaded presets"
        );
        Ok(provider)
    }
}

impl PresetProvider for JsonPresetProvider {
    fn presets(&self) -> Vec<Preset> {
        self.presets.clone()
    }
}

fn validate(presets: &[Preset]) -> PresetResult<()> {
    let mut seen = HashSet::with_capacity(presets.len());
    for preset in presets {
        if preset.width == 0 || preset.height == 0 {
            return Err(PresetError::ZeroDimension {
                name: preset.name.clone(),
            });
        }
        if !seen.insert(preset.name.as_str()) {
            return Err(PresetError::DuplicateName(preset.name.clone()));
        }
    }
    Ok(())
}

/// Looks up a preset by name, ignoring ASCII case.
pub fn find_preset(provider: &dyn PresetProvider, name: &str) -> PresetResult<Preset> {
    provider
        .presets()
        .into_iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| PresetError::Unknown(name.to_string()))
}
