//! Headless application flow: load an image, shape the crop, submit it.

mod session;
pub mod worker;

use std::path::{Path, PathBuf};

use crate::config::{config_env_dirs, EditorConfig};
use crate::editor::RectangleEditor;
use crate::error::AppResult;
use crate::geometry::Point;
use crate::presets::{find_preset, BuiltinPresets, JsonPresetProvider, PresetProvider};
use crate::source::{DecodingImageSource, ImageReference};
use crate::state::DragState;
use crate::submit::{FileSink, RemoteExtendSink, RoutingSink, SubmissionReceipt, SubmissionSink};

pub use session::{EditorSession, SessionEvent};

type ExtendSink = Box<dyn SubmissionSink + Send + Sync>;

/// One editing run, usually built from command-line arguments.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub image: ImageReference,
    pub preset: Option<String>,
    pub presets_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub endpoint: Option<String>,
    /// Image window nudge, applied as a drag from the image centre.
    pub offset: Option<(f64, f64)>,
    /// Where to write the rendered editor frame, if anywhere.
    pub preview: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(image: ImageReference) -> Self {
        Self {
            image,
            preset: None,
            presets_file: None,
            output_dir: None,
            endpoint: None,
            offset: None,
            preview: None,
        }
    }
}

pub struct App {
    config: EditorConfig,
}

impl App {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn run(&self, options: RunOptions) -> AppResult<SubmissionReceipt> {
        let config = self.effective_config(&options);
        let mut editor = RectangleEditor::new(config.editor_settings());

        if let Some(name) = options.preset.as_deref() {
            let provider = preset_provider(config.presets_file.as_deref())?;
            let preset = find_preset(provider.as_ref(), name)?;
            tracing::info!(
                preset = %preset.name,
                width = preset.width,
                height = preset.height,
                "using preset"
            );
            editor.apply_preset(preset.crop_rect(config.preset_origin));
        }

        let sink = build_sink(&config, &options.image)?;
        let mut session = EditorSession::new(editor, DecodingImageSource, sink);
        session.open(options.image.clone());
        let size = session.wait_for_image()?;
        tracing::info!(width = size.width, height = size.height, "image loaded");

        if let Some((dx, dy)) = options.offset {
            nudge_image(session.editor_mut(), dx, dy);
        }

        if let Some(path) = options.preview.as_deref() {
            write_preview(session.editor(), path)?;
        }

        session.submit()?;
        session.wait_for_submission()
    }

    fn effective_config(&self, options: &RunOptions) -> EditorConfig {
        let mut config = self.config.clone();
        if options.presets_file.is_some() {
            config.presets_file.clone_from(&options.presets_file);
        }
        if options.output_dir.is_some() {
            config.output_dir.clone_from(&options.output_dir);
        }
        if options.endpoint.is_some() {
            config.extend_endpoint.clone_from(&options.endpoint);
        }
        config
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

fn preset_provider(presets_file: Option<&Path>) -> AppResult<Box<dyn PresetProvider>> {
    match presets_file {
        Some(path) => Ok(Box::new(JsonPresetProvider::from_path(path)?)),
        None => Ok(Box::new(BuiltinPresets)),
    }
}

fn build_sink(
    config: &EditorConfig,
    image: &ImageReference,
) -> AppResult<RoutingSink<FileSink, ExtendSink>> {
    let (_, home) = config_env_dirs();
    let output_dir = config.resolve_output_dir(home.as_deref())?;
    let files = FileSink::new(output_dir, image.stem());
    let extend: ExtendSink = match config.extend_endpoint.as_deref() {
        Some(endpoint) => Box::new(RemoteExtendSink::new(endpoint)?),
        None => {
            tracing::debug!("no extension endpoint; overflowing crops will be refused");
            Box::new(files.clone())
        }
    };
    Ok(RoutingSink::new(files, extend))
}

/// Simulates a press at the image centre, a move by `(dx, dy)` and a release.
fn nudge_image(editor: &mut RectangleEditor, dx: f64, dy: f64) {
    let image = editor.geometry().image();
    let start = Point::new(image.x + image.width / 2.0, image.y + image.height / 2.0);
    let state = editor.pointer_press(start);
    if state == DragState::DraggingImage {
        editor.pointer_move(Point::new(start.x + dx, start.y + dy));
    } else {
        tracing::warn!(?state, "image centre is covered by a handle; offset ignored");
    }
    editor.pointer_release();
}

fn write_preview(editor: &RectangleEditor, path: &Path) -> AppResult<()> {
    if let Some(frame) = editor.rasterize_frame()? {
        frame.save_with_format(path, image::ImageFormat::Png)?;
        tracing::info!(path = %path.display(), "wrote editor preview");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::geometry::Rect;
    use crate::submit::SubmitError;
    use image::{Rgba, RgbaImage};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "magic-resize-app-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("scratch dir");
        dir
    }

    fn write_png(dir: &Path, width: u32, height: u32) -> PathBuf {
        let path = dir.join("input.png");
        RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 255]))
            .save(&path)
            .expect("write input png");
        path
    }

    fn options_for(dir: &Path, input: PathBuf) -> RunOptions {
        RunOptions {
            output_dir: Some(dir.join("out")),
            ..RunOptions::new(ImageReference::Path(input))
        }
    }

    #[test]
    fn matching_aspect_is_saved_as_finished_png() {
        let dir = scratch_dir("finished");
        let input = write_png(&dir, 800, 600);
        let mut options = options_for(&dir, input);
        options.preview = Some(dir.join("preview.png"));

        let receipt = App::default().run(options).expect("run should save");
        assert_eq!(
            receipt,
            SubmissionReceipt::Saved(dir.join("out").join("magic_resize_input.png"))
        );
        let saved = image::open(dir.join("out").join("magic_resize_input.png")).expect("saved");
        assert_eq!((saved.width(), saved.height()), (400, 300));
        let preview = image::open(dir.join("preview.png")).expect("preview");
        assert_eq!((preview.width(), preview.height()), (800, 600));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn offset_without_endpoint_is_refused_as_extend() {
        let dir = scratch_dir("offset");
        let input = write_png(&dir, 800, 600);
        let mut options = options_for(&dir, input);
        options.offset = Some((40.0, 0.0));

        let err = App::default().run(options).expect_err("extend needs an endpoint");
        assert!(matches!(
            err,
            AppError::Submit(SubmitError::Unsupported("extend"))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_preset_fails_before_loading() {
        let dir = scratch_dir("preset");
        let mut options = options_for(&dir, dir.join("missing.png"));
        options.preset = Some("Billboard".to_string());
        let err = App::default().run(options).expect_err("unknown preset");
        assert!(matches!(err, AppError::Preset(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_image_reports_source_error() {
        let dir = scratch_dir("missing");
        let options = options_for(&dir, dir.join("missing.png"));
        let err = App::default().run(options).expect_err("missing input");
        assert!(matches!(err, AppError::Source(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn nudge_moves_only_the_image_window() {
        let mut editor = RectangleEditor::default();
        editor.load_bitmap(RgbaImage::new(400, 300));
        let crop = editor.geometry().crop();
        nudge_image(&mut editor, -30.0, 12.0);
        assert_eq!(editor.geometry().crop(), crop);
        assert_eq!(
            editor.geometry().image(),
            Rect::new(70.0, 112.0, 400.0, 300.0)
        );
        assert_eq!(editor.drag_state(), DragState::Idle);
    }

    #[test]
    fn cli_overrides_take_precedence_over_config() {
        let app = App::new(EditorConfig {
            extend_endpoint: Some("http://config/extend".to_string()),
            ..EditorConfig::default()
        });
        let mut options = RunOptions::new(ImageReference::Bytes(Vec::new()));
        options.endpoint = Some("http://cli/extend".to_string());
        let config = app.effective_config(&options);
        assert_eq!(config.extend_endpoint.as_deref(), Some("http://cli/extend"));
        assert_eq!(config.output_dir, None);
    }
}
