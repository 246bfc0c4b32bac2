use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use magic_resize::app::RunOptions;
use magic_resize::source::ImageReference;

#[derive(Parser, Debug)]
#[command(
    name = "magic-resize",
    about = "Crop an image to a preset and extend it past its edges"
)]
struct Cli {
    /// Image path or `data:image/...;base64,...` URL.
    image: String,

    /// Preset name, e.g. "Instagram Post".
    #[arg(long)]
    preset: Option<String>,

    /// JSON file with a `size_presets` list.
    #[arg(long, env = "MAGIC_RESIZE_PRESETS")]
    presets: Option<PathBuf>,

    /// Directory for finished crops (default: $HOME/Pictures).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Edge-extension service URL.
    #[arg(long, env = "MAGIC_RESIZE_ENDPOINT")]
    endpoint: Option<String>,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_x: f64,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    offset_y: f64,

    /// Also write the rendered editor frame to this PNG.
    #[arg(long)]
    preview: Option<PathBuf>,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        let offset = (self.offset_x != 0.0 || self.offset_y != 0.0)
            .then_some((self.offset_x, self.offset_y));
        RunOptions {
            preset: self.preset,
            presets_file: self.presets,
            output_dir: self.output,
            endpoint: self.endpoint,
            offset,
            preview: self.preview,
            ..RunOptions::new(ImageReference::parse(&self.image))
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let receipt = magic_resize::run(cli.into_options())
        .context("magic resize failed")?;
    println!("{receipt}");
    Ok(())
}
