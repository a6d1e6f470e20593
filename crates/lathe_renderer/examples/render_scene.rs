//! Render a built-in scene to an image file.
//!
//! Usage: render_scene <cornell|vase> <output.png> [config.json] [width height]

use anyhow::{bail, Context, Result};
use lathe_renderer::{render_with_stats, scenes, RenderConfig};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 {
        bail!(
            "usage: render_scene <{}> <output> [config.json] [width height]",
            scenes::SCENE_NAMES.join("|")
        );
    }
    let name = &args[0];
    let output = &args[1];

    let config = match args.get(2) {
        Some(path) => RenderConfig::from_json_file(path).with_context(|| format!("loading {}", path))?,
        None => RenderConfig::default(),
    };

    let (width, height) = match (args.get(3), args.get(4)) {
        (Some(w), Some(h)) => (w.parse().context("width")?, h.parse().context("height")?),
        _ => (640, 480),
    };

    let scene = match scenes::by_name(name, width, height) {
        Some(scene) => scene?,
        None => bail!("unknown scene '{}', expected one of {:?}", name, scenes::SCENE_NAMES),
    };

    let (image, stats) = render_with_stats(&scene, &config);
    log::info!("{} radiance evaluations", stats.calls);

    image.save(output)?;
    Ok(())
}
