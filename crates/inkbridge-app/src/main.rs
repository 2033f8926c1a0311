//! `inkbridge`: load an SVG onto a canvas and export the canvas as PNG.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use inkbridge_app::{BridgeConfig, InkBridge};

#[derive(Parser, Debug)]
#[command(name = "inkbridge", version, about = "Rasterize an SVG onto a canvas and export it as PNG")]
struct Cli {
    /// SVG source: a path, a file:// or data: URL, or http(s):// with the `network` feature
    url: String,

    /// Output PNG path
    #[arg(short, long, default_value = "inkbridge.png")]
    output: PathBuf,

    /// Print the PNG as a data: URL instead of writing a file
    #[arg(long)]
    data_url: bool,

    /// Show the alignment grid
    #[arg(long)]
    grid: bool,

    /// Grid tile size in pixels
    #[arg(long)]
    tile: Option<f64>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Canvas width (defaults to the config, then the image width)
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height (defaults to the config, then the image height)
    #[arg(long)]
    height: Option<f64>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = block_on(run(cli)) {
        log::error!("{}", e);
        eprintln!("inkbridge: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "network")]
fn block_on<F: std::future::Future>(future: F) -> F::Output {
    match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(future),
        Err(e) => {
            eprintln!("inkbridge: cannot start runtime: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "network"))]
fn block_on<F: std::future::Future>(future: F) -> F::Output {
    pollster::block_on(future)
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::default(),
    };
    if let Some(tile) = cli.tile {
        config.grid.tile_size = tile;
    }
    config.show_grid |= cli.grid;

    let mut ink = InkBridge::from_config(&config)?;
    log::info!("Loading {}", cli.url);
    let image = ink.load_from_url(&cli.url).await?;

    // Without an explicit size the canvas fits the image.
    let (image_width, image_height) = image.declared_size();
    let width = cli
        .width
        .unwrap_or(if cli.config.is_some() { config.canvas.width } else { image_width });
    let height = cli
        .height
        .unwrap_or(if cli.config.is_some() { config.canvas.height } else { image_height });
    if (width, height) != (ink.canvas().width(), ink.canvas().height()) {
        ink.set_canvas_size(width, height);
        if ink.grid_visible() {
            ink.toggle_grid(true)?;
        }
    }

    if cli.data_url {
        println!("{}", ink.to_data_url()?);
        return Ok(());
    }

    let png = ink.export_png()?;
    std::fs::write(&cli.output, &png)?;
    log::info!(
        "Wrote {}x{} canvas to {:?} ({} bytes)",
        ink.canvas().width(),
        ink.canvas().height(),
        cli.output,
        png.len()
    );
    Ok(())
}
