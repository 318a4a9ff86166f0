use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use genre_atlas::app::GenreAtlasApp;
use genre_atlas::config::AppConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Genre taxonomy file to chart.
    #[arg(long, default_value = "data/genres.json")]
    data: PathBuf,

    /// Config file location.
    #[arg(long, default_value = "genre-atlas.toml")]
    config: PathBuf,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("genre_atlas=info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load_or_default(&args.config);

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "genre atlas",
        options,
        Box::new(move |cc| Ok(Box::new(GenreAtlasApp::new(cc, args.data.clone(), config.clone())))),
    )
}
