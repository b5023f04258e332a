use anyhow::{Context, Result};
use clap::Parser;

use icdar2tess::{find_images, Cli, DatasetConverter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let images = find_images(&cli.input_folder, &cli.extensions)
        .context("Failed to list input images")?;
    log::debug!(
        "Found {} images in {:?} (extensions: {})",
        images.len(),
        cli.input_folder,
        cli.extensions.join(",")
    );

    std::fs::create_dir_all(&cli.output_folder)
        .with_context(|| format!("Failed to create output folder: {:?}", cli.output_folder))?;

    let converter = DatasetConverter::new(&cli.output_folder, cli.padding);

    let mut total = 0;
    for image_path in &images {
        let written = converter.convert_image(image_path)?;
        total += written;
        eprintln!("{}: {} crops", image_path.display(), written);
    }

    eprintln!();
    eprintln!(
        "Process done. {} crops from {} images written to {:?}",
        total,
        images.len(),
        converter.output_folder()
    );

    Ok(())
}
