use clap::Parser;
use std::path::PathBuf;

use crate::convert::DEFAULT_EXTENSIONS;
use crate::geometry::DEFAULT_PADDING;

#[derive(Parser, Debug)]
#[command(name = "icdar2tess")]
#[command(version, about = "Converter from ICDAR dataset to Tesseract dataset")]
pub struct Cli {
    /// Folder holding the ICDAR images and their .txt annotations
    #[arg(short, long = "input_folder", alias = "input-folder", value_name = "input")]
    pub input_folder: PathBuf,

    /// Folder receiving the <name>_<n>.tif / <name>_<n>.gt.txt pairs
    #[arg(short, long = "output_folder", alias = "output-folder", value_name = "output")]
    pub output_folder: PathBuf,

    /// Pixels each corner is pushed outward before rectification
    #[arg(short, long, default_value_t = DEFAULT_PADDING, allow_negative_numbers = true)]
    pub padding: i32,

    /// Image extensions to pick up (case-sensitive)
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_values_t = DEFAULT_EXTENSIONS.map(String::from)
    )]
    pub extensions: Vec<String>,

    /// Show per-record details
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["icdar2tess", "-i", "in", "-o", "out"]).unwrap();
        assert_eq!(cli.input_folder, PathBuf::from("in"));
        assert_eq!(cli.output_folder, PathBuf::from("out"));
        assert_eq!(cli.padding, 5);
        assert_eq!(cli.extensions, vec!["jpg", "png", "jpeg", "JPG"]);
        assert_eq!(cli.log_level(), log::LevelFilter::Info);
    }

    #[test]
    fn test_long_names() {
        let cli = Cli::try_parse_from([
            "icdar2tess",
            "--input_folder",
            "in",
            "--output-folder",
            "out",
            "--padding",
            "0",
            "--extensions",
            "tif,bmp",
            "--verbose",
        ])
        .unwrap();
        assert_eq!(cli.padding, 0);
        assert_eq!(cli.extensions, vec!["tif", "bmp"]);
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_folders_are_required() {
        assert!(Cli::try_parse_from(["icdar2tess", "-i", "in"]).is_err());
        assert!(Cli::try_parse_from(["icdar2tess", "-o", "out"]).is_err());
    }

    #[test]
    fn test_command_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
