use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::ImageReader;

use crate::annotation::parse_annotations;
use crate::transform::{rectify, RectifiedCrop};

/// Extension of the per-image ICDAR annotation file
pub const ICDAR_ANNOTATION_EXT: &str = "txt";
/// Extension of each rectified crop
pub const TESS_IMAGE_EXT: &str = "tif";
/// Extension of each crop's transcription file
pub const TESS_TRANSCRIPTION_EXT: &str = "gt.txt";
/// Image extensions picked up from the input folder
pub const DEFAULT_EXTENSIONS: [&str; 4] = ["jpg", "png", "jpeg", "JPG"];

/// List the images directly inside `dir` whose extension is one of `extensions`.
///
/// Matching is case-sensitive and non-recursive. Paths come back sorted.
pub fn find_images(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read input folder: {:?}", dir))?;

    let mut images = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {:?}", dir))?
            .path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext));
        if matches {
            images.push(path);
        }
    }

    images.sort();
    Ok(images)
}

/// Annotation file that belongs to `image`: same folder, same stem, `.txt`
pub fn annotation_path(image: &Path) -> PathBuf {
    image.with_extension(ICDAR_ANNOTATION_EXT)
}

/// Writes rectified crops of every image into one output folder
#[derive(Debug, Clone)]
pub struct DatasetConverter {
    output_folder: PathBuf,
    padding: i32,
}

impl DatasetConverter {
    pub fn new(output_folder: impl Into<PathBuf>, padding: i32) -> Self {
        Self {
            output_folder: output_folder.into(),
            padding,
        }
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Shared root of the `<stem>_<index>` output pair
    pub fn output_root(&self, image: &Path, index: usize) -> PathBuf {
        let stem = image.file_stem().unwrap_or_default().to_string_lossy();
        self.output_folder.join(format!("{}_{}", stem, index))
    }

    /// Convert one image and its annotation file.
    ///
    /// Returns the number of crops written. Indices are contiguous from 0 and
    /// only advance for records that pass the validity gate.
    pub fn convert_image(&self, image_path: &Path) -> Result<usize> {
        let ann_path = annotation_path(image_path);
        let text = fs::read_to_string(&ann_path)
            .with_context(|| format!("Failed to read annotation file: {:?}", ann_path))?;
        let records = parse_annotations(&text).map_err(|(line, e)| {
            anyhow::Error::new(e).context(format!("Invalid annotation at {:?}:{}", ann_path, line))
        })?;

        let img = ImageReader::open(image_path)
            .with_context(|| format!("Failed to open input file: {:?}", image_path))?
            .decode()
            .with_context(|| format!("Failed to decode image: {:?}", image_path))?
            .to_rgb8();

        log::debug!(
            "Loaded image: {:?} ({}x{}), {} usable records",
            image_path,
            img.width(),
            img.height(),
            records.len()
        );

        for (index, (line, record)) in records.iter().enumerate() {
            let crop = rectify(&img, record, self.padding);
            let root = self.output_root(image_path, index);
            log::debug!(
                "Line {} -> {:?} ({}x{})",
                line,
                root,
                crop.image.width(),
                crop.image.height()
            );
            write_crop(&root, &crop)?;
        }

        Ok(records.len())
    }
}

/// Write `<root>.tif` and `<root>.gt.txt`.
///
/// An empty crop produces an empty `.tif` file, since no encoder accepts a
/// zero-sized image.
pub fn write_crop(root: &Path, crop: &RectifiedCrop) -> Result<()> {
    let file_name = root.file_name().unwrap_or_default().to_string_lossy();
    let image_path = root.with_file_name(format!("{}.{}", file_name, TESS_IMAGE_EXT));
    let text_path = root.with_file_name(format!("{}.{}", file_name, TESS_TRANSCRIPTION_EXT));

    if crop.is_empty() {
        log::warn!("Empty crop, writing empty file: {:?}", image_path);
        fs::File::create(&image_path)
            .with_context(|| format!("Failed to create output: {:?}", image_path))?;
    } else {
        crop.image
            .save(&image_path)
            .with_context(|| format!("Failed to save output: {:?}", image_path))?;
    }

    fs::write(&text_path, &crop.transcription)
        .with_context(|| format!("Failed to write transcription: {:?}", text_path))?;

    Ok(())
}
