pub mod annotation;
pub mod cli;
pub mod convert;
pub mod geometry;
pub mod transform;

pub use annotation::{AnnotationRecord, ParseError};
pub use cli::Cli;
pub use convert::{annotation_path, find_images, write_crop, DatasetConverter};
pub use geometry::{perspective_transform, Point, Quad, DEFAULT_PADDING};
pub use transform::{rectify, rectify_quad, warp_perspective, RectifiedCrop};
