//! Ready-made preparers and handlers for the MiniToolStream connector.
//!
//! Preparers build messages from in-memory data, files and images. Handlers
//! log received messages or save them to disk.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod content_type;
mod data;
mod error;
mod file;
mod file_saver;
mod image;
mod image_saver;
mod logger;

pub use content_type::{
    DEFAULT_CONTENT_TYPE, DEFAULT_IMAGE_CONTENT_TYPE, content_type_for_path, extension_for,
    image_content_type_for_path, image_extension_for,
};
pub use data::{DataPreparer, DataPreparerOptions};
pub use error::Error;
pub use file::{FilePreparer, FilePreparerOptions};
pub use file_saver::FileSaver;
pub use image::{ImagePreparer, ImagePreparerOptions};
pub use image_saver::ImageSaver;
pub use logger::LogHandler;
