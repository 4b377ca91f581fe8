// One error type for the whole crate.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String), // Creating the window failed
    #[error("Window update error: {0}")]
    WindowUpdate(String), // Updating the window buffer failed
    #[error("Camera init error: {0}")]
    CameraInit(String), // Opening/starting the camera failed
    #[error("Camera frame error: {0}")]
    CameraFrame(String), // Grabbing/decoding a frame failed
    #[error("No palette images found in {0:?}")]
    EmptyPalette(PathBuf), // Palette strip is mandatory UI
    #[error("Buffer size mismatch: {0}")]
    SizeMismatch(String), // Two buffers that must agree in size don't
    #[error("Hand detector error: {0}")]
    Detector(String), // Loading or running the landmark model failed
    #[error("Config error in {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
