// Hand-gesture doodling over a live webcam feed.
//
// The index fingertip draws onto a persistent canvas, touching the palette
// strip at the top of the frame picks a color or the eraser. Everything that
// does not need a camera or a window lives behind `session::Doodle` and
// `detector::HandDetector` so it can be tested with synthetic hands.

pub mod camera;
pub mod canvas;
pub mod config;
pub mod detector;
pub mod draw;
pub mod error;
pub mod hand;
pub mod launcher;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod palette;
pub mod session;
pub mod smoothing;
pub mod types;

pub use error::Error;
