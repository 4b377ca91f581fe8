// Runtime configuration for the doodle loop.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::canvas::DEFAULT_MASK_THRESHOLD;
use crate::error::Error;

/// Everything the doodle session and its devices need. Loaded from JSON; missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoodleConfig {
    /// Camera device index.
    pub camera_index: u32,
    /// Requested capture width.
    pub frame_width: u32,
    /// Requested capture height.
    pub frame_height: u32,
    /// Window title.
    pub window_title: String,
    /// Directory of palette icon images.
    pub palette_dir: PathBuf,
    /// Height of the palette strip in pixels.
    pub palette_height: usize,
    /// Brush thickness for colors.
    pub draw_thickness: u32,
    /// Brush thickness for the eraser.
    pub eraser_thickness: u32,
    /// Number of fingertip positions averaged per stroke point.
    pub smoothing: usize,
    /// Canvas luminance above which a pixel counts as drawn.
    pub mask_threshold: u8,
    /// Treat a frame without a hand like a released gesture.
    pub reset_on_lost_hand: bool,
    /// Draw the hand skeleton over the video.
    pub show_landmarks: bool,
    /// Landmark model settings.
    pub detector: DetectorConfig,
}

impl Default for DoodleConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            frame_width: 640,
            frame_height: 480,
            window_title: "Hand Gesture Doodle".to_string(),
            palette_dir: PathBuf::from("colors"),
            palette_height: 100,
            draw_thickness: 5,
            eraser_thickness: 50,
            smoothing: 5,
            mask_threshold: DEFAULT_MASK_THRESHOLD,
            reset_on_lost_hand: true,
            show_landmarks: true,
            detector: DetectorConfig::default(),
        }
    }
}

impl DoodleConfig {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Hand landmark model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// ONNX hand landmark model (MediaPipe-compatible, 21 landmarks).
    pub model_path: PathBuf,
    /// Square model input size in pixels.
    pub input_size: u32,
    /// Input tensor layout.
    pub layout: TensorLayout,
    /// Presence score needed to accept a hand found on the full frame.
    pub min_detection_confidence: f32,
    /// Presence score needed to keep tracking a hand from the previous frame.
    pub min_tracking_confidence: f32,
    /// Tracking crop size relative to the previous hand's bounding box.
    pub roi_scale: f32,
    /// Name of the 63-value screen landmark output.
    pub landmarks_output: String,
    /// Name of the hand presence output. Handedness is also a single value, so pick by name.
    pub presence_output: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/hand_landmark.onnx"),
            input_size: 224,
            layout: TensorLayout::Nhwc,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
            roi_scale: 2.0,
            landmarks_output: "Identity".to_string(),
            presence_output: "Identity_1".to_string(),
        }
    }
}

/// Model input tensor layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensorLayout {
    /// (1, H, W, 3)
    Nhwc,
    /// (1, 3, H, W)
    Nchw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo_settings() {
        let cfg = DoodleConfig::default();
        assert_eq!((cfg.frame_width, cfg.frame_height), (640, 480));
        assert_eq!(cfg.palette_height, 100);
        assert_eq!(cfg.draw_thickness, 5);
        assert_eq!(cfg.eraser_thickness, 50);
        assert_eq!(cfg.smoothing, 5);
        assert_eq!(cfg.detector.min_detection_confidence, 0.7);
        assert_eq!(cfg.detector.min_tracking_confidence, 0.7);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doodle.json");
        fs::write(&path, r#"{ "camera_index": 2, "detector": { "layout": "Nchw" } }"#).unwrap();
        let cfg = DoodleConfig::load(&path).unwrap();
        assert_eq!(cfg.camera_index, 2);
        assert_eq!(cfg.detector.layout, TensorLayout::Nchw);
        assert_eq!(cfg.detector.input_size, 224);
        assert_eq!(cfg.detector.presence_output, "Identity_1");
        assert_eq!(cfg.palette_dir, PathBuf::from("colors"));
    }

    #[test]
    fn bad_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ camera_index: }").unwrap();
        let err = DoodleConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
