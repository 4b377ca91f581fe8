// Hand landmark detection with ONNX Runtime.
//
// Runs a MediaPipe-compatible hand landmark model (one hand per pass,
// outputs: 63 screen coordinates + presence score). Without a tracked hand
// the whole frame is scanned; once a hand is found, the next frame is
// cropped around it, which is both faster to converge and more accurate.

use ndarray::Array4;
use ort::session::Session;

use crate::config::{DetectorConfig, TensorLayout};
use crate::detector::{HandDetector, Roi, pick_landmark_outputs};
use crate::error::Error;
use crate::hand::{Hand, LANDMARK_COUNT};
use crate::types::FrameBuffer;

pub struct OnnxHandDetector {
    session: Session,
    config: DetectorConfig,
    /// Hand accepted on the previous frame; drives the tracking crop.
    tracked: Option<Hand>,
}

impl OnnxHandDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, Error> {
        if !config.model_path.exists() {
            return Err(Error::Detector(format!(
                "Hand landmark model not found: {:?}",
                config.model_path
            )));
        }

        let session = Session::builder()
            .map_err(|e| Error::Detector(format!("Failed to create session builder: {e}")))?
            .with_intra_threads(2)
            .map_err(|e| Error::Detector(format!("Failed to set threads: {e}")))?
            .commit_from_file(&config.model_path)
            .map_err(|e| Error::Detector(format!("Failed to load hand landmark model: {e}")))?;

        log::info!("Loaded hand landmark model from {:?}", config.model_path);

        Ok(Self { session, config, tracked: None })
    }

    /// One model pass over `roi`. Returns the hand and its presence score.
    fn infer(&mut self, frame: &FrameBuffer, roi: Roi) -> Result<Option<Hand>, Error> {
        let side = self.config.input_size;
        let input = roi.sample(frame, side, self.config.layout);
        let (raw, presence) = run_landmarks(&mut self.session, input, side as usize, &self.config)?;

        let Some(landmarks) = roi.unproject(&raw, side, frame.width, frame.height) else {
            return Ok(None);
        };
        Ok(Some(Hand { landmarks, score: presence }))
    }
}

impl HandDetector for OnnxHandDetector {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<Hand>, Error> {
        if let Some(prev) = self.tracked.take() {
            let roi = Roi::around(&prev, frame.width, frame.height, self.config.roi_scale);
            if let Some(hand) = self.infer(frame, roi)? {
                if hand.score >= self.config.min_tracking_confidence {
                    self.tracked = Some(hand.clone());
                    return Ok(vec![hand]);
                }
                log::trace!("Tracking lost (presence {:.2})", hand.score);
            }
        }

        let roi = Roi::full_frame(frame.width, frame.height);
        match self.infer(frame, roi)? {
            Some(hand) if hand.score >= self.config.min_detection_confidence => {
                log::trace!("Hand found (presence {:.2})", hand.score);
                self.tracked = Some(hand.clone());
                Ok(vec![hand])
            }
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &str {
        "onnx-hand-landmark"
    }
}

/// Run the model and pick out the landmark and presence outputs.
fn run_landmarks(
    session: &mut Session,
    input: Vec<f32>,
    side: usize,
    config: &DetectorConfig,
) -> Result<(Vec<f32>, f32), Error> {
    let shape = match config.layout {
        TensorLayout::Nhwc => (1, side, side, 3),
        TensorLayout::Nchw => (1, 3, side, side),
    };
    let input_array = Array4::from_shape_vec(shape, input)
        .map_err(|e| Error::Detector(format!("Failed to create input array: {e}")))?;
    let input_tensor = ort::value::Tensor::from_array(input_array)
        .map_err(|e| Error::Detector(format!("Failed to create tensor: {e}")))?;

    let outputs = session
        .run(ort::inputs![input_tensor])
        .map_err(|e| Error::Detector(format!("Inference failed: {e}")))?;

    let mut tensors = Vec::new();
    for output in outputs.iter() {
        let name: &str = &output.0;
        let (_shape, data) = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::Detector(format!("Failed to extract output {name}: {e}")))?;
        tensors.push((name.to_string(), data.to_vec()));
    }

    pick_landmark_outputs(&tensors, &config.landmarks_output, &config.presence_output).ok_or_else(|| {
        Error::Detector(format!(
            "Model outputs don't look like hand landmarks (expected {} values and a presence score)",
            LANDMARK_COUNT * 3
        ))
    })
}
