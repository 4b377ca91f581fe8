// Hand detector boundary.
//
// The session only ever sees "zero or more hands, 21 normalized landmarks
// each". The ONNX-backed detector lives in `onnx.rs`; tests drive the
// session with scripted hands instead.

use crate::config::TensorLayout;
use crate::error::Error;
use crate::hand::{Hand, LANDMARK_COUNT, Landmark};
use crate::types::FrameBuffer;

/// Anything that turns a camera frame into detected hands.
pub trait HandDetector {
    /// Hands found in `frame`, most confident first. An empty vec means no hand.
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<Hand>, Error>;

    fn name(&self) -> &str;
}

impl<D: HandDetector + ?Sized> HandDetector for Box<D> {
    fn detect(&mut self, frame: &FrameBuffer) -> Result<Vec<Hand>, Error> {
        (**self).detect(frame)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Square crop of the frame fed to the landmark model, in frame pixels.
/// May extend past the frame edges; those samples read as black.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Roi {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Smallest crop we track with; below this the model sees mostly blur.
const MIN_ROI_SIZE: f32 = 32.0;

impl Roi {
    /// Whole frame, letterboxed into a square so the aspect ratio is kept.
    pub fn full_frame(width: usize, height: usize) -> Self {
        let size = width.max(height) as f32;
        Self {
            x: (width as f32 - size) / 2.0,
            y: (height as f32 - size) / 2.0,
            size,
        }
    }

    /// Square around a previously seen hand, `scale` times its larger bounding box side.
    pub fn around(hand: &Hand, width: usize, height: usize, scale: f32) -> Self {
        let (x0, y0, x1, y1) = hand.bounds();
        let (x0, x1) = (x0 * width as f32, x1 * width as f32);
        let (y0, y1) = (y0 * height as f32, y1 * height as f32);
        let size = ((x1 - x0).max(y1 - y0) * scale).max(MIN_ROI_SIZE);
        let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
        Self { x: cx - size / 2.0, y: cy - size / 2.0, size }
    }

    /// Nearest-neighbour resample of the crop to `side` x `side`, RGB in [0, 1].
    pub fn sample(&self, frame: &FrameBuffer, side: u32, layout: TensorLayout) -> Vec<f32> {
        let side = side as usize;
        let plane = side * side;
        let mut out = vec![0.0f32; plane * 3];
        let step = self.size / side as f32;

        for y in 0..side {
            let sy = (self.y + (y as f32 + 0.5) * step).floor() as i32;
            for x in 0..side {
                let sx = (self.x + (x as f32 + 0.5) * step).floor() as i32;
                let Some(px) = frame.get(sx, sy) else { continue };
                let rgb = [
                    ((px >> 16) & 0xFF) as f32 / 255.0,
                    ((px >> 8) & 0xFF) as f32 / 255.0,
                    (px & 0xFF) as f32 / 255.0,
                ];
                let pixel_idx = y * side + x;
                for (c, v) in rgb.into_iter().enumerate() {
                    match layout {
                        TensorLayout::Nhwc => out[pixel_idx * 3 + c] = v,
                        TensorLayout::Nchw => out[c * plane + pixel_idx] = v,
                    }
                }
            }
        }
        out
    }

    /// Map model-space landmark coordinates (pixels of the `side` x `side` input)
    /// back to coordinates normalized to the full frame.
    pub fn unproject(&self, raw: &[f32], side: u32, width: usize, height: usize) -> Option<[Landmark; LANDMARK_COUNT]> {
        if raw.len() < LANDMARK_COUNT * 3 {
            return None;
        }
        let scale = self.size / side as f32;
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        for (lm, xyz) in landmarks.iter_mut().zip(raw.chunks_exact(3)) {
            lm.x = (self.x + xyz[0] * scale) / width as f32;
            lm.y = (self.y + xyz[1] * scale) / height as f32;
            lm.z = xyz[2] / side as f32;
        }
        Some(landmarks)
    }
}

/// Pick the landmark and presence tensors out of a model's named outputs.
///
/// Outputs named `landmarks_name` / `presence_name` win. A name the model does
/// not have falls back to the first output of the right size (63 values for
/// landmarks, 1 for presence).
pub fn pick_landmark_outputs(
    outputs: &[(String, Vec<f32>)],
    landmarks_name: &str,
    presence_name: &str,
) -> Option<(Vec<f32>, f32)> {
    let by_name = |name: &str, len: usize| outputs.iter().position(|(n, data)| n == name && data.len() == len);
    let by_size = |len: usize| outputs.iter().position(|(_, data)| data.len() == len);

    let landmarks = by_name(landmarks_name, LANDMARK_COUNT * 3).or_else(|| by_size(LANDMARK_COUNT * 3))?;
    let presence = by_name(presence_name, 1).or_else(|| by_size(1))?;
    Some((outputs[landmarks].1.clone(), outputs[presence].1[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::fixtures::hand_at;
    use approx::assert_relative_eq;

    #[test]
    fn full_frame_roi_is_centered_square() {
        let roi = Roi::full_frame(640, 480);
        assert_eq!(roi, Roi { x: 0.0, y: -80.0, size: 640.0 });
    }

    #[test]
    fn roi_around_hand_scales_bbox() {
        let hand = hand_at(0.5, 0.5, [false, true, false, false, false]);
        let (x0, y0, x1, y1) = hand.bounds();
        let roi = Roi::around(&hand, 640, 480, 2.0);
        let side = ((x1 - x0) * 640.0).max((y1 - y0) * 480.0) * 2.0;
        assert_relative_eq!(roi.size, side.max(MIN_ROI_SIZE), epsilon = 1e-3);
        assert_relative_eq!(roi.x + roi.size / 2.0, (x0 + x1) / 2.0 * 640.0, epsilon = 1e-3);
        assert_relative_eq!(roi.y + roi.size / 2.0, (y0 + y1) / 2.0 * 480.0, epsilon = 1e-3);
    }

    #[test]
    fn sample_pads_outside_with_black() {
        let frame = FrameBuffer { width: 2, height: 1, pixels: vec![0x00FF_0000, 0x0000_00FF] };
        let roi = Roi::full_frame(2, 1);
        let nhwc = roi.sample(&frame, 2, TensorLayout::Nhwc);
        // the frame fills the top row of the square; the bottom row is padding
        assert_eq!(&nhwc[..6], &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(&nhwc[6..], &[0.0; 6]);

        let nchw = roi.sample(&frame, 2, TensorLayout::Nchw);
        assert_eq!(nchw, vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn unproject_maps_back_to_frame() {
        let roi = Roi { x: 100.0, y: 50.0, size: 200.0 };
        let mut raw = vec![0.0f32; 63];
        raw[24] = 112.0; // landmark 8, x at input center
        raw[25] = 0.0; // top edge
        let lms = roi.unproject(&raw, 224, 640, 480).unwrap();
        assert_relative_eq!(lms[8].x, 200.0 / 640.0, epsilon = 1e-5);
        assert_relative_eq!(lms[8].y, 50.0 / 480.0, epsilon = 1e-5);
        assert!(roi.unproject(&raw[..10], 224, 640, 480).is_none());
    }

    fn named(name: &str, data: Vec<f32>) -> (String, Vec<f32>) {
        (name.to_string(), data)
    }

    #[test]
    fn presence_is_picked_by_name_over_handedness() {
        let outputs = vec![
            named("Identity_2", vec![0.03]), // handedness, left hand
            named("Identity", vec![1.0; 63]),
            named("Identity_1", vec![0.98]),
        ];
        let (landmarks, presence) = pick_landmark_outputs(&outputs, "Identity", "Identity_1").unwrap();
        assert_eq!(landmarks.len(), 63);
        assert_relative_eq!(presence, 0.98);
    }

    #[test]
    fn unknown_names_fall_back_to_output_sizes() {
        let outputs = vec![named("landmarks", vec![2.0; 63]), named("score", vec![0.9]), named("world", vec![0.0; 63])];
        let (landmarks, presence) = pick_landmark_outputs(&outputs, "Identity", "Identity_1").unwrap();
        assert_eq!(landmarks[0], 2.0);
        assert_relative_eq!(presence, 0.9);
        assert!(pick_landmark_outputs(&outputs[..1], "Identity", "Identity_1").is_none());
    }
}
