// Hand landmarks and the finger-state classifier.
//
// Landmark indices follow the MediaPipe hand model: 21 points, wrist first,
// then four joints per finger from the base outwards.

use crate::types::Point;

pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices used by the classifier and the skeleton overlay.
pub mod idx {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// Fingertip landmarks, thumb first.
pub const TIPS: [usize; 5] = [idx::THUMB_TIP, idx::INDEX_TIP, idx::MIDDLE_TIP, idx::RING_TIP, idx::PINKY_TIP];
/// The joint each tip is compared against.
pub const KNUCKLES: [usize; 5] = [idx::THUMB_IP, idx::INDEX_PIP, idx::MIDDLE_PIP, idx::RING_PIP, idx::PINKY_PIP];

/// Bones of the hand skeleton, as landmark index pairs.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

/// One landmark, x/y normalized to the frame (0.0..1.0), z relative depth (unused).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Pixel position in a `width` x `height` frame (truncated toward zero).
    ///
    /// Landmarks far outside the frame are pulled into a band one frame size
    /// wide on each side, so downstream pixel math stays small.
    pub fn to_pixel(&self, width: usize, height: usize) -> Point {
        let (w, h) = (width as i32, height as i32);
        Point::new(
            ((self.x * width as f32) as i32).clamp(-w, 2 * w),
            ((self.y * height as f32) as i32).clamp(-h, 2 * h),
        )
    }
}

/// A single detected hand.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    /// Presence score reported by the model (0.0..1.0).
    pub score: f32,
}

impl Hand {
    pub fn new(landmarks: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { landmarks, score: 1.0 }
    }

    pub fn index_tip(&self) -> Landmark {
        self.landmarks[idx::INDEX_TIP]
    }

    /// Normalized bounding box `(min_x, min_y, max_x, max_y)` of all landmarks.
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        self.landmarks.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), lm| (x0.min(lm.x), y0.min(lm.y), x1.max(lm.x), y1.max(lm.y)),
        )
    }

    pub fn finger_state(&self) -> FingerState {
        FingerState::classify(self)
    }
}

/// Which fingers are extended: thumb, index, middle, ring, pinky.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerState(pub [bool; 5]);

impl FingerState {
    /// Tip-vs-knuckle heuristic. The thumb compares x (the frame is mirrored,
    /// so an extended thumb sits left of its knuckle); the other four compare
    /// y (extended means the tip is above the knuckle in image coordinates).
    pub fn classify(hand: &Hand) -> Self {
        let lm = &hand.landmarks;
        let mut up = [false; 5];
        up[0] = lm[TIPS[0]].x < lm[KNUCKLES[0]].x;
        for i in 1..5 {
            up[i] = lm[TIPS[i]].y < lm[KNUCKLES[i]].y;
        }
        Self(up)
    }

    pub fn thumb(&self) -> bool {
        self.0[0]
    }

    /// Index up, middle/ring/pinky down. The thumb is ignored.
    pub fn is_pointing(&self) -> bool {
        self.0[1] && !self.0[2..].iter().any(|&up| up)
    }
}
