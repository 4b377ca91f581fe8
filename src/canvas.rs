// Persistent drawing canvas + the mask/merge compositor.
// The canvas starts black and only ever receives strokes; black means "nothing drawn here".
use crate::draw::draw_thick_line;
use crate::error::Error;
use crate::types::{Color, FrameBuffer, Point};

/// Luminance cutoff: canvas pixels brighter than this count as drawn.
pub const DEFAULT_MASK_THRESHOLD: u8 = 50;

pub struct Canvas {
    buffer: FrameBuffer,
}

impl Canvas {
    /// All-black canvas the size of the camera frame.
    pub fn new(width: usize, height: usize) -> Self {
        Self { buffer: FrameBuffer::new(width, height) }
    }

    /// Paint one stroke segment. Eraser strokes paint black, which the compositor shows as live video.
    pub fn stroke(&mut self, from: Point, to: Point, color: Color, thickness: u32) {
        draw_thick_line(&mut self.buffer, from, to, color, thickness);
    }

    pub fn buffer(&self) -> &FrameBuffer {
        &self.buffer
    }

    pub fn width(&self) -> usize {
        self.buffer.width
    }

    pub fn height(&self) -> usize {
        self.buffer.height
    }

    /// Overlay the canvas on `frame` in place. See [`composite`].
    pub fn composite_onto(&self, frame: &mut FrameBuffer, threshold: u8) -> Result<(), Error> {
        composite(frame, &self.buffer, threshold)
    }
}

/// BT.601 luma with the usual 14-bit integer weights (0.299, 0.587, 0.114).
#[inline]
pub fn luminance(px: u32) -> u8 {
    let r = (px >> 16) & 0xFF;
    let g = (px >> 8) & 0xFF;
    let b = px & 0xFF;
    ((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8
}

/// Inverse binary mask of the canvas: 0x00FFFFFF where nothing is drawn, 0 where a stroke is.
#[inline]
pub fn inverse_mask(canvas_px: u32, threshold: u8) -> u32 {
    if luminance(canvas_px) > threshold { 0 } else { 0x00FF_FFFF }
}

/// `frame = (frame AND mask(canvas)) OR canvas`, per channel.
///
/// Drawn regions are cut out of the live frame first and then filled from the
/// canvas, so bright strokes cover the video completely.
pub fn composite(frame: &mut FrameBuffer, canvas: &FrameBuffer, threshold: u8) -> Result<(), Error> {
    if !frame.same_size(canvas) {
        return Err(Error::SizeMismatch(format!(
            "composite: frame {}x{} vs canvas {}x{}",
            frame.width, frame.height, canvas.width, canvas.height
        )));
    }
    for (live, &ink) in frame.pixels.iter_mut().zip(canvas.pixels.iter()) {
        *live = (*live & inverse_mask(ink, threshold)) | ink;
    }
    Ok(())
}
