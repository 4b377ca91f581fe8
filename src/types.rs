// Core types shared by the capture, drawing and compositing stages.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,     // how wide the frame is on screen (pixels)
    pub height: usize,    // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>, // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// All-black buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Pixel at (x,y), or None when outside the buffer.
    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width + x as usize])
    }

    pub fn same_size(&self, other: &FrameBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Pack tightly packed RGB rows into 0x00RRGGBB, flipping each row left/right.
    /// Missing trailing bytes leave black pixels.
    pub fn from_rgb_mirrored(width: usize, height: usize, rgb: &[u8]) -> Self {
        let mut fb = Self::new(width, height);
        for (y, row) in rgb.chunks_exact(width.max(1) * 3).take(height).enumerate() {
            for (x, px) in row.chunks_exact(3).enumerate() {
                let dst = y * width + (width - 1 - x);
                fb.pixels[dst] = Color::rgb(px[0], px[1], px[2]).to_u32();
            }
        }
        fb
    }
}

/// An RGB drawing color. Pure black doubles as the eraser sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    /// Painting black onto the canvas removes strokes from the composite.
    pub const ERASER: Color = Color::BLACK;

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[inline]
    pub fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    #[inline]
    pub fn from_u32(px: u32) -> Self {
        Self::rgb(((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
    }

    pub fn is_eraser(self) -> bool {
        self == Color::ERASER
    }
}

/// Integer pixel position in frame coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packing() {
        assert_eq!(Color::RED.to_u32(), 0x00FF_0000);
        assert_eq!(Color::from_u32(0x0012_3456), Color::rgb(0x12, 0x34, 0x56));
        assert!(Color::BLACK.is_eraser());
        assert!(!Color::BLUE.is_eraser());
    }

    #[test]
    fn rgb_rows_are_packed_mirrored() {
        let fb = FrameBuffer::from_rgb_mirrored(2, 1, &[255, 0, 0, 0, 0, 255]);
        assert_eq!(fb.pixels, vec![0x0000_00FF, 0x00FF_0000]);
        assert_eq!(fb.get(1, 0), Some(0x00FF_0000));
        assert_eq!(fb.get(2, 0), None);
        assert_eq!(fb.get(-1, 0), None);
    }
}
