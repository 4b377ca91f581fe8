// Window + software drawing utilities.
// Provided here:
// 1) A window that shows the composited doodle frame.
// 2) Pixel, line, thick-stroke, disc and rectangle rasterizers on FrameBuffer.
// 3) The hand skeleton overlay (landmark dots + bone lines).

use crate::error::Error;
use crate::hand::{HAND_CONNECTIONS, Hand};
use crate::types::{Color, FrameBuffer, Point};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a window sized to the camera feed.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen. Also pumps window events.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// Q (or Esc) ends the session.
    pub fn quit_pressed(&self) -> bool {
        self.window.is_key_pressed(Key::Q, KeyRepeat::No) || self.window.is_key_down(Key::Escape)
    }
}

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
pub fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
pub fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draw a line of the given thickness with round caps.
///
/// Every pixel whose center lies within `thickness / 2` of the segment is
/// painted, so consecutive segments sharing an endpoint join without gaps.
/// A zero-length segment paints a filled disc.
pub fn draw_thick_line(fb: &mut FrameBuffer, from: Point, to: Point, color: Color, thickness: u32) {
    if thickness <= 1 {
        draw_line(fb, from.x, from.y, to.x, to.y, color.to_u32());
        return;
    }
    let radius = thickness as f32 / 2.0;
    let reach = radius.ceil() as i32;
    let px = color.to_u32();

    let min_x = from.x.min(to.x).saturating_sub(reach).max(0);
    let max_x = from.x.max(to.x).saturating_add(reach).min(fb.width as i32 - 1);
    let min_y = from.y.min(to.y).saturating_sub(reach).max(0);
    let max_y = from.y.max(to.y).saturating_add(reach).min(fb.height as i32 - 1);

    let (ax, ay) = (from.x as f32, from.y as f32);
    let (dx, dy) = (to.x as f32 - ax, to.y as f32 - ay);
    let len2 = dx * dx + dy * dy;
    let r2 = radius * radius;

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (qx, qy) = (x as f32 - ax, y as f32 - ay);
            // Project onto the segment, clamped to its endpoints.
            let t = if len2 > 0.0 { ((qx * dx + qy * dy) / len2).clamp(0.0, 1.0) } else { 0.0 };
            let (ex, ey) = (qx - t * dx, qy - t * dy);
            if ex * ex + ey * ey <= r2 {
                fb.pixels[y as usize * fb.width + x as usize] = px;
            }
        }
    }
}

/// Filled disc centered at `center`.
pub fn fill_disc(fb: &mut FrameBuffer, center: Point, radius: i32, color: Color) {
    let px = color.to_u32();
    let r2 = i64::from(radius) * i64::from(radius);
    let min_x = center.x.saturating_sub(radius).max(0);
    let max_x = center.x.saturating_add(radius).min(fb.width as i32 - 1);
    let min_y = center.y.saturating_sub(radius).max(0);
    let max_y = center.y.saturating_add(radius).min(fb.height as i32 - 1);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (dx, dy) = (i64::from(x) - i64::from(center.x), i64::from(y) - i64::from(center.y));
            if dx * dx + dy * dy <= r2 {
                put_pixel(fb, x, y, px);
            }
        }
    }
}

/// Rectangle outline from `top_left` to `bottom_right` (inclusive), grown inward by `thickness`.
pub fn draw_rect_outline(
    fb: &mut FrameBuffer,
    top_left: Point,
    bottom_right: Point,
    color: Color,
    thickness: i32,
) {
    let px = color.to_u32();
    for t in 0..thickness.max(1) {
        let (x0, y0) = (top_left.x + t, top_left.y + t);
        let (x1, y1) = (bottom_right.x - t, bottom_right.y - t);
        if x0 > x1 || y0 > y1 {
            break;
        }
        draw_line(fb, x0, y0, x1, y0, px);
        draw_line(fb, x0, y1, x1, y1, px);
        draw_line(fb, x0, y0, x0, y1, px);
        draw_line(fb, x1, y0, x1, y1, px);
    }
}

/// Overlay the hand skeleton: white bones, red joints.
pub fn draw_hand(fb: &mut FrameBuffer, hand: &Hand) {
    let (w, h) = (fb.width, fb.height);
    let joints: Vec<Point> = hand.landmarks.iter().map(|lm| lm.to_pixel(w, h)).collect();

    for &(a, b) in HAND_CONNECTIONS.iter() {
        let (pa, pb) = (joints[a], joints[b]);
        draw_thick_line(fb, pa, pb, Color::WHITE, 2);
    }
    for &p in &joints {
        fill_disc(fb, p, 3, Color::RED);
    }
}
