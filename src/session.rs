// Per-frame gesture routing: palette selection, drawing, releasing.
//
// `Doodle` owns all state that survives between frames (canvas, selected
// color, stroke continuity) so the whole pipeline can run without a camera.

use crate::canvas::Canvas;
use crate::config::DoodleConfig;
use crate::draw::{draw_hand, draw_rect_outline};
use crate::error::Error;
use crate::hand::Hand;
use crate::palette::Palette;
use crate::smoothing::SmoothingBuffer;
use crate::types::{Color, FrameBuffer, Point};

/// Color drawn with until the palette is touched.
pub const INITIAL_COLOR: Color = Color::RED;

const HIGHLIGHT_COLOR: Color = Color::YELLOW;
const HIGHLIGHT_THICKNESS: i32 = 3;

/// What the router did with a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    /// No hand in view.
    NoHand,
    /// Fingertip inside the palette strip; `section` is the entry under it, if any.
    Palette { section: Option<usize> },
    /// Index finger pointing: a segment was drawn onto the canvas.
    Draw { from: Point, to: Point },
    /// Any other pose; the stroke was released.
    Release,
}

pub struct Doodle {
    palette: Palette,
    canvas: Canvas,
    selected: Color,
    /// Last smoothed point of the current stroke.
    prev: Option<Point>,
    points: SmoothingBuffer,
    draw_thickness: u32,
    eraser_thickness: u32,
    mask_threshold: u8,
    reset_on_lost_hand: bool,
    show_landmarks: bool,
}

impl Doodle {
    /// New session for `width` x `height` frames. The palette must already be laid out for `width`.
    pub fn new(palette: Palette, width: usize, height: usize, config: &DoodleConfig) -> Self {
        Self {
            palette,
            canvas: Canvas::new(width, height),
            selected: INITIAL_COLOR,
            prev: None,
            points: SmoothingBuffer::new(config.smoothing),
            draw_thickness: config.draw_thickness,
            eraser_thickness: config.eraser_thickness,
            mask_threshold: config.mask_threshold,
            reset_on_lost_hand: config.reset_on_lost_hand,
            show_landmarks: config.show_landmarks,
        }
    }

    /// Run one frame through the pipeline, leaving the composite in `frame`.
    ///
    /// Only the first hand is used.
    pub fn process_frame(&mut self, frame: &mut FrameBuffer, hands: &[Hand]) -> Result<Gesture, Error> {
        if frame.width != self.canvas.width() || frame.height != self.canvas.height() {
            return Err(Error::SizeMismatch(format!(
                "frame {}x{} vs canvas {}x{}",
                frame.width,
                frame.height,
                self.canvas.width(),
                self.canvas.height()
            )));
        }

        self.palette.render(frame);

        let gesture = match hands.first() {
            Some(hand) => {
                if self.show_landmarks {
                    draw_hand(frame, hand);
                }
                self.route(frame, hand)
            }
            None => {
                if self.reset_on_lost_hand {
                    self.release();
                }
                Gesture::NoHand
            }
        };

        self.canvas.composite_onto(frame, self.mask_threshold)?;
        Ok(gesture)
    }

    fn route(&mut self, frame: &mut FrameBuffer, hand: &Hand) -> Gesture {
        let tip = hand.index_tip().to_pixel(frame.width, frame.height);

        if tip.y < self.palette.height() as i32 {
            let section = self.palette.section_at(tip.x);
            if let Some(i) = section {
                self.select(i);
                let (x0, x1) = self.palette.section_span(i);
                draw_rect_outline(
                    frame,
                    Point::new(x0 as i32, 0),
                    Point::new(x1 as i32, self.palette.height() as i32),
                    HIGHLIGHT_COLOR,
                    HIGHLIGHT_THICKNESS,
                );
            }
            // Re-entering the canvas must start a fresh stroke.
            self.release();
            return Gesture::Palette { section };
        }

        if hand.finger_state().is_pointing() {
            let to = self.points.push(tip);
            let from = self.prev.unwrap_or(to);
            self.canvas.stroke(from, to, self.selected, self.thickness());
            self.prev = Some(to);
            return Gesture::Draw { from, to };
        }

        self.release();
        Gesture::Release
    }

    fn select(&mut self, index: usize) {
        if let Some(color) = self.palette.color(index) {
            if color != self.selected {
                log::debug!("Selected palette entry {index} ({color:?})");
            }
            self.selected = color;
        }
    }

    /// Forget the current stroke: the next draw frame starts a new line.
    fn release(&mut self) {
        self.prev = None;
        self.points.clear();
    }

    /// Brush thickness for the selected color; the eraser gets the big brush.
    pub fn thickness(&self) -> u32 {
        if self.selected.is_eraser() { self.eraser_thickness } else { self.draw_thickness }
    }

    pub fn selected_color(&self) -> Color {
        self.selected
    }

    pub fn previous_point(&self) -> Option<Point> {
        self.prev
    }

    pub fn smoothing_len(&self) -> usize {
        self.points.len()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::fixtures::{pointing_at, with_index_tip_at};
    use crate::palette::PaletteEntry;
    use image::{Rgb, RgbImage};

    const W: usize = 640;
    const H: usize = 480;
    const LIVE: u32 = 0x0040_4040;

    fn entry(name: &str, color: Color) -> PaletteEntry {
        PaletteEntry { name: name.into(), icon: RgbImage::from_pixel(4, 4, Rgb([color.r, color.g, color.b])), color }
    }

    fn doodle(config: DoodleConfig) -> Doodle {
        let entries = vec![
            entry("blue.png", Color::BLUE),
            entry("eraser.png", Color::ERASER),
            entry("green.png", Color::GREEN),
            entry("red.png", Color::RED),
        ];
        let palette = Palette::new(entries, W, config.palette_height).unwrap();
        Doodle::new(palette, W, H, &config)
    }

    fn live() -> FrameBuffer {
        FrameBuffer { width: W, height: H, pixels: vec![LIVE; W * H] }
    }

    fn step(d: &mut Doodle, hands: &[Hand]) -> Gesture {
        d.process_frame(&mut live(), hands).unwrap()
    }

    #[test]
    fn continuous_stroke_has_no_gaps() {
        let mut d = doodle(DoodleConfig::default());
        // y = 100 is the first row below the palette strip
        for x in (100..=200).step_by(10) {
            step(&mut d, &[pointing_at(x, 100, W, H)]);
        }
        // Let the moving average catch up with the last position.
        for _ in 0..5 {
            step(&mut d, &[pointing_at(200, 100, W, H)]);
        }
        let red = Color::RED.to_u32();
        for x in 100..=200 {
            assert_eq!(d.canvas().buffer().get(x, 100), Some(red), "gap at x={x}");
        }
    }

    #[test]
    fn first_draw_frame_does_not_jump_from_origin() {
        let mut d = doodle(DoodleConfig::default());
        let g = step(&mut d, &[pointing_at(300, 300, W, H)]);
        assert_eq!(g, Gesture::Draw { from: Point::new(300, 300), to: Point::new(300, 300) });
        assert_eq!(d.canvas().buffer().get(5, 5), Some(0));
    }

    #[test]
    fn touching_the_palette_selects_and_resets() {
        let mut d = doodle(DoodleConfig::default());
        step(&mut d, &[pointing_at(300, 300, W, H)]);
        assert!(d.previous_point().is_some());

        // section width = 640 / 4 = 160; x = 330 is section 2
        let g = step(&mut d, &[pointing_at(330, 40, W, H)]);
        assert_eq!(g, Gesture::Palette { section: Some(2) });
        assert_eq!(d.selected_color(), Color::GREEN);
        assert_eq!(d.previous_point(), None);
        assert_eq!(d.smoothing_len(), 0);

        // The next stroke starts where the finger is, not where it left off.
        let g = step(&mut d, &[pointing_at(400, 400, W, H)]);
        assert_eq!(g, Gesture::Draw { from: Point::new(400, 400), to: Point::new(400, 400) });
    }

    #[test]
    fn palette_touch_highlights_the_section() {
        let mut d = doodle(DoodleConfig::default());
        let mut frame = live();
        d.process_frame(&mut frame, &[pointing_at(10, 99, W, H)]).unwrap();
        assert_eq!(frame.get(0, 50), Some(Color::YELLOW.to_u32()));
        assert_eq!(frame.get(160, 50), Some(Color::YELLOW.to_u32()));
        assert_eq!(d.selected_color(), Color::BLUE);
    }

    #[test]
    fn other_pose_releases_the_stroke() {
        let mut d = doodle(DoodleConfig::default());
        step(&mut d, &[pointing_at(300, 300, W, H)]);
        let g = step(&mut d, &[with_index_tip_at(300, 300, W, H, [false, true, true, false, false])]);
        assert_eq!(g, Gesture::Release);
        assert_eq!(d.previous_point(), None);
        assert_eq!(d.smoothing_len(), 0);
    }

    #[test]
    fn lost_hand_resets_by_default() {
        let mut d = doodle(DoodleConfig::default());
        step(&mut d, &[pointing_at(300, 300, W, H)]);
        assert_eq!(step(&mut d, &[]), Gesture::NoHand);
        assert_eq!(d.previous_point(), None);
    }

    #[test]
    fn lost_hand_can_keep_the_stroke() {
        let mut d = doodle(DoodleConfig { reset_on_lost_hand: false, ..DoodleConfig::default() });
        step(&mut d, &[pointing_at(300, 300, W, H)]);
        step(&mut d, &[]);
        assert_eq!(d.previous_point(), Some(Point::new(300, 300)));
        assert_eq!(d.smoothing_len(), 1);
    }

    #[test]
    fn palette_is_drawn_even_without_a_hand() {
        let mut d = doodle(DoodleConfig::default());
        let mut frame = live();
        d.process_frame(&mut frame, &[]).unwrap();
        assert_eq!(frame.get(10, 10), Some(Color::BLUE.to_u32()));
        assert_eq!(frame.get(10, 100), Some(LIVE));
    }

    #[test]
    fn only_the_first_hand_counts() {
        let mut d = doodle(DoodleConfig::default());
        let g = step(&mut d, &[pointing_at(330, 20, W, H), pointing_at(300, 300, W, H)]);
        assert_eq!(g, Gesture::Palette { section: Some(2) });
        assert_eq!(d.selected_color(), Color::GREEN);
    }

    #[test]
    fn eraser_uses_the_big_brush() {
        let mut d = doodle(DoodleConfig::default());
        assert_eq!(d.thickness(), 5);
        step(&mut d, &[pointing_at(170, 10, W, H)]);
        assert!(d.selected_color().is_eraser());
        assert_eq!(d.thickness(), 50);
    }

    #[test]
    fn hand_far_outside_the_frame_draws_nothing() {
        let mut d = doodle(DoodleConfig::default());
        let mut hand = pointing_at(300, 300, W, H);
        for lm in hand.landmarks.iter_mut() {
            lm.x -= 1e10;
        }
        let mut frame = live();
        let g = d.process_frame(&mut frame, &[hand]).unwrap();
        assert_eq!(g, Gesture::Draw { from: Point::new(-640, 300), to: Point::new(-640, 300) });
        assert!(d.canvas().buffer().pixels.iter().all(|&p| p == 0));
        assert_eq!(frame.get(320, 300), Some(LIVE));
    }

    #[test]
    fn wrong_frame_size_is_rejected() {
        let mut d = doodle(DoodleConfig::default());
        let mut frame = FrameBuffer::new(320, 240);
        assert!(matches!(d.process_frame(&mut frame, &[]), Err(Error::SizeMismatch(_))));
    }
}
