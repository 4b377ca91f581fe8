// Color/eraser palette: loading icons from disk and the strip across the top of the frame.

use std::fs;
use std::path::Path;

use image::RgbImage;
use image::imageops::{self, FilterType};

use crate::error::Error;
use crate::types::{Color, FrameBuffer};

/// Color a palette icon selects, derived from its file name.
///
/// Case-insensitive substring match, checked in order: `red`, `green`,
/// `blue`, `eraser`. Anything else falls back to black, which (like the
/// eraser) erases.
pub fn color_for_name(name: &str) -> Color {
    let name = name.to_lowercase();
    if name.contains("red") {
        Color::RED
    } else if name.contains("green") {
        Color::GREEN
    } else if name.contains("blue") {
        Color::BLUE
    } else if name.contains("eraser") {
        Color::ERASER
    } else {
        Color::BLACK
    }
}

#[derive(Clone, Debug)]
pub struct PaletteEntry {
    pub name: String,
    pub icon: RgbImage,
    pub color: Color,
}

/// Ordered palette entries plus the icon strip rendered for one frame width.
pub struct Palette {
    entries: Vec<PaletteEntry>,
    height: usize,
    section_width: usize,
    strip: FrameBuffer,
}

impl Palette {
    /// Load every decodable image in `dir`, in file name order.
    ///
    /// Unreadable files are skipped. An empty result (or a missing directory) is an error.
    pub fn load(dir: &Path) -> Result<Vec<PaletteEntry>, Error> {
        let read = match fs::read_dir(dir) {
            Ok(read) => read,
            Err(e) => {
                log::error!("Cannot read palette directory {dir:?}: {e}");
                return Err(Error::EmptyPalette(dir.to_path_buf()));
            }
        };

        let mut files: Vec<_> = read
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .collect();
        files.sort_by_key(|entry| entry.file_name());

        let mut entries = Vec::with_capacity(files.len());
        for entry in files {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            match image::open(&path) {
                Ok(img) => {
                    let color = color_for_name(&name);
                    log::debug!("Palette icon {name} -> {color:?}");
                    entries.push(PaletteEntry { name, icon: img.to_rgb8(), color });
                }
                Err(e) => log::debug!("Skipping palette file {path:?}: {e}"),
            }
        }

        if entries.is_empty() {
            return Err(Error::EmptyPalette(dir.to_path_buf()));
        }
        Ok(entries)
    }

    /// Lay the entries out across `frame_width`, `height` pixels tall.
    ///
    /// Each entry gets `frame_width / n` columns; icons are resized once here.
    pub fn new(entries: Vec<PaletteEntry>, frame_width: usize, height: usize) -> Result<Self, Error> {
        if entries.is_empty() {
            return Err(Error::EmptyPalette(Default::default()));
        }
        let section_width = frame_width / entries.len();
        let mut strip = FrameBuffer::new(frame_width, height);

        if section_width > 0 && height > 0 {
            for (i, entry) in entries.iter().enumerate() {
                let icon = imageops::resize(&entry.icon, section_width as u32, height as u32, FilterType::Triangle);
                let x0 = i * section_width;
                for (x, y, px) in icon.enumerate_pixels() {
                    let c = Color::rgb(px[0], px[1], px[2]);
                    strip.pixels[y as usize * frame_width + x0 + x as usize] = c.to_u32();
                }
            }
        }

        Ok(Self { entries, height, section_width, strip })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn section_width(&self) -> usize {
        self.section_width
    }

    /// Section under pixel column `x`, if any.
    pub fn section_at(&self, x: i32) -> Option<usize> {
        if x < 0 || self.section_width == 0 {
            return None;
        }
        let index = x as usize / self.section_width;
        (index < self.entries.len()).then_some(index)
    }

    pub fn color(&self, index: usize) -> Option<Color> {
        self.entries.get(index).map(|e| e.color)
    }

    /// Horizontal pixel span `[x0, x1)` of a section.
    pub fn section_span(&self, index: usize) -> (usize, usize) {
        (index * self.section_width, (index + 1) * self.section_width)
    }

    /// Copy the strip over the top rows of `frame`.
    pub fn render(&self, frame: &mut FrameBuffer) {
        let rows = self.height.min(frame.height);
        let cols = self.strip.width.min(frame.width);
        for y in 0..rows {
            let src = &self.strip.pixels[y * self.strip.width..y * self.strip.width + cols];
            frame.pixels[y * frame.width..y * frame.width + cols].copy_from_slice(src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(w: u32, h: u32, c: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(c))
    }

    #[test]
    fn names_map_to_colors() {
        assert_eq!(color_for_name("red.png"), Color::RED);
        assert_eq!(color_for_name("01_GREEN.jpg"), Color::GREEN);
        assert_eq!(color_for_name("Blue-Brush.png"), Color::BLUE);
        assert_eq!(color_for_name("ERASER.png"), Color::ERASER);
        assert_eq!(color_for_name("purple.png"), Color::BLACK);
        // first match wins
        assert_eq!(color_for_name("red_eraser.png"), Color::RED);
    }

    #[test]
    fn load_sorts_and_skips_junk() {
        let dir = tempfile::tempdir().unwrap();
        solid(4, 4, [255, 0, 0]).save(dir.path().join("red.png")).unwrap();
        solid(4, 4, [0, 0, 255]).save(dir.path().join("blue.png")).unwrap();
        fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let entries = Palette::load(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["blue.png", "red.png"]);
        assert_eq!(entries[0].color, Color::BLUE);
        assert_eq!(entries[1].color, Color::RED);
    }

    #[test]
    fn empty_or_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(Palette::load(dir.path()), Err(Error::EmptyPalette(_))));
        let missing = dir.path().join("nope");
        assert!(matches!(Palette::load(&missing), Err(Error::EmptyPalette(_))));
    }

    #[test]
    fn sections_split_the_width() {
        let entries = ["a", "b", "c"]
            .iter()
            .map(|n| PaletteEntry { name: n.to_string(), icon: solid(2, 2, [9, 9, 9]), color: Color::BLACK })
            .collect();
        let palette = Palette::new(entries, 640, 100).unwrap();
        assert_eq!(palette.section_width(), 213);
        assert_eq!(palette.section_at(0), Some(0));
        assert_eq!(palette.section_at(212), Some(0));
        assert_eq!(palette.section_at(213), Some(1));
        assert_eq!(palette.section_at(638), Some(2));
        // 3 * 213 = 639: the last column belongs to no section
        assert_eq!(palette.section_at(639), None);
        assert_eq!(palette.section_at(-1), None);
    }

    #[test]
    fn render_paints_icons_into_the_top_rows() {
        let entries = vec![
            PaletteEntry { name: "red.png".into(), icon: solid(8, 8, [255, 0, 0]), color: Color::RED },
            PaletteEntry { name: "green.png".into(), icon: solid(8, 8, [0, 255, 0]), color: Color::GREEN },
        ];
        let palette = Palette::new(entries, 20, 5).unwrap();
        let mut frame = FrameBuffer { width: 20, height: 10, pixels: vec![0x0011_1111; 200] };
        palette.render(&mut frame);
        assert_eq!(frame.get(0, 0), Some(Color::RED.to_u32()));
        assert_eq!(frame.get(9, 4), Some(Color::RED.to_u32()));
        assert_eq!(frame.get(10, 4), Some(Color::GREEN.to_u32()));
        assert_eq!(frame.get(10, 5), Some(0x0011_1111));
    }
}
