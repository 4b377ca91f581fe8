// What you SEE:
// • Your mirrored camera feed with a palette strip across the top.
// • Point with your index finger (other fingers folded): you draw.
// • Touch a palette icon with the fingertip: switch color, or pick the eraser.
// • Any other hand pose lifts the pen. Q (or Esc) quits.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;

use gesture_doodle::camera::CameraCapture;
use gesture_doodle::config::DoodleConfig;
use gesture_doodle::detector::HandDetector;
use gesture_doodle::draw::Drawer;
use gesture_doodle::palette::Palette;
use gesture_doodle::session::Doodle;

#[derive(Parser, Debug)]
#[command(version, about = "Draw in the air with your index finger")]
struct Args {
    /// JSON config file. Command line flags override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Camera device index.
    #[arg(long)]
    camera: Option<u32>,
    /// Directory of palette icons (red/green/blue/eraser in the file name).
    #[arg(long)]
    palette_dir: Option<PathBuf>,
    /// Hand landmark ONNX model.
    #[arg(long)]
    model: Option<PathBuf>,
    /// Keep the current stroke when the hand briefly drops out of view.
    #[arg(long)]
    keep_stroke_on_lost_hand: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<DoodleConfig> {
        let mut config = match &self.config {
            Some(path) => DoodleConfig::load(path).with_context(|| format!("loading {path:?}"))?,
            None => DoodleConfig::default(),
        };
        if let Some(camera) = self.camera {
            config.camera_index = camera;
        }
        if let Some(dir) = self.palette_dir {
            config.palette_dir = dir;
        }
        if let Some(model) = self.model {
            config.detector.model_path = model;
        }
        if self.keep_stroke_on_lost_hand {
            config.reset_on_lost_hand = false;
        }
        Ok(config)
    }
}

#[cfg(feature = "onnx")]
fn open_detector(config: &DoodleConfig) -> anyhow::Result<Box<dyn HandDetector>> {
    let detector = gesture_doodle::onnx::OnnxHandDetector::new(config.detector.clone())?;
    Ok(Box::new(detector))
}

#[cfg(not(feature = "onnx"))]
fn open_detector(_config: &DoodleConfig) -> anyhow::Result<Box<dyn HandDetector>> {
    anyhow::bail!("built without the `onnx` feature: no hand detector available")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Args::parse().into_config()?;

    /* --- Palette ---
       Mandatory UI: bail out before touching the camera if there is none. */
    let entries = Palette::load(&config.palette_dir).inspect_err(|e| log::error!("{e}"))?;
    log::info!("Loaded {} palette icons from {:?}", entries.len(), config.palette_dir);

    let mut detector = open_detector(&config)?;
    log::info!("Hand detector: {}", detector.name());

    /* --- Camera + window setup ---
       Every buffer follows the resolution the camera actually delivers. */
    let mut cam = CameraCapture::new(config.camera_index, config.frame_width, config.frame_height)?;
    let (w, h) = cam.resolution();
    let (w, h) = (w as usize, h as usize);

    let palette = Palette::new(entries, w, config.palette_height)?;
    let mut doodle = Doodle::new(palette, w, h, &config);
    let mut drawer = Drawer::new(&config.window_title, w, h)?;

    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.quit_pressed() {
        // 1) Blocking grab; a dead device ends the session.
        let mut frame = match cam.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::warn!("{e}; stopping");
                break;
            }
        };

        // 2) Landmarks. A failed inference is just a frame without a hand.
        let hands = detector.detect(&frame).unwrap_or_else(|e| {
            log::warn!("{e}");
            Vec::new()
        });

        // 3) Palette, gesture, canvas merge.
        let gesture = doodle.process_frame(&mut frame, &hands)?;
        log::trace!("{gesture:?}");

        // 4) Present (also pumps window events for the quit key).
        drawer.present(&frame)?;

        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            log::debug!("FPS: {:.1}", frames_this_second as f32 / secs);
            frames_this_second = 0;
            last_fps_time = now;
        }
    }

    log::info!("Session ended");
    Ok(())
}
