// Launcher page: instructions plus a button that starts the doodle program.
//
// The doodle runs as its own process. The launcher fires it off and forgets
// it: no arguments, no pipes, no waiting.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};

/// Name of the doodle executable next to the launcher.
pub const DOODLE_BIN: &str = "gesture-doodle";

#[derive(Debug, Clone)]
pub struct LauncherConfig {
    pub addr: SocketAddr,
    /// Page background image; optional.
    pub background: PathBuf,
    /// Program spawned by the start button.
    pub doodle: PathBuf,
}

/// Banner shown above the start button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Info(String),
    Warning(String),
    Error(String),
}

impl Banner {
    fn to_html(&self) -> String {
        let (class, text) = match self {
            Banner::Info(t) => ("info", t),
            Banner::Warning(t) => ("warning", t),
            Banner::Error(t) => ("error", t),
        };
        format!(r#"<div class="banner {class}">{}</div>"#, escape(text))
    }
}

struct LauncherState {
    config: LauncherConfig,
}

/// `doodle` binary in the same directory as the running executable.
pub fn default_doodle_path() -> PathBuf {
    let name = format!("{DOODLE_BIN}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Start `program` detached from us. Returns its pid.
///
/// A background thread waits on the child so it is reaped once it exits.
pub fn spawn_doodle(program: &Path) -> std::io::Result<u32> {
    let mut child = Command::new(program)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let pid = child.id();
    std::thread::spawn(move || match child.wait() {
        Ok(status) => log::info!("Doodle (pid {pid}) exited: {status}"),
        Err(e) => log::warn!("Waiting on doodle (pid {pid}) failed: {e}"),
    });
    Ok(pid)
}

/// Minimal HTML escaping for text we interpolate into the page.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Gesture Doodle</title>
<style>
body { font-family: sans-serif; max-width: 720px; margin: 0 auto; padding: 2em; color: white;
       background: #222 {background} center / cover no-repeat; }
h1, h4 { text-align: center; }
h4 { color: #ddd; }
.instructions { font-size: 18px; }
.banner { padding: 0.6em 1em; border-radius: 6px; margin: 1em 0; }
.info { background: #1c4f80; } .warning { background: #80651c; } .error { background: #801c1c; }
button { font-size: 18px; padding: 0.5em 1.5em; cursor: pointer; }
footer { text-align: center; color: #ccc; margin-top: 3em; }
</style>
</head>
<body>
<h1>&#9995; Gesture Doodle</h1>
<h4>Draw in Air using Hand Gestures</h4>
<hr>
{banners}
<div class="instructions">
<b>Instructions</b><br><br>
&#9757; Index finger &rarr; Draw<br>
&#127912; Touch color image &rarr; Change color<br>
&#129533; Touch eraser &rarr; Erase<br>
&#10060; Press Q &rarr; Close camera<br>
</div>
<br>
<form method="post" action="/start"><button type="submit">&#9654; Start Gesture Doodle</button></form>
<footer>Built with Rust &bull; minifb &bull; nokhwa &bull; ONNX Runtime</footer>
</body>
</html>
"#;

/// Render the launcher page. A missing background adds a warning banner.
pub fn render_page(background_present: bool, background: &Path, banner: Option<&Banner>) -> String {
    let mut banners = Vec::new();
    if !background_present {
        banners.push(Banner::Warning(format!("Background image not found at '{}'", background.display())));
    }
    banners.extend(banner.cloned());

    let background_css = if background_present { r#"url("/background")"# } else { "" };
    PAGE.replace("{background}", background_css).replace(
        "{banners}",
        &banners.iter().map(Banner::to_html).collect::<Vec<_>>().join("\n"),
    )
}

fn page_for(state: &LauncherState, banner: Option<Banner>) -> Html<String> {
    let bg = &state.config.background;
    Html(render_page(bg.is_file(), bg, banner.as_ref()))
}

async fn index(State(state): State<Arc<LauncherState>>) -> Html<String> {
    page_for(&state, None)
}

async fn start(State(state): State<Arc<LauncherState>>) -> Html<String> {
    let program = &state.config.doodle;
    let banner = match spawn_doodle(program) {
        Ok(pid) => {
            log::info!("Started {program:?} (pid {pid})");
            Banner::Info("Camera opening in separate window...".to_string())
        }
        Err(e) => {
            log::error!("Failed to start {program:?}: {e}");
            Banner::Error(format!("Could not start {}: {e}", program.display()))
        }
    };
    page_for(&state, Some(banner))
}

async fn background(State(state): State<Arc<LauncherState>>) -> Response {
    let path = &state.config.background;
    match tokio::fs::read(path).await {
        Ok(bytes) => {
            let mime = match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
                Some("png") => "image/png",
                Some("gif") => "image/gif",
                Some("webp") => "image/webp",
                _ => "image/jpeg",
            };
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn create_router(config: LauncherConfig) -> Router {
    let state = Arc::new(LauncherState { config });
    Router::new()
        .route("/", get(index))
        .route("/start", post(start))
        .route("/background", get(background))
        .with_state(state)
}

/// Serve the launcher until the process is killed.
pub async fn run(config: LauncherConfig) -> std::io::Result<()> {
    if !config.background.is_file() {
        log::warn!("Background image not found at {:?}", config.background);
    }
    let addr = config.addr;
    let app = create_router(config);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Launcher listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}
