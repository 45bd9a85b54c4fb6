// What you SEE:
// • The background picture fills the window (black until it has loaded).
// • A glass lens follows the mouse: it bends, frosts and tints what is under it,
//   with a soft drop shadow behind it.
// • 1-5 shape | Up/Down distortion | [ ] blur | A/Z aberration | +/- size | M mode
// • S saves a design, L cycles saved designs, D deletes the current one, E exports GLSL.
// • ESC quits.

use clap::Parser;
use glass_lens::config::AppConfig;
use glass_lens::draw::{draw_icon, draw_text_5x7, rgb_u32, text_width_5x7, Drawer};
use glass_lens::editor::{apply_key, describe, Command};
use glass_lens::export::export_design;
use glass_lens::library::DesignLibrary;
use glass_lens::{BackgroundTexture, FrameLoop, GlassError, LoopControl, ParamsHandle, RenderSession};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "glass-lens", about = "Liquid glass lens over a background image")]
struct Args {
    /// TOML config file
    #[arg(long, default_value = "glass-lens.toml")]
    config: PathBuf,

    /// Background picture: path, file:// URL or data: URI
    #[arg(long)]
    background: Option<String>,

    /// Design library JSON file
    #[arg(long)]
    library: Option<PathBuf>,

    /// Target frames per second
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> Result<(), GlassError> {
    let args = Args::parse();

    /* --- Config (file, then command line on top) --- */
    let mut cfg = AppConfig::load(&args.config)?;
    if let Some(bg) = args.background {
        cfg.background = Some(bg);
    }
    if let Some(lib) = args.library {
        cfg.library = lib;
    }
    if let Some(fps) = args.fps {
        cfg.fps = fps;
    }
    let cfg = cfg.validated()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::info!(config = %args.config.display(), "starting glass-lens");

    /* --- Design library ---
       A broken library file doesn't stop the app; you just start with none. */
    let mut library = DesignLibrary::open(&cfg.library).unwrap_or_else(|e| {
        tracing::warn!("design library unavailable, starting empty: {e}");
        DesignLibrary::in_memory()
    });

    /* --- Shared state: parameters (editor -> renderer) and background ---
       Visual: black window until the background finishes decoding. */
    let params = ParamsHandle::new(cfg.params.clone());
    let texture = BackgroundTexture::new();
    let mut background_url = cfg.background.clone().unwrap_or_default();
    if !background_url.is_empty() {
        texture.load(&background_url);
    }

    /* --- Window + render session --- */
    let mut drawer = Drawer::new(&cfg.title, cfg.width, cfg.height, cfg.fps)?;
    let mut session = RenderSession::new(params.clone(), texture.clone());
    let (w, h) = drawer.size();
    session.attach_surface(w, h)?;
    session.start()?;

    /* --- HUD / FPS --- */
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;
    let mut hud_fps_text = String::from("FPS: 0.0");
    let mut status = String::from("ready");
    let mut last_mouse: Option<(f32, f32)> = None;
    let mut current_design: Option<usize> = None;

    /* ------------------------------ Main loop ------------------------------ */
    let frame_loop = FrameLoop::new(cfg.fps);
    // the session is torn down even when a frame fails (e.g. the window went away)
    session.run(&frame_loop, |session, _tick| {
        if !drawer.is_open() || drawer.esc_pressed() {
            return Ok(LoopControl::Stop);
        }

        /* 1) Pointer: the glass follows the mouse (only when it moved, so a
           loaded design keeps its own position until you touch the mouse). */
        let mouse = drawer.mouse_pos();
        if let Some((mx, my)) = mouse {
            if last_mouse != mouse {
                params.update(|p| {
                    p.center_x = mx;
                    p.center_y = my;
                });
            }
        }
        last_mouse = mouse;

        /* 2) Keyboard editor: edits are published as whole new snapshots. */
        for key in drawer.editor_keys() {
            let mut edited = (*params.snapshot()).clone();
            match apply_key(key, &mut edited) {
                None => params.publish(edited),
                Some(Command::Save) => {
                    let name = format!("Design {}", library.len() + 1);
                    status = match library.create(&name, &edited, &background_url) {
                        Ok(d) => format!("saved {}", d.name),
                        Err(e) => e.to_string(),
                    };
                    if !library.is_empty() {
                        current_design = Some(library.len() - 1);
                    }
                }
                Some(Command::NextDesign) => {
                    if library.is_empty() {
                        status = "no saved designs".into();
                        continue;
                    }
                    let idx = current_design.map_or(0, |i| (i + 1) % library.len());
                    let design = &library.list()[idx];
                    params.publish(design.params.clone());
                    if design.background_url != background_url {
                        background_url = design.background_url.clone();
                        if background_url.is_empty() {
                            texture.unload();
                        } else {
                            texture.load(&background_url);
                        }
                    }
                    status = format!("loaded {}", design.name);
                    current_design = Some(idx);
                }
                Some(Command::DeleteDesign) => {
                    let Some(id) = current_design.and_then(|i| library.list().get(i)).map(|d| d.id) else {
                        status = "no design selected".into();
                        continue;
                    };
                    status = match library.delete(id) {
                        Ok(d) => format!("deleted {}", d.name),
                        Err(e) => e.to_string(),
                    };
                    current_design = None;
                }
                Some(Command::Export) => {
                    let Some(design) = current_design.and_then(|i| library.list().get(i)) else {
                        status = "save or load a design first".into();
                        continue;
                    };
                    let path = cfg.export_dir.join(format!("{}.glsl", design.name.replace(' ', "_")));
                    let written = std::fs::create_dir_all(&cfg.export_dir)
                        .and_then(|_| std::fs::write(&path, export_design(design)));
                    status = match written {
                        Ok(()) => {
                            tracing::info!(path = %path.display(), "shader exported");
                            format!("exported {}", path.display())
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), "export failed: {e}");
                            format!("export failed: {e}")
                        }
                    };
                }
            }
        }

        /* 3) Render the glass at the current window size. */
        let (w, h) = drawer.size();
        let current = params.snapshot();
        let Some(screen) = session.tick(w, h) else {
            return Ok(LoopControl::Stop);
        };

        /* 4) HUD on top: icon + caption on the glass, status line at the top-left. */
        let (cx, cy) = (current.center_x as i32, current.center_y as i32);
        if current.icon_size > 0.0 {
            draw_icon(screen, cx, cy - current.icon_size as i32, current.icon_size, rgb_u32(current.icon_color));
        }
        if !current.overlay_text.is_empty() {
            let tx = cx - text_width_5x7(&current.overlay_text) / 2;
            draw_text_5x7(screen, tx, cy + 4, &current.overlay_text, 0x00_FF_FF_FF);
        }
        let hud = format!("{} | {} | {}", describe(&current), status, hud_fps_text);
        draw_text_5x7(screen, 8, 8, &hud, 0x00_FF_FF_FF);

        /* 5) Present to the window. */
        drawer.present(screen)?;

        /* 6) FPS counter */
        frames_this_second += 1;
        let now = Instant::now();
        if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_fps_time).as_secs_f32();
            let fps = frames_this_second as f32 / secs;
            tracing::debug!(fps, "frame rate");
            hud_fps_text = format!("FPS: {:.1}", fps);
            frames_this_second = 0;
            last_fps_time = now;
        }

        Ok(LoopControl::Continue)
    })?;

    Ok(())
}
