//! Window, event loop and frame pacing around a user [`Game`].

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window, WindowId};

use crate::audio::{AudioContext, SoundConfig};
use crate::camera::Camera;
use crate::config::{KitConfig, WindowMode};
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::input::{InputState, KeyCode, MouseButton};
use crate::renderer::Renderer;
use crate::sprite::{SpriteBatch, TextureCache};

/// Largest frame time fed into the fixed-step accumulator. Longer stalls
/// (debugger, window drag) are dropped instead of replayed.
pub const MAX_FRAME_TIME: f32 = 0.25;

// ── Game trait ──────────────────────────────────────────────────────────────

pub trait Game {
    /// Called once after the window and renderer exist.
    fn on_enter(&mut self, _ctx: &mut Context) {}
    /// Called at the fixed timestep; `ctx.dt()` is constant.
    fn update(&mut self, ctx: &mut Context);
    /// Queue sprites into `ctx.batch`. The batch is begun before and
    /// finished after this call.
    fn render(&mut self, ctx: &mut Context);
}

// ── Context ─────────────────────────────────────────────────────────────────

/// Everything a game touches each frame.
pub struct Context {
    pub renderer: Renderer,
    pub textures: TextureCache,
    pub batch: SpriteBatch,
    pub camera: Camera,
    pub audio: AudioContext,
    pub input: InputState,
    pub config: KitConfig,
    dt: f32,
    tick: u64,
    quit_requested: bool,
}

impl Context {
    pub fn dt(&self) -> f32 { self.dt }
    pub fn tick(&self) -> u64 { self.tick }

    pub fn is_key_held(&self, key: KeyCode) -> bool { self.input.is_key_held(key) }
    pub fn is_key_pressed(&self, key: KeyCode) -> bool { self.input.is_key_pressed(key) }
    pub fn is_mouse_pressed(&self, button: MouseButton) -> bool { self.input.is_mouse_pressed(button) }

    pub fn request_quit(&mut self) {
        self.quit_requested = true;
    }

    /// Logical game resolution as a vector.
    pub fn screen_size(&self) -> Vec2 {
        let (w, h) = self.renderer.logical_size();
        Vec2::new(w as f32, h as f32)
    }

    /// World rectangle currently on screen; feed this to tilemap culling.
    pub fn visible_rect(&self) -> Rect {
        let s = self.screen_size();
        self.camera.visible_rect(s.x, s.y)
    }

    pub fn mouse_world(&self) -> Vec2 {
        let s = self.screen_size();
        let [mx, my] = self.input.mouse_pos;
        self.camera.screen_to_world(Vec2::new(mx, my), s.x, s.y)
    }

    pub fn play_sound(&mut self, name: &str) {
        self.audio.play(name, SoundConfig::default());
    }

    /// Spatial sound heard from the camera position.
    pub fn play_spatial(&mut self, name: &str, source: Vec2) {
        let max = self.config.audio.spatial_max_distance;
        self.audio.play_spatial(name, source, self.camera.position, max);
    }

    fn sync_camera(&mut self, elapsed: f32) {
        self.camera.tick(elapsed);
        let s = self.screen_size();
        let uniform = self.camera.view_proj(s.x, s.y);
        self.renderer.update_camera(&uniform);
    }
}

// ── run ─────────────────────────────────────────────────────────────────────

/// Open the window and drive `game` until it quits or the window closes.
pub fn run(config: KitConfig, game: impl Game + 'static) -> Result<()> {
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    let fixed_dt = config.physics.fixed_dt;
    let mut app = App {
        config,
        game: Box::new(game),
        ctx: None,
        last_instant: None,
        accumulator: 0.0,
        fixed_dt,
        error: None,
    };
    event_loop.run_app(&mut app).map_err(|e| Error::Window(e.to_string()))?;
    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn apply_window_mode(window: &Window, mode: WindowMode) {
    match mode {
        WindowMode::Windowed => window.set_fullscreen(None),
        // Borderless(None) targets the monitor the window is currently on.
        WindowMode::Borderless => window.set_fullscreen(Some(Fullscreen::Borderless(None))),
    }
}

// ── App (winit ApplicationHandler) ──────────────────────────────────────────

struct App {
    config: KitConfig,
    game: Box<dyn Game>,
    ctx: Option<Context>,
    last_instant: Option<Instant>,
    accumulator: f32,
    fixed_dt: f32,
    /// Startup failure reported from `run`.
    error: Option<Error>,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<Context> {
        let wc = &self.config.window;
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title(&wc.title)
                    .with_inner_size(winit::dpi::PhysicalSize::new(wc.width, wc.height)),
            )
            .map_err(|e| Error::Window(e.to_string()))?;
        apply_window_mode(&window, wc.mode);

        let renderer = pollster::block_on(Renderer::new(Arc::new(window), &self.config))?;
        let (w, h) = renderer.logical_size();

        Ok(Context {
            renderer,
            textures: TextureCache::new(),
            batch: SpriteBatch::new(),
            camera: Camera::new(w as f32 / 2.0, h as f32 / 2.0),
            audio: AudioContext::new(&self.config.audio),
            input: InputState::new(),
            config: self.config.clone(),
            dt: self.fixed_dt,
            tick: 0,
            quit_requested: false,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() {
            return;
        }
        match self.init(event_loop) {
            Ok(mut ctx) => {
                self.game.on_enter(&mut ctx);
                self.ctx = Some(ctx);
            }
            Err(e) => {
                log::error!("app: startup failed: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ctx) = self.ctx.as_ref() {
            ctx.renderer.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(ctx) = self.ctx.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => ctx.renderer.resize(size),

            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = ctx.renderer.viewport().to_logical(
                    position.x as f32,
                    position.y as f32,
                    ctx.renderer.logical_size(),
                );
                ctx.input.mouse_pos = [x, y];
            }

            WindowEvent::MouseInput { button, state, .. } => match state {
                ElementState::Pressed => ctx.input.press_mouse(button),
                ElementState::Released => ctx.input.release_mouse(button),
            },

            WindowEvent::KeyboardInput {
                event: KeyEvent { physical_key: PhysicalKey::Code(code), state, .. },
                ..
            } => match state {
                ElementState::Pressed => ctx.input.press_key(code),
                ElementState::Released => ctx.input.release_key(code),
            },

            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let elapsed = match self.last_instant {
                    Some(prev) => now.duration_since(prev).as_secs_f32().min(MAX_FRAME_TIME),
                    None => self.fixed_dt,
                };
                self.last_instant = Some(now);
                self.accumulator += elapsed;

                while self.accumulator >= self.fixed_dt {
                    ctx.dt = self.fixed_dt;
                    ctx.tick += 1;
                    self.game.update(ctx);
                    // Edges are consumed by the first fixed step that sees them.
                    ctx.input.clear_frame_state();
                    if ctx.quit_requested {
                        event_loop.exit();
                        return;
                    }
                    self.accumulator -= self.fixed_dt;
                }

                ctx.batch.begin();
                self.game.render(ctx);
                ctx.batch.finish();
                ctx.sync_camera(elapsed);

                match ctx.renderer.render(&ctx.batch, &ctx.textures) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = ctx.renderer.window.inner_size();
                        ctx.renderer.resize(size);
                    }
                    Err(e) => log::warn!("render error: {e}"),
                }
            }

            _ => {}
        }
    }
}
