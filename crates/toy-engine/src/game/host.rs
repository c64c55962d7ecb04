use anyhow::{Context, Result};
use glam::Vec2;

use crate::camera::{Camera, FreeviewController};
use crate::color::{Color, Palette};
use crate::config::EngineConfig;
use crate::core::{App, AppControl, FrameCtx, WindowCtx};
use crate::device::Gpu;
use crate::input::{InputFrame, InputState, Key, MouseButton};
use crate::render::{FlushStats, GlyphAtlas, PrimitiveBatch, PrimitiveRenderer, RenderCtx, TextBatch, TextRenderer};
use crate::time::FrameTime;
use crate::window::Runtime;

/// A game driven by [`GameHost`].
pub trait Game {
    /// Called once the GPU is up, before the first update.
    fn init(&mut self, camera: &mut Camera) {
        let _ = camera;
    }

    /// Advances the simulation by `ctx.dt` seconds. Drawing here is fine.
    fn update(&mut self, ctx: &mut GameCtx<'_>);

    /// Called right after `update` in the same frame.
    fn draw(&mut self, ctx: &mut GameCtx<'_>) {
        let _ = ctx;
    }
}

/// What a game sees during one frame.
pub struct GameCtx<'a> {
    /// Clamped frame delta in seconds.
    pub dt: f32,
    pub time: FrameTime,
    /// World-space points and lines; implements [`Draw`](crate::draw::Draw).
    pub draw: &'a mut PrimitiveBatch,
    /// Overlay text.
    pub text: &'a mut TextBatch,
    pub camera: &'a mut Camera,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub palette: &'a Palette,
}

impl GameCtx<'_> {
    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.input.key_down(key)
    }

    #[inline]
    pub fn key_pressed(&self, key: Key) -> bool {
        self.input_frame.key_pressed(key)
    }

    #[inline]
    pub fn button_pressed(&self, button: MouseButton) -> bool {
        self.input_frame.button_pressed(button)
    }

    /// Pointer position in window pixels, origin when outside the window.
    pub fn pointer(&self) -> Vec2 {
        self.input.pointer_or_origin()
    }

    /// Queues overlay text at `position` (overlay units, bottom-left origin).
    pub fn draw_text(&mut self, position: Vec2, text: impl Into<String>, scale: f32, color: Color) {
        self.text.draw_text(position, text, scale, color);
    }
}

struct Renderers {
    primitive: PrimitiveRenderer,
    text: TextRenderer,
}

/// [`App`] implementation that hosts a [`Game`].
///
/// Escape exits. With `EngineConfig::freeview` set, the free-fly controller
/// moves the camera before the game updates.
pub struct GameHost<G> {
    game: G,
    config: EngineConfig,
    camera: Camera,
    freeview: Option<FreeviewController>,
    primitives: PrimitiveBatch,
    text: TextBatch,
    renderers: Option<Renderers>,
    initialized: bool,
}

impl<G: Game> GameHost<G> {
    pub fn new(game: G, config: EngineConfig) -> Self {
        Self {
            camera: Camera::new(&config.camera),
            freeview: config.freeview.then(FreeviewController::new),
            game,
            config,
            primitives: PrimitiveBatch::new(),
            text: TextBatch::new(),
            renderers: None,
            initialized: false,
        }
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Runs `Game::init` the first time it is called.
    fn ensure_initialized(&mut self, viewport: (f32, f32)) {
        if self.initialized {
            return;
        }
        self.camera.set_viewport_size(viewport.0, viewport.1);
        self.game.init(&mut self.camera);
        self.initialized = true;
    }

    /// One simulation step: camera control, then the game's update and draw.
    fn step(&mut self, input: &InputState, input_frame: &InputFrame, time: FrameTime, viewport: (f32, f32)) {
        self.ensure_initialized(viewport);

        if self.camera.viewport_size() != Vec2::from(viewport) {
            self.camera.set_viewport_size(viewport.0, viewport.1);
        }

        if let Some(freeview) = self.freeview.as_mut() {
            freeview.handle_input(&mut self.camera, input, input_frame);
            freeview.update(&mut self.camera, input, time.dt);
        }

        let mut ctx = GameCtx {
            dt: time.dt,
            time,
            draw: &mut self.primitives,
            text: &mut self.text,
            camera: &mut self.camera,
            input,
            input_frame,
            palette: &self.config.palette,
        };
        self.game.update(&mut ctx);
        self.game.draw(&mut ctx);
    }
}

impl<G: Game> App for GameHost<G> {
    fn on_gpu_ready(&mut self, window: WindowCtx<'_>, gpu: &Gpu<'_>) -> Result<()> {
        if self.renderers.is_some() {
            return Ok(());
        }

        let size = gpu.size();
        let rctx = RenderCtx::new(gpu.device(), gpu.queue(), gpu.surface_format(), (size.width, size.height));

        let text_config = &self.config.text;
        let atlas = GlyphAtlas::load(&text_config.atlas, &text_config.grid).context("failed to load glyph atlas")?;

        let primitive = PrimitiveRenderer::new(&rctx, self.config.batch.primitive_chunk_vertices)
            .context("failed to create primitive renderer")?;
        let text = TextRenderer::new(&rctx, text_config.grid, &atlas, self.config.batch.text_chunk_vertices)
            .context("failed to create text renderer")?;
        self.renderers = Some(Renderers { primitive, text });

        self.ensure_initialized(window.logical_size());
        log::info!("game host ready");
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.key_pressed(Key::Escape) {
            log::info!("escape pressed, exiting");
            return AppControl::Exit;
        }

        self.step(ctx.input, ctx.input_frame, ctx.time, ctx.window.logical_size());
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderers) = self.renderers.as_mut() else {
            self.primitives.clear();
            self.text.clear();
            return AppControl::Continue;
        };

        let view_projection = self.camera.view_projection();
        let overlay_projection = self.camera.overlay_view_projection();
        let primitives = &mut self.primitives;
        let text = &mut self.text;
        let mut stats = FlushStats::default();

        let control = ctx.render(self.config.clear_color, |rctx, target| {
            stats += renderers.primitive.flush(rctx, target, primitives, &view_projection);
            stats += renderers.text.flush(rctx, target, text, &overlay_projection);
        });

        // A skipped frame still drops this frame's geometry.
        primitives.clear();
        text.clear();

        if ctx.time.frame_index % 600 == 0 {
            log::debug!(
                "frame {}: {} vertices in {} draw calls",
                ctx.time.frame_index,
                stats.vertices,
                stats.draw_calls
            );
        }
        control
    }
}

/// Opens a window and runs `game` until it closes.
pub fn run<G: Game + 'static>(game: G, config: EngineConfig) -> Result<()> {
    log::info!("starting `{}`", config.window.title);
    let window = config.window.clone();
    let gpu = config.gpu.clone();
    Runtime::run(window, gpu, GameHost::new(game, config))
}
