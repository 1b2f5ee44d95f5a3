//! The renderer: a caller-side control surface and the render thread
//! behind it.
//!
//! One `Renderer` owns one render thread for its whole life. The thread
//! owns every graphics handle; callers only ever post requests through the
//! single-slot [`Mailbox`] and a lock-free angle cell. Lifecycle is
//! one-way: unstarted, started (thread running, no context), initialized
//! (context live, frames flowing), destroyed. Running it again means
//! constructing a new `Renderer`.

use std::fmt;
use std::sync::atomic::{AtomicU8, AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context as _, Result};

use crate::assets::AssetSource;
use crate::drawable::Drawable;
use crate::gfx::{Frustum, Gfx, SurfaceRequest, ViewTransform};
use crate::mailbox::{ControlMessage, Mailbox};
use crate::scene::SceneConfig;

/// Sleep per loop iteration while no context exists, so an idle thread
/// stays responsive to the mailbox without burning a core.
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Externally visible lifecycle state, published by the render thread.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Phase {
    /// Constructed; `start` not called yet.
    Unstarted = 0,
    /// Render thread running, no rendering context.
    Started = 1,
    /// Context, surface and drawables are live; frames are being drawn.
    Initialized = 2,
    /// Render thread exited. Terminal.
    Destroyed = 3,
}

impl Phase {
    fn from_raw(raw: u8) -> Phase {
        match raw {
            0 => Phase::Unstarted,
            1 => Phase::Started,
            2 => Phase::Initialized,
            _ => Phase::Destroyed,
        }
    }
}

/// Misuse of the renderer's control surface.
///
/// These are caller errors, not runtime failures: the renderer logs them
/// and carries on unchanged.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RendererError {
    /// `start` was already called once over this renderer's life.
    AlreadyStarted,
    /// `stop` was called with no running render thread.
    NotStarted,
    /// `set_window` was called while a window was already set.
    WindowAlreadySet,
}

impl fmt::Display for RendererError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RendererError::AlreadyStarted => "renderer already started",
            RendererError::NotStarted => "renderer not started",
            RendererError::WindowAlreadySet => "a window is already set",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for RendererError {}

/// State shared between the caller side and the render thread.
struct Shared<G: Gfx> {
    mailbox: Mailbox,
    /// Driven angle in degrees, stored as f32 bits. No ordering relative
    /// to anything else; the loop just reads the latest value each frame.
    angle: AtomicU32,
    /// Window handed over by `set_window`, taken by the render thread.
    window: Mutex<Option<G::Window>>,
    phase: AtomicU8,
    /// Loop iterations since `start`; lets callers observe progress.
    iterations: AtomicU64,
}

impl<G: Gfx> Shared<G> {
    fn new() -> Self {
        Self {
            mailbox: Mailbox::new(),
            angle: AtomicU32::new(0f32.to_bits()),
            window: Mutex::new(None),
            phase: AtomicU8::new(Phase::Unstarted as u8),
            iterations: AtomicU64::new(0),
        }
    }

    fn angle(&self) -> f32 {
        f32::from_bits(self.angle.load(Ordering::Relaxed))
    }

    fn set_angle(&self, degrees: f32) {
        self.angle.store(degrees.to_bits(), Ordering::Relaxed);
    }

    fn phase(&self) -> Phase {
        Phase::from_raw(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

/// Everything the render thread takes ownership of when it spawns.
struct Launch<G: Gfx> {
    gfx: G,
    assets: Box<dyn AssetSource + Send>,
    scene: SceneConfig,
}

/// Owns the control surface of one render thread.
///
/// `start`, `stop` and `set_window` take `&mut self`, so one caller at a
/// time drives the lifecycle; `set_rotation` is `&self` and may be called
/// from anywhere.
pub struct Renderer<G: Gfx> {
    shared: Arc<Shared<G>>,
    /// Consumed when the thread spawns.
    launch: Option<Launch<G>>,
    thread: Option<thread::JoinHandle<()>>,
    window_given: bool,
}

impl<G> Renderer<G>
where
    G: Gfx + Send + 'static,
    G::Window: 'static,
{
    pub fn new(gfx: G, assets: impl AssetSource + Send + 'static, scene: SceneConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new()),
            launch: Some(Launch {
                gfx,
                assets: Box::new(assets),
                scene,
            }),
            thread: None,
            window_given: false,
        }
    }

    /// Spawns the render thread. Works exactly once.
    pub fn start(&mut self) -> Result<(), RendererError> {
        let Some(launch) = self.launch.take() else {
            log::error!("start called on an already started renderer");
            return Err(RendererError::AlreadyStarted);
        };

        self.shared.set_phase(Phase::Started);
        let shared = Arc::clone(&self.shared);
        self.thread = Some(thread::spawn(move || run(launch, shared)));
        log::info!("render thread started");
        Ok(())
    }

    /// Posts `ForceExit` and joins the render thread. Blocks until the
    /// thread has released everything and exited; no timeout.
    pub fn stop(&mut self) -> Result<(), RendererError> {
        let Some(handle) = self.thread.take() else {
            log::error!("stop called with no running render thread");
            return Err(RendererError::NotStarted);
        };

        log::info!("stopping render thread");
        self.shared.mailbox.post(ControlMessage::ForceExit);
        if handle.join().is_err() {
            log::error!("render thread panicked before join");
        }
        Ok(())
    }

    /// Hands a window to the render thread and posts `WindowSet`.
    ///
    /// One-shot: a second window is refused and the first stays in place.
    /// Initialization happens asynchronously on the render thread; watch
    /// [`Renderer::phase`] for the outcome.
    pub fn set_window(&mut self, window: G::Window) -> Result<(), RendererError> {
        if self.window_given {
            log::error!("set_window called while a window is already set");
            return Err(RendererError::WindowAlreadySet);
        }

        *self.shared.window.lock().unwrap() = Some(window);
        self.window_given = true;
        self.shared.mailbox.post(ControlMessage::WindowSet);
        Ok(())
    }

    /// Updates the driven rotation angle, in degrees. Lock-free; callable
    /// from any thread. The loop samples the latest value once per frame.
    pub fn set_rotation(&self, degrees: f32) {
        self.shared.set_angle(degrees);
    }

    /// Lifecycle phase as last published by the render thread.
    pub fn phase(&self) -> Phase {
        self.shared.phase()
    }

    /// Render-loop iterations since `start`.
    pub fn iterations(&self) -> u64 {
        self.shared.iterations.load(Ordering::Relaxed)
    }
}

impl<G: Gfx> Drop for Renderer<G> {
    fn drop(&mut self) {
        if let Some(handle) = self.thread.take() {
            log::warn!("renderer dropped while running; stopping render thread");
            self.shared.mailbox.post(ControlMessage::ForceExit);
            let _ = handle.join();
        }
    }
}

// ── render thread ─────────────────────────────────────────────────────────

/// Graphics state alive between successful bring-up and teardown.
struct Bound<G: Gfx> {
    window: G::Window,
    display: G::Display,
    surface: G::Surface,
    context: G::Context,
    drawables: Vec<Drawable<G>>,
}

fn run<G: Gfx>(launch: Launch<G>, shared: Arc<Shared<G>>) {
    let Launch {
        mut gfx,
        assets,
        scene,
    } = launch;
    let mut bound: Option<Bound<G>> = None;

    log::debug!("render loop entered");
    loop {
        match shared.mailbox.take() {
            Some(ControlMessage::ForceExit) => {
                log::info!("render loop exiting");
                if let Some(live) = bound.take() {
                    tear_down(&mut gfx, live);
                }
                break;
            }
            Some(ControlMessage::WindowSet) => {
                if bound.is_some() {
                    log::error!("window posted while a rendering context is live; ignoring");
                } else {
                    match bring_up(&mut gfx, assets.as_ref(), &scene, &shared) {
                        Ok(live) => {
                            bound = Some(live);
                            shared.set_phase(Phase::Initialized);
                            log::info!("rendering context initialized");
                        }
                        Err(err) => log::error!("context bring-up failed: {err:#}"),
                    }
                }
            }
            None => {}
        }

        match bound.as_mut() {
            Some(live) => {
                draw_frame(&mut gfx, live, &scene, shared.angle());
                if let Err(err) = gfx.present(&mut live.context, &mut live.surface) {
                    log::warn!("present failed: {err}");
                }
            }
            None => thread::sleep(IDLE_POLL),
        }

        shared.iterations.fetch_add(1, Ordering::Relaxed);
    }

    shared.set_phase(Phase::Destroyed);
}

/// Takes the posted window and brings up the full rendering state. On any
/// failure the window goes back into the shared slot and everything built
/// so far is released.
fn bring_up<G: Gfx>(
    gfx: &mut G,
    assets: &dyn AssetSource,
    scene: &SceneConfig,
    shared: &Shared<G>,
) -> Result<Bound<G>> {
    let window = shared
        .window
        .lock()
        .unwrap()
        .take()
        .context("window message posted but the window slot is empty")?;

    match bind_window(gfx, assets, scene, &window) {
        Ok((display, surface, context, drawables)) => Ok(Bound {
            window,
            display,
            surface,
            context,
            drawables,
        }),
        Err(err) => {
            *shared.window.lock().unwrap() = Some(window);
            Err(err)
        }
    }
}

type BoundParts<G> = (
    <G as Gfx>::Display,
    <G as Gfx>::Surface,
    <G as Gfx>::Context,
    Vec<Drawable<G>>,
);

/// The staged bring-up ladder. Each failing stage unwinds the stages that
/// already succeeded, in reverse order.
fn bind_window<G: Gfx>(
    gfx: &mut G,
    assets: &dyn AssetSource,
    scene: &SceneConfig,
    window: &G::Window,
) -> Result<BoundParts<G>> {
    let mut display = gfx.open_display().context("opening display")?;

    let mut surface = match gfx.create_surface(&mut display, window, SurfaceRequest::RGB888) {
        Ok(surface) => surface,
        Err(err) => {
            gfx.close_display(display);
            return Err(err).context("creating window surface");
        }
    };

    let mut context = match gfx.create_context(&mut display, &mut surface) {
        Ok(context) => context,
        Err(err) => {
            gfx.destroy_surface(&mut display, surface);
            gfx.close_display(display);
            return Err(err).context("creating rendering context");
        }
    };

    match configure(gfx, &mut display, &mut surface, &mut context, assets, scene) {
        Ok(drawables) => Ok((display, surface, context, drawables)),
        Err(err) => {
            gfx.destroy_context(&mut display, context);
            gfx.destroy_surface(&mut display, surface);
            gfx.close_display(display);
            Err(err)
        }
    }
}

/// Post-context setup: viewport, projection, and the scene's drawables.
fn configure<G: Gfx>(
    gfx: &mut G,
    display: &mut G::Display,
    surface: &mut G::Surface,
    context: &mut G::Context,
    assets: &dyn AssetSource,
    scene: &SceneConfig,
) -> Result<Vec<Drawable<G>>> {
    let size = gfx
        .surface_size(display, surface)
        .context("querying surface size")?;
    anyhow::ensure!(size.0 > 0 && size.1 > 0, "surface has zero size");

    let aspect = size.0 as f32 / size.1 as f32;
    gfx.set_viewport(context, size, Frustum::from_aspect(aspect))
        .context("setting viewport")?;
    log::debug!("viewport {}x{}", size.0, size.1);

    let mut drawables = Vec::with_capacity(scene.drawables.len());
    for desc in &scene.drawables {
        match Drawable::create(gfx, context, assets, desc) {
            Ok(drawable) => drawables.push(drawable),
            Err(err) => {
                for built in drawables.drain(..) {
                    built.destroy(gfx, context);
                }
                return Err(err.context(format!("creating drawable {desc:?}")));
            }
        }
    }
    Ok(drawables)
}

fn draw_frame<G: Gfx>(gfx: &mut G, live: &mut Bound<G>, scene: &SceneConfig, angle_deg: f32) {
    let view = ViewTransform {
        translate: [0.0, 0.0, scene.camera.distance],
        yaw_deg: angle_deg,
        pitch_deg: angle_deg * scene.camera.pitch_ratio,
    };
    gfx.begin_frame(&mut live.context, scene.clear, &view);
    for drawable in &mut live.drawables {
        drawable.draw(gfx, &mut live.context);
    }
}

/// Releases everything in reverse creation order.
fn tear_down<G: Gfx>(gfx: &mut G, live: Bound<G>) {
    let Bound {
        window,
        mut display,
        surface,
        mut context,
        drawables,
    } = live;

    for drawable in drawables {
        drawable.destroy(gfx, &mut context);
    }
    gfx.destroy_context(&mut display, context);
    gfx.destroy_surface(&mut display, surface);
    gfx.close_display(display);
    drop(window);
    log::info!("rendering context released");
}
