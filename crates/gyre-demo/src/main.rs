//! Demo host: one winit window in front of the render thread.
//!
//! The pointer's x position drives the scene rotation, the way the
//! original touchscreen input did. `textured` (the default) shows the
//! checkerboard plane with a row of hex glyphs floating above it; `cube`
//! shows the colored cube.

mod assets;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use gyre_render::drawable::DrawableDesc;
use gyre_render::gfx::Rgba;
use gyre_render::logging::{self, LoggingConfig};
use gyre_render::{CameraRig, Phase, Renderer, SceneConfig};
use gyre_wgpu::{WgpuGfx, WgpuOptions};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Sample {
    Textured,
    Cube,
}

impl Sample {
    fn parse(arg: &str) -> Option<Sample> {
        match arg {
            "textured" => Some(Sample::Textured),
            "cube" => Some(Sample::Cube),
            _ => None,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Sample::Textured => "gyre: textured plane",
            Sample::Cube => "gyre: colored cube",
        }
    }
}

fn scene_for(sample: Sample) -> SceneConfig {
    match sample {
        Sample::Textured => SceneConfig {
            drawables: vec![
                DrawableDesc::TexturedPlane {
                    image: assets::PLANE_ASSET.into(),
                },
                DrawableDesc::Text {
                    sheet: assets::SHEET_ASSET.into(),
                    value: "deadbeef".into(),
                },
            ],
            ..SceneConfig::default()
        },
        Sample::Cube => SceneConfig {
            clear: Rgba::BLACK,
            camera: CameraRig {
                distance: -3.0,
                pitch_ratio: 0.1,
            },
            drawables: vec![DrawableDesc::ColoredCube],
        },
    }
}

fn main() -> Result<()> {
    logging::init(&LoggingConfig::default());

    let sample = match std::env::args().nth(1) {
        None => Sample::Textured,
        Some(arg) => Sample::parse(&arg).with_context(|| {
            format!("unknown sample {arg:?}; expected \"textured\" or \"cube\"")
        })?,
    };
    log::info!("running the {sample:?} sample");

    let assets = assets::demo_assets().context("building generated assets")?;
    let mut renderer = Renderer::new(
        WgpuGfx::new(WgpuOptions::default()),
        assets,
        scene_for(sample),
    );
    renderer.start()?;

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let mut app = App {
        renderer,
        window: None,
        title: sample.title(),
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with error")?;
    Ok(())
}

struct App {
    renderer: Renderer<WgpuGfx>,
    window: Option<Arc<Window>>,
    title: &'static str,
}

impl App {
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.phase() != Phase::Destroyed {
            if let Err(err) = self.renderer.stop() {
                log::error!("stopping renderer: {err}");
            }
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.title)
            .with_inner_size(LogicalSize::new(800.0, 480.0));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        if let Err(err) = self.renderer.set_window(window.clone()) {
            log::error!("handing the window to the renderer: {err}");
        }
        self.window = Some(window);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // The render thread repaints on its own; the event loop only has
        // to wake for input.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shut_down(event_loop),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => self.shut_down(event_loop),

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    let width = window.inner_size().width;
                    if width > 0 {
                        let ratio = position.x as f32 / width as f32;
                        self.renderer.set_rotation(ratio * 180.0 - 90.0);
                    }
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_names_parse() {
        assert_eq!(Sample::parse("textured"), Some(Sample::Textured));
        assert_eq!(Sample::parse("cube"), Some(Sample::Cube));
        assert_eq!(Sample::parse("teapot"), None);
    }

    #[test]
    fn textured_scene_keeps_the_stock_camera() {
        let scene = scene_for(Sample::Textured);
        assert_eq!(scene.camera.distance, -1.75);
        assert_eq!(scene.drawables.len(), 2);
    }

    #[test]
    fn cube_scene_pulls_back_and_flattens_the_tumble() {
        let scene = scene_for(Sample::Cube);
        assert_eq!(scene.clear, Rgba::BLACK);
        assert_eq!(scene.camera.distance, -3.0);
        assert_eq!(scene.camera.pitch_ratio, 0.1);
        assert_eq!(scene.drawables, vec![DrawableDesc::ColoredCube]);
    }
}
