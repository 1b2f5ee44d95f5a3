//! Recording fake backend for render-loop tests.
//!
//! Every operation appends an [`Event`] to a shared log the test thread can
//! inspect while the render thread runs. A single stage can be told to
//! fail, which is how bring-up rollback and present-failure behavior get
//! exercised without a GPU.

use std::sync::{Arc, Mutex};

use crate::mesh::{ColorVertex, Triangle, Vertex};

use super::{Frustum, Gfx, GfxError, PixelBuffer, PixelFormat, Rgba, SurfaceRequest, ViewTransform};

/// Size every fake surface reports.
pub(crate) const SURFACE_SIZE: (u32, u32) = (640, 480);

/// Stage selected for failure injection.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum FailStage {
    OpenDisplay,
    CreateSurface,
    CreateContext,
    SurfaceSize,
    SetViewport,
    CreateTexture,
    Present,
}

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Event {
    OpenDisplay,
    CreateSurface {
        window: u32,
        request: SurfaceRequest,
    },
    CreateContext,
    SurfaceSize,
    SetViewport {
        size: (u32, u32),
        frustum: Frustum,
    },
    CreateTexture {
        id: u32,
        width: u32,
        height: u32,
        format: PixelFormat,
    },
    DestroyTexture {
        id: u32,
    },
    BeginFrame {
        clear: Rgba,
        view: ViewTransform,
    },
    DrawTextured {
        texture: u32,
        vertices: usize,
        triangles: usize,
    },
    DrawColored {
        vertices: usize,
        triangles: usize,
    },
    Present,
    DestroyContext,
    DestroySurface,
    CloseDisplay,
}

/// Shared, clonable view of everything the fake backend was asked to do.
#[derive(Clone, Default)]
pub(crate) struct Recording(Arc<Mutex<Vec<Event>>>);

impl Recording {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    pub(crate) fn contains(&self, event: &Event) -> bool {
        self.0.lock().unwrap().contains(event)
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }
}

/// Window stand-in; the id shows up in [`Event::CreateSurface`].
#[derive(Debug)]
pub(crate) struct FakeWindow(pub(crate) u32);

#[derive(Debug)]
pub(crate) struct FakeDisplay;

#[derive(Debug)]
pub(crate) struct FakeSurface;

#[derive(Debug)]
pub(crate) struct FakeContext;

#[derive(Debug)]
pub(crate) struct FakeTexture {
    id: u32,
}

pub(crate) struct FakeGfx {
    rec: Recording,
    fail: Option<FailStage>,
    next_texture: u32,
}

impl FakeGfx {
    pub(crate) fn new() -> (Self, Recording) {
        let rec = Recording::default();
        (
            Self {
                rec: rec.clone(),
                fail: None,
                next_texture: 0,
            },
            rec,
        )
    }

    pub(crate) fn failing_at(stage: FailStage) -> (Self, Recording) {
        let (mut gfx, rec) = Self::new();
        gfx.fail = Some(stage);
        (gfx, rec)
    }

    fn injected(&self, stage: FailStage) -> Result<(), GfxError> {
        if self.fail == Some(stage) {
            return Err(GfxError::new(format!("injected failure at {stage:?}")));
        }
        Ok(())
    }
}

impl Gfx for FakeGfx {
    type Window = FakeWindow;
    type Display = FakeDisplay;
    type Surface = FakeSurface;
    type Context = FakeContext;
    type Texture = FakeTexture;

    fn open_display(&mut self) -> Result<FakeDisplay, GfxError> {
        self.rec.push(Event::OpenDisplay);
        self.injected(FailStage::OpenDisplay)?;
        Ok(FakeDisplay)
    }

    fn create_surface(
        &mut self,
        _display: &mut FakeDisplay,
        window: &FakeWindow,
        request: SurfaceRequest,
    ) -> Result<FakeSurface, GfxError> {
        self.rec.push(Event::CreateSurface {
            window: window.0,
            request,
        });
        self.injected(FailStage::CreateSurface)?;
        Ok(FakeSurface)
    }

    fn create_context(
        &mut self,
        _display: &mut FakeDisplay,
        _surface: &mut FakeSurface,
    ) -> Result<FakeContext, GfxError> {
        self.rec.push(Event::CreateContext);
        self.injected(FailStage::CreateContext)?;
        Ok(FakeContext)
    }

    fn surface_size(
        &mut self,
        _display: &mut FakeDisplay,
        _surface: &mut FakeSurface,
    ) -> Result<(u32, u32), GfxError> {
        self.rec.push(Event::SurfaceSize);
        self.injected(FailStage::SurfaceSize)?;
        Ok(SURFACE_SIZE)
    }

    fn set_viewport(
        &mut self,
        _context: &mut FakeContext,
        size: (u32, u32),
        frustum: Frustum,
    ) -> Result<(), GfxError> {
        self.rec.push(Event::SetViewport { size, frustum });
        self.injected(FailStage::SetViewport)?;
        Ok(())
    }

    fn create_texture(
        &mut self,
        _context: &mut FakeContext,
        pixels: &PixelBuffer,
    ) -> Result<FakeTexture, GfxError> {
        let id = self.next_texture;
        self.next_texture += 1;
        self.rec.push(Event::CreateTexture {
            id,
            width: pixels.width,
            height: pixels.height,
            format: pixels.format,
        });
        self.injected(FailStage::CreateTexture)?;
        Ok(FakeTexture { id })
    }

    fn destroy_texture(&mut self, _context: &mut FakeContext, texture: FakeTexture) {
        self.rec.push(Event::DestroyTexture { id: texture.id });
    }

    fn begin_frame(&mut self, _context: &mut FakeContext, clear: Rgba, view: &ViewTransform) {
        self.rec.push(Event::BeginFrame { clear, view: *view });
    }

    fn draw_textured(
        &mut self,
        _context: &mut FakeContext,
        texture: &FakeTexture,
        vertices: &[Vertex],
        triangles: &[Triangle],
    ) {
        self.rec.push(Event::DrawTextured {
            texture: texture.id,
            vertices: vertices.len(),
            triangles: triangles.len(),
        });
    }

    fn draw_colored(
        &mut self,
        _context: &mut FakeContext,
        vertices: &[ColorVertex],
        triangles: &[Triangle],
    ) {
        self.rec.push(Event::DrawColored {
            vertices: vertices.len(),
            triangles: triangles.len(),
        });
    }

    fn present(
        &mut self,
        _context: &mut FakeContext,
        _surface: &mut FakeSurface,
    ) -> Result<(), GfxError> {
        self.rec.push(Event::Present);
        self.injected(FailStage::Present)?;
        Ok(())
    }

    fn destroy_context(&mut self, _display: &mut FakeDisplay, _context: FakeContext) {
        self.rec.push(Event::DestroyContext);
    }

    fn destroy_surface(&mut self, _display: &mut FakeDisplay, _surface: FakeSurface) {
        self.rec.push(Event::DestroySurface);
    }

    fn close_display(&mut self, _display: FakeDisplay) {
        self.rec.push(Event::CloseDisplay);
    }
}
