//! The wgpu implementation of the backend contract.
//!
//! Handle mapping: a display is a wgpu `Instance`, a surface wraps the
//! window's swapchain surface, and a context owns the device, queue,
//! pipelines and the per-frame draw list. Draw calls accumulate over the
//! frame and replay in a single render pass when the frame is presented,
//! in submission order, so later drawables paint over earlier ones.

use std::borrow::Cow;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use gyre_render::gfx::{
    Frustum, Gfx, GfxError, PixelBuffer, PixelFormat, Rgba, SurfaceRequest, ViewTransform,
};
use gyre_render::mesh::{ColorVertex, Triangle, Vertex};

use crate::transform::model_view_projection;

/// Backend tuning knobs.
#[derive(Debug, Clone)]
pub struct WgpuOptions {
    /// Adapter preference handed to wgpu.
    pub power_preference: wgpu::PowerPreference,

    /// Present mode (swap behavior). FIFO is broadly supported.
    pub present_mode: wgpu::PresentMode,
}

impl Default for WgpuOptions {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            present_mode: wgpu::PresentMode::Fifo,
        }
    }
}

/// The wgpu-backed [`Gfx`] implementation.
///
/// Stateless apart from its options; all live graphics state sits in the
/// handles the render loop owns.
#[derive(Debug, Default)]
pub struct WgpuGfx {
    options: WgpuOptions,
}

impl WgpuGfx {
    pub fn new(options: WgpuOptions) -> Self {
        Self { options }
    }
}

pub struct WgpuDisplay {
    instance: wgpu::Instance,
}

/// An unconfigured swapchain surface plus the window it came from.
///
/// Configuration happens at context creation, once a device exists.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    window: Arc<winit::window::Window>,
    request: SurfaceRequest,
}

pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    textured_pipeline: wgpu::RenderPipeline,
    colored_pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,

    transform_buffer: wgpu::Buffer,
    transform_group: wgpu::BindGroup,

    frustum: Frustum,
    frame: FrameState,
}

pub struct WgpuTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct TransformUniform {
    mvp: [[f32; 4]; 4],
}

/// Draw calls recorded between `begin_frame` and `present`.
struct FrameState {
    clear: Rgba,
    calls: Vec<DrawCall>,
}

impl Default for FrameState {
    fn default() -> Self {
        Self {
            clear: Rgba::BLACK,
            calls: Vec::new(),
        }
    }
}

enum DrawCall {
    Textured {
        bind_group: wgpu::BindGroup,
        vertices: wgpu::Buffer,
        indices: wgpu::Buffer,
        index_count: u32,
    },
    Colored {
        vertices: wgpu::Buffer,
        indices: wgpu::Buffer,
        index_count: u32,
    },
}

impl Gfx for WgpuGfx {
    type Window = Arc<winit::window::Window>;
    type Display = WgpuDisplay;
    type Surface = WgpuSurface;
    type Context = WgpuContext;
    type Texture = WgpuTexture;

    fn open_display(&mut self) -> Result<WgpuDisplay, GfxError> {
        // All backends, so wgpu picks the platform's best one.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        Ok(WgpuDisplay { instance })
    }

    fn create_surface(
        &mut self,
        display: &mut WgpuDisplay,
        window: &Arc<winit::window::Window>,
        request: SurfaceRequest,
    ) -> Result<WgpuSurface, GfxError> {
        let surface = display
            .instance
            .create_surface(window.clone())
            .map_err(|err| GfxError::new(format!("creating wgpu surface: {err}")))?;

        Ok(WgpuSurface {
            surface,
            window: window.clone(),
            request,
        })
    }

    fn create_context(
        &mut self,
        display: &mut WgpuDisplay,
        surface: &mut WgpuSurface,
    ) -> Result<WgpuContext, GfxError> {
        let size = surface.window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(GfxError::new("window has zero size"));
        }

        // Adapter/device acquisition is asynchronous under wgpu.
        let (adapter, device, queue) = pollster::block_on(async {
            let adapter = display
                .instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: self.options.power_preference,
                    compatible_surface: Some(&surface.surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(|err| GfxError::new(format!("no suitable GPU adapter: {err}")))?;

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("gyre device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    experimental_features: wgpu::ExperimentalFeatures::disabled(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    trace: wgpu::Trace::Off,
                })
                .await
                .map_err(|err| GfxError::new(format!("creating wgpu device: {err}")))?;

            Ok::<_, GfxError>((adapter, device, queue))
        })?;

        let info = adapter.get_info();
        log::debug!("adapter: {} ({:?})", info.name, info.backend);

        let caps = surface.surface.get_capabilities(&adapter);
        let format = pick_format(&caps, surface.request)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: self.options.present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.surface.configure(&device, &config);

        Ok(WgpuContext::new(device, queue, config))
    }

    fn surface_size(
        &mut self,
        _display: &mut WgpuDisplay,
        surface: &mut WgpuSurface,
    ) -> Result<(u32, u32), GfxError> {
        let size = surface.window.inner_size();
        Ok((size.width, size.height))
    }

    fn set_viewport(
        &mut self,
        context: &mut WgpuContext,
        size: (u32, u32),
        frustum: Frustum,
    ) -> Result<(), GfxError> {
        if size != (context.config.width, context.config.height) {
            return Err(GfxError::new(format!(
                "viewport {}x{} does not match the configured surface {}x{}",
                size.0, size.1, context.config.width, context.config.height
            )));
        }
        context.frustum = frustum;
        Ok(())
    }

    fn create_texture(
        &mut self,
        context: &mut WgpuContext,
        pixels: &PixelBuffer,
    ) -> Result<WgpuTexture, GfxError> {
        // Surfaces and textures are RGBA on this backend; densely packed
        // RGB input gains an opaque alpha channel on upload.
        let rgba: Cow<'_, [u8]> = match pixels.format {
            PixelFormat::Rgba8 => Cow::Borrowed(&pixels.bytes),
            PixelFormat::Rgb8 => {
                let mut out = Vec::with_capacity(pixels.bytes.len() / 3 * 4);
                for px in pixels.bytes.chunks_exact(3) {
                    out.extend_from_slice(px);
                    out.push(0xff);
                }
                Cow::Owned(out)
            }
        };

        let size = wgpu::Extent3d {
            width: pixels.width,
            height: pixels.height,
            depth_or_array_layers: 1,
        };

        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("gyre texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * pixels.width),
                rows_per_image: Some(pixels.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = context.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gyre texture bind group"),
            layout: &context.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&context.sampler),
                },
            ],
        });

        Ok(WgpuTexture {
            texture,
            bind_group,
        })
    }

    fn destroy_texture(&mut self, _context: &mut WgpuContext, texture: WgpuTexture) {
        texture.texture.destroy();
    }

    fn begin_frame(&mut self, context: &mut WgpuContext, clear: Rgba, view: &ViewTransform) {
        let mvp = model_view_projection(&context.frustum, view);
        let uniform = TransformUniform {
            mvp: mvp.to_cols(),
        };
        context
            .queue
            .write_buffer(&context.transform_buffer, 0, bytemuck::bytes_of(&uniform));

        context.frame.clear = clear;
        context.frame.calls.clear();
    }

    fn draw_textured(
        &mut self,
        context: &mut WgpuContext,
        texture: &WgpuTexture,
        vertices: &[Vertex],
        triangles: &[Triangle],
    ) {
        if triangles.is_empty() {
            return;
        }
        let (vbo, ibo) = upload_mesh(&context.device, bytemuck::cast_slice(vertices), triangles);
        context.frame.calls.push(DrawCall::Textured {
            bind_group: texture.bind_group.clone(),
            vertices: vbo,
            indices: ibo,
            index_count: triangles.len() as u32 * 3,
        });
    }

    fn draw_colored(
        &mut self,
        context: &mut WgpuContext,
        vertices: &[ColorVertex],
        triangles: &[Triangle],
    ) {
        if triangles.is_empty() {
            return;
        }
        let (vbo, ibo) = upload_mesh(&context.device, bytemuck::cast_slice(vertices), triangles);
        context.frame.calls.push(DrawCall::Colored {
            vertices: vbo,
            indices: ibo,
            index_count: triangles.len() as u32 * 3,
        });
    }

    fn present(
        &mut self,
        context: &mut WgpuContext,
        surface: &mut WgpuSurface,
    ) -> Result<(), GfxError> {
        let frame = match surface.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => return Err(recover_surface(context, surface, err)),
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("gyre frame encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gyre scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(to_wgpu_color(context.frame.clear)),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            // Group 0 is the shared transform; both pipeline layouts agree
            // on it, so binding persists across pipeline switches.
            rpass.set_bind_group(0, &context.transform_group, &[]);

            for call in &context.frame.calls {
                match call {
                    DrawCall::Textured {
                        bind_group,
                        vertices,
                        indices,
                        index_count,
                    } => {
                        rpass.set_pipeline(&context.textured_pipeline);
                        rpass.set_bind_group(1, bind_group, &[]);
                        rpass.set_vertex_buffer(0, vertices.slice(..));
                        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                        rpass.draw_indexed(0..*index_count, 0, 0..1);
                    }
                    DrawCall::Colored {
                        vertices,
                        indices,
                        index_count,
                    } => {
                        rpass.set_pipeline(&context.colored_pipeline);
                        rpass.set_vertex_buffer(0, vertices.slice(..));
                        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint16);
                        rpass.draw_indexed(0..*index_count, 0, 0..1);
                    }
                }
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        context.frame.calls.clear();
        Ok(())
    }

    fn destroy_context(&mut self, _display: &mut WgpuDisplay, context: WgpuContext) {
        drop(context);
        log::debug!("wgpu device released");
    }

    fn destroy_surface(&mut self, _display: &mut WgpuDisplay, surface: WgpuSurface) {
        drop(surface);
    }

    fn close_display(&mut self, display: WgpuDisplay) {
        drop(display);
    }
}

impl WgpuContext {
    fn new(device: wgpu::Device, queue: wgpu::Queue, config: wgpu::SurfaceConfiguration) -> Self {
        let textured_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gyre textured shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
        });
        let colored_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("gyre colored shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/colored.wgsl").into()),
        });

        let transform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gyre transform bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: Some(
                        std::num::NonZeroU64::new(std::mem::size_of::<TransformUniform>() as u64)
                            .unwrap(),
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("gyre texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let textured_pipeline = make_pipeline(
            &device,
            "gyre textured pipeline",
            &textured_shader,
            &[&transform_layout, &texture_layout],
            vertex_layout(),
            config.format,
        );
        let colored_pipeline = make_pipeline(
            &device,
            "gyre colored pipeline",
            &colored_shader,
            &[&transform_layout],
            color_vertex_layout(),
            config.format,
        );

        let sampler = device.create_sampler(&texture_sampler());

        let transform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("gyre transform ubo"),
            size: std::mem::size_of::<TransformUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let transform_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("gyre transform bind group"),
            layout: &transform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        let frustum = Frustum::from_aspect(config.width as f32 / config.height as f32);

        Self {
            device,
            queue,
            config,
            textured_pipeline,
            colored_pipeline,
            texture_layout,
            sampler,
            transform_buffer,
            transform_group,
            frustum,
            frame: FrameState::default(),
        }
    }
}

fn make_pipeline(
    device: &wgpu::Device,
    label: &str,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    vertex_buffer: wgpu::VertexBufferLayout<'_>,
    format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts,
        // Newer wgpu uses immediate constants; keep disabled.
        immediate_size: 0,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_buffer],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x2  // uv
];

const COLOR_VERTEX_ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3, // position
    1 => Float32x4  // color
];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

fn color_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<ColorVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &COLOR_VERTEX_ATTRS,
    }
}

fn upload_mesh(
    device: &wgpu::Device,
    vertex_bytes: &[u8],
    triangles: &[Triangle],
) -> (wgpu::Buffer, wgpu::Buffer) {
    let vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gyre mesh vbo"),
        contents: vertex_bytes,
        usage: wgpu::BufferUsages::VERTEX,
    });
    let ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gyre mesh ibo"),
        contents: bytemuck::cast_slice(triangles),
        usage: wgpu::BufferUsages::INDEX,
    });
    (vbo, ibo)
}

/// Sampler shared by every uploaded texture: clamp at the edges, nearest
/// filtering, no mipmaps. Nearest keeps a transparent atlas texel at exactly
/// alpha 0, which the textured shader's discard relies on.
fn texture_sampler() -> wgpu::SamplerDescriptor<'static> {
    wgpu::SamplerDescriptor {
        label: Some("gyre texture sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    }
}

/// Picks an 8-bit non-sRGB surface format, so fragment output lands in the
/// framebuffer unencoded the way a fixed-function pipeline writes it.
fn pick_format(
    caps: &wgpu::SurfaceCapabilities,
    request: SurfaceRequest,
) -> Result<wgpu::TextureFormat, GfxError> {
    let wanted = [
        wgpu::TextureFormat::Bgra8Unorm,
        wgpu::TextureFormat::Rgba8Unorm,
    ];
    for f in wanted {
        if caps.formats.contains(&f) {
            return Ok(f);
        }
    }

    caps.formats.first().copied().ok_or_else(|| {
        GfxError::new(format!(
            "no surface format offers {}/{}/{} bits",
            request.red_bits, request.green_bits, request.blue_bits
        ))
    })
}

/// Maps a failed frame acquisition to an error the render loop can log,
/// reconfiguring the swapchain first when that is the documented fix.
fn recover_surface(
    context: &mut WgpuContext,
    surface: &mut WgpuSurface,
    err: wgpu::SurfaceError,
) -> GfxError {
    match err {
        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
            let size = surface.window.inner_size();
            if size.width > 0 && size.height > 0 {
                context.config.width = size.width;
                context.config.height = size.height;
                surface.surface.configure(&context.device, &context.config);
            }
            GfxError::new(format!("surface reconfigured after: {err}"))
        }
        other => GfxError::new(format!("no frame available: {other}")),
    }
}

fn to_wgpu_color(c: Rgba) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(c.r),
        g: f64::from(c.g),
        b: f64::from(c.b),
        a: f64::from(c.a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_sampler_clamps_and_snaps_to_texels() {
        let desc = texture_sampler();
        assert_eq!(desc.mag_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.min_filter, wgpu::FilterMode::Nearest);
        assert_eq!(desc.mipmap_filter, wgpu::MipmapFilterMode::Nearest);
        assert_eq!(desc.address_mode_u, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_v, wgpu::AddressMode::ClampToEdge);
        assert_eq!(desc.address_mode_w, wgpu::AddressMode::ClampToEdge);
    }
}
