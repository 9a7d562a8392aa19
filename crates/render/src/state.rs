//! Surface, device and per-frame state for the fractal viewer
//!
//! Owns everything with a GPU lifetime: surface and its configuration,
//! the render pipeline, the uniform buffer, and the camera driving it.
//! The event loop in [`crate::run`] forwards window events here and calls
//! [`State::update`] / [`State::render`] once per frame.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

use crate::camera::{Camera, CameraController};
use crate::capture;
use crate::gpu_types::{FractalUniform, Quality};
use crate::pipeline;

/// Background colour behind the fractal.
pub const CLEAR_COLOUR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.2,
    b: 0.4,
    a: 1.0,
};

/// Movement speed in world units per second.
const CAMERA_SPEED: f32 = 10.0;
/// Mouse look sensitivity in degrees per pixel.
const MOUSE_SENSITIVITY: f32 = 1.0;

/// Colour pairs cycled with the C key.
const PALETTE: [([f32; 3], [f32; 3]); 5] = [
    ([1.0, 1.0, 1.0], [1.0, 1.0, 1.0]),
    ([0.98, 0.85, 0.37], [0.55, 0.13, 0.28]),
    ([0.42, 0.75, 0.92], [0.05, 0.09, 0.25]),
    ([0.86, 0.44, 0.22], [0.18, 0.32, 0.12]),
    ([0.78, 0.68, 0.94], [0.11, 0.04, 0.18]),
];

/// Startup configuration handed over from the binary crate
#[derive(Clone, Debug)]
pub struct ViewerOptions {
    /// Initial window size in logical pixels
    pub width: u32,
    pub height: u32,
    /// Base fractal power exponent
    pub power: f32,
    /// Initial raymarching quality tier
    pub quality: Quality,
    /// Whether the power oscillates with time at startup
    pub animated: bool,
    /// First palette colour, normalized rgb
    pub colour_a: [f32; 3],
    /// Second palette colour, normalized rgb
    pub colour_b: [f32; 3],
    /// External WGSL file replacing the embedded shader
    pub shader_override: Option<PathBuf>,
    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            power: 8.0,
            quality: Quality::Low,
            animated: false,
            colour_a: [1.0, 1.0, 1.0],
            colour_b: [1.0, 1.0, 1.0],
            shader_override: None,
            screenshot_dir: PathBuf::from("."),
        }
    }
}

pub struct State {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    uniform: FractalUniform,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    bind_group_layout: wgpu::BindGroupLayout,
    camera: Camera,
    controller: CameraController,
    shader_src: String,
    start: Instant,
    quality: Quality,
    animated: bool,
    palette_index: Option<usize>,
    colour_a: [f32; 3],
    colour_b: [f32; 3],
    screenshot_dir: PathBuf,
    screenshot_queued: bool,
    mouse_pressed: bool,
}

impl State {
    pub async fn new(window: Arc<Window>, options: ViewerOptions) -> Result<Self> {
        let instance = wgpu::Instance::default();
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::from_window(&*window)?)?
        };
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to get adapter")?;
        tracing::info!("rendering on {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Viewer Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await
            .context("failed to request device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            desired_maximum_frame_latency: 2,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader_src = match &options.shader_override {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read shader override {}", path.display()))?,
            None => pipeline::EMBEDDED_SHADER.to_string(),
        };

        let camera = Camera::new(config.width, config.height);
        let controller = CameraController::new(CAMERA_SPEED, MOUSE_SENSITIVITY);

        let mut uniform = FractalUniform::new();
        uniform.set_resolution(config.width, config.height);
        uniform.set_colours(options.colour_a, options.colour_b);
        uniform.set_power(options.power);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fractal Uniform"),
            size: std::mem::size_of::<FractalUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = pipeline::create_bind_group_layout(&device);
        let bind_group = pipeline::create_bind_group(&device, &bind_group_layout, &uniform_buffer);
        let render_pipeline =
            pipeline::create_render_pipeline(&device, &bind_group_layout, config.format, &shader_src);
        let quad_buffer = pipeline::create_fullscreen_quad(&device);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline: render_pipeline,
            quad_buffer,
            uniform,
            uniform_buffer,
            bind_group,
            bind_group_layout,
            camera,
            controller,
            shader_src,
            start: Instant::now(),
            quality: options.quality,
            animated: options.animated,
            palette_index: None,
            colour_a: options.colour_a,
            colour_b: options.colour_b,
            screenshot_dir: options.screenshot_dir,
            screenshot_queued: false,
            mouse_pressed: false,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.camera.resize(new_size.width, new_size.height);
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Handle a window event, returning `true` when it was consumed.
    pub fn input(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(keycode) = event.physical_key else {
                    return false;
                };
                if self.controller.process_keyboard(keycode, event.state) {
                    return true;
                }
                if event.state == ElementState::Pressed && !event.repeat {
                    return self.handle_action_key(keycode);
                }
                false
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *button == MouseButton::Left {
                    self.mouse_pressed = *state == ElementState::Pressed;
                }
                true
            }
            _ => false,
        }
    }

    fn handle_action_key(&mut self, keycode: KeyCode) -> bool {
        match keycode {
            KeyCode::KeyR => {
                self.camera.reset();
                tracing::info!("camera reset to home pose");
            }
            KeyCode::Digit1 => self.set_quality(Quality::Low),
            KeyCode::Digit2 => self.set_quality(Quality::Medium),
            KeyCode::Digit3 => self.set_quality(Quality::High),
            KeyCode::KeyT => {
                self.animated = !self.animated;
                tracing::info!(animated = self.animated, "animation toggled");
            }
            KeyCode::KeyC => self.cycle_palette(),
            KeyCode::F2 => self.screenshot_queued = true,
            _ => return false,
        }
        true
    }

    fn set_quality(&mut self, quality: Quality) {
        if self.quality != quality {
            self.quality = quality;
            tracing::info!("quality set to {}", quality.label());
        }
    }

    fn cycle_palette(&mut self) {
        let next = self.palette_index.map_or(0, |i| (i + 1) % PALETTE.len());
        self.palette_index = Some(next);
        let (a, b) = PALETTE[next];
        self.colour_a = a;
        self.colour_b = b;
        tracing::info!(palette = next, "palette changed");
    }

    /// Apply a relative mouse motion while the left button is held.
    pub fn mouse_look(&mut self, delta_x: f64, delta_y: f64) {
        if self.mouse_pressed {
            self.controller
                .process_mouse(&mut self.camera, delta_x, delta_y);
        }
    }

    /// Advance the camera and refresh the uniform buffer for this frame.
    pub fn update(&mut self, dt: f32) {
        self.controller.update_camera(&mut self.camera, dt);
        self.uniform
            .update_view(&mut self.camera, self.start.elapsed().as_secs_f32());
        self.uniform.set_resolution(self.config.width, self.config.height);
        self.uniform.set_colours(self.colour_a, self.colour_b);
        self.uniform.animated = u32::from(self.animated);
        self.uniform.quality = self.quality.as_u32();
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniform));
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("enc") });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("rpass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.set_vertex_buffer(0, self.quad_buffer.slice(..));
            rpass.draw(0..6, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();

        if self.screenshot_queued {
            self.screenshot_queued = false;
            self.save_screenshot();
        }

        Ok(())
    }

    /// Re-render the current frame offscreen and write it out as a PNG.
    ///
    /// Failures are logged rather than propagated so a full disk or an
    /// unmappable buffer never takes the viewer down.
    fn save_screenshot(&self) {
        let capture_pipeline = pipeline::create_render_pipeline(
            &self.device,
            &self.bind_group_layout,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            &self.shader_src,
        );
        let result = capture::capture_frame(
            &self.device,
            &self.queue,
            &capture_pipeline,
            &self.bind_group,
            &self.quad_buffer,
            self.config.width,
            self.config.height,
        )
        .and_then(|image| capture::save_png(&image, &self.screenshot_dir));
        match result {
            Ok(path) => tracing::info!("screenshot saved to {}", path.display()),
            Err(e) => tracing::error!("screenshot failed: {e}"),
        }
    }

    /// Swap in a new shader from disk, keeping the old pipeline when the
    /// replacement fails validation.
    pub fn reload_shader(&mut self, path: &Path) -> Result<()> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read shader {}", path.display()))?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let new_pipeline = pipeline::create_render_pipeline(
            &self.device,
            &self.bind_group_layout,
            self.config.format,
            &src,
        );
        if let Some(error) = pollster::block_on(self.device.pop_error_scope()) {
            anyhow::bail!("shader rejected: {error}");
        }

        self.pipeline = new_pipeline;
        self.shader_src = src;
        tracing::info!("shader reloaded from {}", path.display());
        Ok(())
    }
}
