//! GPU-backed window surface: winit window + vello renderer.
//!
//! Implements `DrawSurface` by accumulating rectangles into a vello `Scene`
//! between `begin_frame` and `present`, then rendering the scene to the
//! swapchain. The whole value can live behind the secondary's redraw lock
//! and be driven from the listener thread.

use std::sync::Arc;

use anyhow::{Context, Result};
use vello::kurbo::{Affine, Rect};
use vello::peniko::{Color, Fill};
use vello::util::{RenderContext, RenderSurface};
use vello::wgpu;
use vello::{AaConfig, Renderer, RendererOptions, Scene};
use winit::window::Window;

use crate::palette::Rgb;
use crate::render::DrawSurface;

pub struct GpuSurface {
    context: RenderContext,
    renderer: Renderer,
    surface: RenderSurface<'static>,
    scene: Scene,
    window: Arc<Window>,
}

impl GpuSurface {
    /// Create the render surface for an already-open window. Failure here is
    /// fatal to the owning process.
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let mut context = RenderContext::new();
        let size = window.inner_size();

        let surface = pollster::block_on(context.create_surface(
            window.clone(),
            size.width,
            size.height,
            wgpu::PresentMode::AutoVsync,
        ))
        .context("creating render surface")?;

        let renderer = Renderer::new(
            &context.devices[surface.dev_id].device,
            RendererOptions::default(),
        )
        .context("creating vello renderer")?;

        Ok(Self {
            context,
            renderer,
            surface,
            scene: Scene::new(),
            window,
        })
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width != 0 && height != 0 {
            self.context.resize_surface(&mut self.surface, width, height);
        }
    }
}

fn to_color(c: Rgb) -> Color {
    Color::from_rgb8(c.r(), c.g(), c.b())
}

impl DrawSurface for GpuSurface {
    fn begin_frame(&mut self) {
        self.scene.reset();
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Rgb) {
        let rect = Rect::new(x, y, x + w, y + h);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, to_color(color), None, &rect);
    }

    fn present(&mut self) -> Result<()> {
        let device_handle = &self.context.devices[self.surface.dev_id];

        self.renderer
            .render_to_texture(
                &device_handle.device,
                &device_handle.queue,
                &self.scene,
                &self.surface.target_view,
                &vello::RenderParams {
                    base_color: Color::BLACK,
                    width: self.surface.config.width,
                    height: self.surface.config.height,
                    antialiasing_method: AaConfig::Msaa16,
                },
            )
            .context("rendering to surface texture")?;

        let surface_texture = self
            .surface
            .surface
            .get_current_texture()
            .context("acquiring surface texture")?;

        let mut encoder =
            device_handle
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Surface Blit"),
                });
        self.surface.blitter.copy(
            &device_handle.device,
            &mut encoder,
            &self.surface.target_view,
            &surface_texture
                .texture
                .create_view(&wgpu::TextureViewDescriptor::default()),
        );
        device_handle.queue.submit([encoder.finish()]);
        surface_texture.present();
        device_handle
            .device
            .poll(wgpu::PollType::Poll)
            .context("polling device")?;

        Ok(())
    }
}
