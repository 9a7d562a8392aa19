//! Frame capture and PNG export
//!
//! Screenshots render the current scene into an offscreen texture, copy it
//! into a mappable buffer and strip the row padding wgpu requires for
//! texture-to-buffer copies before handing the pixels to the PNG encoder.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use thiserror::Error;

use crate::state::CLEAR_COLOUR;

/// Errors produced while reading back or encoding a frame
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("readback channel closed before the map completed")]
    ChannelClosed,
    #[error("captured frame had unexpected dimensions")]
    BadDimensions,
    #[error("failed to write png: {0}")]
    Image(#[from] image::ImageError),
}

/// Round a row of rgba8 pixels up to the copy alignment wgpu demands.
pub fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 4;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Strip per-row copy padding, returning tightly packed rgba8 data.
pub fn unpad_rows(data: &[u8], width: u32, height: u32, padded_bytes_per_row: u32) -> Vec<u8> {
    let row_bytes = (width * 4) as usize;
    let padded = padded_bytes_per_row as usize;
    let mut pixels = vec![0u8; row_bytes * height as usize];
    for (row_idx, chunk) in pixels.chunks_mut(row_bytes).enumerate() {
        let start = row_idx * padded;
        chunk.copy_from_slice(&data[start..start + row_bytes]);
    }
    pixels
}

/// Render one frame offscreen and read it back as an image.
///
/// The pipeline must target `Rgba8UnormSrgb`; the caller builds it from
/// the same shader source as the swapchain pipeline.
pub fn capture_frame(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
    quad: &wgpu::Buffer,
    width: u32,
    height: u32,
) -> Result<RgbaImage, CaptureError> {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Capture Target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bytes_per_row = padded_bytes_per_row(width);
    let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Capture Readback"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder =
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("capture") });
    {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("capture pass"),
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
        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        rpass.set_vertex_buffer(0, quad.slice(..));
        rpass.draw(0..6, 0..1);
    }
    encoder.copy_texture_to_buffer(
        texture.as_image_copy(),
        wgpu::ImageCopyBuffer {
            buffer: &output_buffer,
            layout: wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(Some(encoder.finish()));

    let slice = output_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::Maintain::Wait);
    rx.recv().map_err(|_| CaptureError::ChannelClosed)??;

    let pixels = {
        let data = slice.get_mapped_range();
        unpad_rows(&data, width, height, bytes_per_row)
    };
    output_buffer.unmap();

    RgbaImage::from_raw(width, height, pixels).ok_or(CaptureError::BadDimensions)
}

/// Write an image to a timestamped PNG inside `dir`, returning the path.
pub fn save_png(image: &RgbaImage, dir: &Path) -> Result<PathBuf, CaptureError> {
    let name = chrono::Local::now()
        .format("mandelbulb-%Y%m%d-%H%M%S.png")
        .to_string();
    let path = dir.join(name);
    image.save(&path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_padded_to_copy_alignment() {
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        assert_eq!(padded_bytes_per_row(64), 256);
        assert_eq!(padded_bytes_per_row(1), align);
        assert_eq!(padded_bytes_per_row(65), 512);
        // Already aligned widths pass through untouched.
        assert_eq!(padded_bytes_per_row(128), 512);
    }

    #[test]
    fn unpad_strips_per_row_slack() {
        // Two rows of a 3 pixel wide image padded out to 16 bytes per row.
        let mut data = vec![0u8; 32];
        for (i, b) in data[0..12].iter_mut().enumerate() {
            *b = i as u8;
        }
        for (i, b) in data[16..28].iter_mut().enumerate() {
            *b = 100 + i as u8;
        }
        let pixels = unpad_rows(&data, 3, 2, 16);
        assert_eq!(pixels.len(), 24);
        assert_eq!(&pixels[0..12], &data[0..12]);
        assert_eq!(&pixels[12..24], &data[16..28]);
    }

    #[test]
    fn unpad_is_identity_for_tight_rows() {
        let data: Vec<u8> = (0..64u8).collect();
        // 4 pixels wide, 4 rows, no padding.
        assert_eq!(unpad_rows(&data, 4, 4, 16), data);
    }
}
