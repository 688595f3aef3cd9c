//! Image decoding and GPU texture upload.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::error::FlycamError;

const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

/// Decode an image file into RGBA8. Row 0 stays the top row, which is what
/// wgpu addresses at v = 0.
pub fn try_load_rgba(path: &Path) -> Result<RgbaImage, FlycamError> {
    let image = image::open(path).map_err(|source| FlycamError::Texture {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Like [`try_load_rgba`], but a missing or broken file only costs a
/// warning and yields a checkerboard.
pub fn load_rgba(path: &Path) -> RgbaImage {
    match try_load_rgba(path) {
        Ok(image) => {
            tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "texture loaded");
            image
        }
        Err(err) => {
            tracing::warn!(%err, "using checkerboard texture instead");
            checkerboard(CHECKER_SIZE, CHECKER_CELL)
        }
    }
}

pub fn checkerboard(size: u32, cell: u32) -> RgbaImage {
    let cell = cell.max(1);
    RgbaImage::from_fn(size, size, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([255, 0, 255, 255])
        } else {
            Rgba([32, 32, 32, 255])
        }
    })
}

/// 1x1 image of a single color.
pub fn solid(rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(1, 1, Rgba(rgba))
}

pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl GpuTexture {
    /// Upload `image`. Color maps should be sRGB; data maps (specular) linear.
    pub fn from_image(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
        srgb: bool,
    ) -> Self {
        let (width, height) = image.dimensions();
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let format = if srgb {
            wgpu::TextureFormat::Rgba8UnormSrgb
        } else {
            wgpu::TextureFormat::Rgba8Unorm
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            image.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: super::render::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}
