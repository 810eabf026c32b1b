//! Export compositor
//!
//! Rebuilds the marked-up photo at its original resolution. The photo is
//! decoded again from the source bytes and the annotations are reproduced
//! on a full-resolution layer, either by replaying the retained records or
//! by resampling the display layer. Nothing here touches the live session,
//! so [`compose`] can run on a worker thread.

use std::io::Cursor;
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, RgbaImage};
use redline_config::{ExportStrategy, ResampleFilter};
use tracing::{debug, info};

use crate::annotations::Annotation;
use crate::constants::DEFAULT_TILE_SIZE;
use crate::error::ExportError;
use crate::mapping::ViewportScale;
use crate::raster::TiledSurface;
use crate::source::{SourceImage, extension_for, parse_format};

/// Everything an export needs, owned so it can move to a worker
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: SourceImage,
    pub scale: ViewportScale,
    /// Committed records, oldest first
    pub annotations: Vec<Arc<Annotation>>,
    /// Display-resolution annotation layer; required by `Resample`
    pub layer: Option<RgbaImage>,
    pub strategy: ExportStrategy,
    pub filter: ResampleFilter,
    /// Requested output format; `None` keeps the source format
    pub format: Option<String>,
    pub jpeg_quality: u8,
}

/// Encoded export result
#[derive(Debug, Clone)]
pub struct ExportedImage {
    pub data: Arc<[u8]>,
    pub mime_type: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// Compose and encode the full-resolution output.
///
/// Atomic: on error no bytes are produced.
pub fn compose(request: ExportRequest) -> Result<ExportedImage, ExportError> {
    let format = output_format(&request)?;

    let mut photo = request
        .source
        .decode()
        .map_err(|e| ExportError::Decode(e.to_string()))?
        .to_rgba8();
    let (width, height) = photo.dimensions();

    let layer = render(&request, width, height)?;
    imageops::overlay(&mut photo, &layer, 0, 0);
    drop(layer);

    let data = encode(photo, format, request.jpeg_quality)?;
    let file_name = request.source.edited_file_name(extension_for(format));
    info!(
        "Exported {} ({}x{}, {} bytes)",
        file_name,
        width,
        height,
        data.len()
    );

    Ok(ExportedImage {
        data: data.into(),
        mime_type: format.to_mime_type().to_string(),
        file_name,
        width,
        height,
    })
}

fn output_format(request: &ExportRequest) -> Result<ImageFormat, ExportError> {
    let format = match request.format.as_deref() {
        Some(name) => {
            parse_format(name).ok_or_else(|| ExportError::UnsupportedFormat(name.to_string()))?
        }
        None => request.source.format(),
    };
    if !format.writing_enabled() {
        return Err(ExportError::UnsupportedFormat(format!("{format:?}")));
    }
    Ok(format)
}

/// Reproduce the annotations on a transparent layer of the given size
pub fn render(
    request: &ExportRequest,
    width: u32,
    height: u32,
) -> Result<RgbaImage, ExportError> {
    match request.strategy {
        ExportStrategy::Replay => Ok(replay(request, width, height)),
        ExportStrategy::Resample => {
            let layer = request.layer.as_ref().ok_or_else(|| {
                ExportError::Worker("resample export without an annotation layer".to_string())
            })?;
            Ok(resample(layer, width, height, request.filter))
        }
    }
}

/// Redraw every record with positions mapped to source pixels and widths
/// multiplied by `1/s`
fn replay(request: &ExportRequest, width: u32, height: u32) -> RgbaImage {
    let (display_width, display_height) = request.scale.display_size();
    let factors = glam::Vec2::new(
        width as f32 / display_width as f32,
        height as f32 / display_height as f32,
    );
    let width_factor = request.scale.width_to_natural(1.0);
    debug!(
        "replay: {} records, factors=({:.4}, {:.4}), width x{:.4}",
        request.annotations.len(),
        factors.x,
        factors.y,
        width_factor
    );

    let mut layer = TiledSurface::new(width, height, DEFAULT_TILE_SIZE);
    for record in &request.annotations {
        layer.draw_annotation(&record.scaled(factors, width_factor));
    }
    layer.surface.into_image()
}

/// Upscale a straight-alpha layer without dark fringes
pub fn resample(layer: &RgbaImage, width: u32, height: u32, filter: ResampleFilter) -> RgbaImage {
    if layer.dimensions() == (width, height) {
        return layer.clone();
    }
    let mut premultiplied = layer.clone();
    premultiply(&mut premultiplied);
    let mut scaled = imageops::resize(&premultiplied, width, height, filter_type(filter));
    unpremultiply(&mut scaled);
    scaled
}

fn premultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel.0[3] as u32;
        for c in 0..3 {
            pixel.0[c] = ((pixel.0[c] as u32 * a + 127) / 255) as u8;
        }
    }
}

fn unpremultiply(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let a = pixel.0[3] as u32;
        if a == 0 {
            pixel.0 = [0, 0, 0, 0];
            continue;
        }
        for c in 0..3 {
            pixel.0[c] = ((pixel.0[c] as u32 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

pub(crate) fn filter_type(filter: ResampleFilter) -> FilterType {
    match filter {
        ResampleFilter::Nearest => FilterType::Nearest,
        ResampleFilter::Triangle => FilterType::Triangle,
        ResampleFilter::CatmullRom => FilterType::CatmullRom,
        ResampleFilter::Gaussian => FilterType::Gaussian,
        ResampleFilter::Lanczos3 => FilterType::Lanczos3,
    }
}

/// Serialize the composited image
fn encode(image: RgbaImage, format: ImageFormat, jpeg_quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    let mut cursor = Cursor::new(&mut bytes);
    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut cursor, jpeg_quality.clamp(1, 100));
            encoder
                .encode_image(&rgb)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
        _ => {
            DynamicImage::ImageRgba8(image)
                .write_to(&mut cursor, format)
                .map_err(|e| ExportError::Encode(e.to_string()))?;
        }
    }
    Ok(bytes)
}
