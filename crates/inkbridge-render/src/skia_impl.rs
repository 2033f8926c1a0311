//! CPU compositor built on tiny-skia.

use crate::renderer::{RenderContext, RenderResult, Renderer, RendererError};
use inkbridge_core::shapes::{Bitmap, Line, RasterImage, Shape, ShapeStyle};
use tiny_skia::{
    ColorU8, FilterQuality, IntSize, Paint, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Stroke, Transform,
};

/// Renders a canvas into an offscreen pixmap.
#[derive(Debug, Default)]
pub struct SkiaRenderer {
    frames: u64,
}

impl SkiaRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames rendered so far.
    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    fn draw_shape(&self, pixmap: &mut Pixmap, shape: &Shape, transform: Transform) -> RenderResult<()> {
        match shape {
            Shape::Line(line) => {
                draw_line(pixmap, line, transform);
                Ok(())
            }
            Shape::Group(group) => {
                for child in group.children() {
                    self.draw_shape(pixmap, child, transform)?;
                }
                Ok(())
            }
            Shape::Raster(image) => draw_raster(pixmap, image, transform),
        }
    }
}

impl Renderer for SkiaRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<Bitmap> {
        let (width, height) = ctx.pixel_size();
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RendererError::RenderFailed(format!("Cannot allocate {}x{} pixmap", width, height))
        })?;

        let bg = self.background_color(ctx).to_rgba8();
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));

        let scale = ctx.scale_factor as f32;
        let transform = Transform::from_scale(scale, scale);
        for shape in ctx.canvas.document.shapes_ordered() {
            if ctx.hidden.contains(&shape.id()) {
                continue;
            }
            self.draw_shape(&mut pixmap, shape, transform)?;
        }

        self.frames += 1;
        log::debug!("Rendered frame {} ({}x{})", self.frames, width, height);
        pixmap_to_bitmap(&pixmap)
    }
}

fn stroke_paint(style: &ShapeStyle) -> Paint<'static> {
    let color = style.stroke_with_opacity().to_rgba8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn draw_line(pixmap: &mut Pixmap, line: &Line, transform: Transform) {
    let mut pb = PathBuilder::new();
    pb.move_to(line.start.x as f32, line.start.y as f32);
    pb.line_to(line.end.x as f32, line.end.y as f32);
    // Zero-length segments produce no path.
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width: line.style.stroke_width as f32,
        ..Stroke::default()
    };
    pixmap.stroke_path(&path, &stroke_paint(&line.style), &stroke, transform, None);
}

fn draw_raster(pixmap: &mut Pixmap, image: &RasterImage, transform: Transform) -> RenderResult<()> {
    let source = image.source();
    if source.width() == 0 || source.height() == 0 {
        return Ok(());
    }
    let src = bitmap_to_pixmap(source)?;
    let unscaled = image.scale_x == 1.0 && image.scale_y == 1.0;
    let paint = PixmapPaint {
        opacity: image.style.opacity.clamp(0.0, 1.0) as f32,
        quality: if unscaled { FilterQuality::Nearest } else { FilterQuality::Bilinear },
        ..PixmapPaint::default()
    };
    let placement = transform
        .pre_translate(image.position.x as f32, image.position.y as f32)
        .pre_scale(image.scale_x as f32, image.scale_y as f32);
    pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, placement, None);
    Ok(())
}

/// Convert a straight-alpha bitmap into a premultiplied pixmap.
pub fn bitmap_to_pixmap(bitmap: &Bitmap) -> RenderResult<Pixmap> {
    let size = IntSize::from_wh(bitmap.width(), bitmap.height()).ok_or_else(|| {
        RendererError::RenderFailed(format!(
            "Invalid bitmap size {}x{}",
            bitmap.width(),
            bitmap.height()
        ))
    })?;
    Pixmap::from_vec(premultiply_alpha(bitmap.pixels()), size)
        .ok_or_else(|| RendererError::RenderFailed("Pixel buffer does not match size".into()))
}

/// Convert a premultiplied pixmap into a straight-alpha bitmap.
pub fn pixmap_to_bitmap(pixmap: &Pixmap) -> RenderResult<Bitmap> {
    Bitmap::from_rgba(unpremultiply_alpha(pixmap.pixels()), pixmap.width(), pixmap.height())
        .map_err(|e| RendererError::RenderFailed(e.to_string()))
}

fn premultiply_alpha(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| {
            let c = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

/// tiny-skia stores premultiplied alpha; bitmaps are straight alpha.
fn unpremultiply_alpha(pixels: &[PremultipliedColorU8]) -> Vec<u8> {
    pixels
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}
