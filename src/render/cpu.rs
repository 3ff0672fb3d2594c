//! Reference CPU rasterizer for the stage display tree.

use std::{collections::HashMap, sync::Arc};

use kurbo::Shape;

use crate::{
    assets::store::PreparedImage,
    foundation::{
        core::{Affine, Rgba8, Size, StageSize, Vec2},
        error::{StageError, StageResult},
    },
    stage::node::{ColorMatrix, DisplayNode, NodeContent},
};

/// Rendered pixels, row-major RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

const MODEL_BODY: Rgba8 = Rgba8::opaque(214, 208, 230);
const MODEL_SPEAKING: Rgba8 = Rgba8::opaque(250, 236, 196);
const PARTICLE: Rgba8 = Rgba8::WHITE.with_alpha(170);
const PARTICLES: usize = 24;
/// Seconds per loop of a persistent effect.
const EFFECT_PERIOD: f64 = 2.0;

/// Walks a [`DisplayNode`] tree into premultiplied RGBA8 with `vello_cpu`.
///
/// Text is drawn as per-character placeholder blocks, models as silhouettes, and effects as a
/// deterministic particle field; color-matrix filters apply to these fills, not to images.
#[derive(Debug, Default)]
pub struct CpuStageRenderer {
    clear: Option<Rgba8>,
    image_cache: HashMap<usize, vello_cpu::Image>,
}

impl CpuStageRenderer {
    pub fn new() -> Self {
        Self {
            clear: Some(Rgba8::BLACK),
            image_cache: HashMap::new(),
        }
    }

    /// `None` leaves the frame transparent where nothing draws.
    pub fn with_clear(mut self, clear: Option<Rgba8>) -> Self {
        self.clear = clear;
        self
    }

    pub fn render(&mut self, root: &DisplayNode, stage: StageSize) -> StageResult<FrameRGBA> {
        let width = pixel_dim(stage.width, "stage width")?;
        let height = pixel_dim(stage.height, "stage height")?;
        let mut ctx = vello_cpu::RenderContext::new(width, height);
        if let Some(clear) = self.clear {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color(clear));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));
        }

        self.draw_node(&mut ctx, root, Affine::IDENTITY, None)?;

        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        ctx.render_to_pixmap(&mut pixmap);
        Ok(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn draw_node(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        node: &DisplayNode,
        parent: Affine,
        inherited: Option<ColorMatrix>,
    ) -> StageResult<()> {
        let alpha = node.alpha();
        if !node.visible() || alpha <= 0.0 {
            return Ok(());
        }
        let transform = parent
            * Affine::translate(node.position().to_vec2())
            * Affine::scale(node.scale());
        // The nearest filter wins.
        let filter = node.filter().or(inherited);

        let layered = alpha < 1.0;
        if layered {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.push_opacity_layer(alpha as f32);
        }
        self.draw_content(ctx, &node.content(), transform, filter)?;
        for child in node.children() {
            self.draw_node(ctx, &child, transform, filter)?;
        }
        if layered {
            ctx.pop_layer();
        }
        Ok(())
    }

    fn draw_content(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        content: &NodeContent,
        transform: Affine,
        filter: Option<ColorMatrix>,
    ) -> StageResult<()> {
        let tint = |c: Rgba8| filter.map_or(c, |m| m.apply(c));
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(affine_to_cpu(transform));
        match content {
            NodeContent::Empty => {}
            NodeContent::Rect { size, color: c } => {
                ctx.set_paint(color(tint(*c)));
                ctx.fill_rect(&rect(*size));
            }
            NodeContent::Image { image, size } => {
                if image.width == 0 || image.height == 0 {
                    return Ok(());
                }
                let paint = self.image_paint_for(image)?;
                let (w, h) = (f64::from(image.width), f64::from(image.height));
                let fit = Affine::scale_non_uniform(size.width / w, size.height / h);
                ctx.set_transform(affine_to_cpu(transform * fit));
                ctx.set_paint(paint);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
            }
            NodeContent::Text {
                text,
                visible_chars,
                font_size,
                color: c,
                size,
            } => {
                ctx.set_paint(color(tint(*c)));
                for block in text_blocks(text, *visible_chars, *font_size, *size) {
                    ctx.fill_rect(&block);
                }
            }
            NodeContent::Model { speaking, size, .. } => {
                let body = if *speaking { MODEL_SPEAKING } else { MODEL_BODY };
                ctx.set_paint(color(tint(body)));
                let head_r = size.width * 0.22;
                let head = kurbo::Ellipse::new(
                    (size.width / 2.0, head_r * 1.1),
                    (head_r, head_r * 1.1),
                    0.0,
                );
                ctx.fill_path(&to_cpu_path(&head));
                let torso = kurbo::RoundedRect::new(
                    size.width * 0.15,
                    head_r * 2.3,
                    size.width * 0.85,
                    size.height,
                    size.width * 0.12,
                );
                ctx.fill_path(&to_cpu_path(&torso));
            }
            NodeContent::Effect {
                name,
                started_at,
                progress,
                size,
            } => {
                let phase = progress.unwrap_or_else(|| {
                    (started_at.elapsed().as_secs_f64() / EFFECT_PERIOD).fract()
                });
                ctx.set_paint(color(tint(PARTICLE)));
                for p in particles(name, phase, *size) {
                    ctx.fill_rect(&p);
                }
            }
        }
        Ok(())
    }

    fn image_paint_for(&mut self, image: &PreparedImage) -> StageResult<vello_cpu::Image> {
        let key = Arc::as_ptr(&image.rgba8_premul) as usize;
        if let Some(paint) = self.image_cache.get(&key) {
            return Ok(paint.clone());
        }
        let pixmap =
            image_premul_bytes_to_pixmap(image.rgba8_premul.as_slice(), image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        self.image_cache.insert(key, paint.clone());
        Ok(paint)
    }
}

fn pixel_dim(v: f64, what: &str) -> StageResult<u16> {
    let px = v.round();
    if !(1.0..=f64::from(u16::MAX)).contains(&px) {
        return Err(StageError::validation(format!("{what} out of range: {v}")));
    }
    Ok(px as u16)
}

fn color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect(size: Size) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(0.0, 0.0, size.width, size.height)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn to_cpu_path(shape: &impl Shape) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(0.1) {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// One block per visible character, wrapped to `size.width`.
fn text_blocks(
    text: &str,
    visible: usize,
    font_size: f64,
    size: Size,
) -> Vec<vello_cpu::kurbo::Rect> {
    let font_size = if font_size > 0.0 { font_size } else { 16.0 };
    let advance = font_size * 0.6;
    let line = font_size * 1.3;
    let mut out = Vec::new();
    let mut pen = Vec2::ZERO;
    for ch in text.chars().take(visible) {
        if ch == '\n' {
            pen = Vec2::new(0.0, pen.y + line);
            continue;
        }
        if size.width > 0.0 && pen.x + advance > size.width {
            pen = Vec2::new(0.0, pen.y + line);
        }
        if !ch.is_whitespace() {
            out.push(vello_cpu::kurbo::Rect::new(
                pen.x,
                pen.y + font_size * 0.2,
                pen.x + advance * 0.8,
                pen.y + font_size,
            ));
        }
        pen.x += advance;
    }
    out
}

/// Deterministic particle squares for effect `name` at `phase` in `0..=1`.
fn particles(name: &str, phase: f64, size: Size) -> Vec<vello_cpu::kurbo::Rect> {
    let seed = name
        .bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(u32::from(b)));
    let offset = f64::from(seed % 1000) / 1000.0;
    let side = (size.width.min(size.height) * 0.01).max(2.0);
    (0..PARTICLES)
        .map(|i| {
            let i = i as f64;
            let x = (offset + i * 0.618_034).fract() * size.width;
            let y = (i * 0.371 + phase).fract() * size.height;
            vello_cpu::kurbo::Rect::new(x, y, x + side, y + side)
        })
        .collect()
}

fn image_premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StageResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StageError::asset("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StageError::asset("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StageError::asset("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
