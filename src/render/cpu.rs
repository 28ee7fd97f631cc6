use crate::eval::evaluator::{EvaluatedCard, EvaluatedStage, TextLabel};
use crate::eval::layout::SwitchGeom;
use crate::foundation::core::{Affine, Canvas, Rgba8Premul, Vec2};
use crate::foundation::error::{StackError, StackResult};
use crate::render::backend::{FrameRGBA, RenderBackend};
use crate::render::text::{TextBrushRgba8, TextLayoutEngine};
use crate::scene::font::FontBytes;
use kurbo::{Circle, PathEl, Shape};
use std::collections::HashMap;
use std::sync::Arc;

const PATH_TOLERANCE: f64 = 0.1;

const PANEL_RGBA: [u8; 4] = [255, 255, 255, 235];
const TRACK_ON_RGBA: [u8; 4] = [52, 199, 89, 255];
const TRACK_OFF_RGBA: [u8; 4] = [233, 233, 234, 255];
const KNOB_RGBA: [u8; 4] = [255, 255, 255, 255];
const INDICATOR_RGBA: [u8; 4] = [0, 0, 0, 90];
/// Indicator alpha at the peak of a flash.
const INDICATOR_FLASH_ALPHA: u8 = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct GradientKey {
    top: [u8; 4],
    bottom: [u8; 4],
    w: u32,
    h: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_bits: u64,
    color: [u8; 4],
}

struct CpuFont {
    bytes: FontBytes,
    data: vello_cpu::peniko::FontData,
}

/// CPU backend powered by `vello_cpu`.
///
/// The render context, card gradients and shaped labels are cached across frames.
pub struct CpuBackend {
    ctx: Option<vello_cpu::RenderContext>,
    gradient_cache: HashMap<GradientKey, vello_cpu::Image>,
    text_engine: TextLayoutEngine,
    text_cache: HashMap<TextKey, Arc<parley::Layout<TextBrushRgba8>>>,
    font: Option<CpuFont>,
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuBackend {
    pub fn new() -> Self {
        Self {
            ctx: None,
            gradient_cache: HashMap::new(),
            text_engine: TextLayoutEngine::new(),
            text_cache: HashMap::new(),
            font: None,
        }
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> StackResult<R>,
    ) -> StackResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn draw_card(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        card: &EvaluatedCard,
    ) -> StackResult<()> {
        let rect = card.shape.rect();
        let (w, h) = (rect.width(), rect.height());
        if w <= 0.0 || h <= 0.0 {
            return Ok(());
        }
        let paint = self.gradient_paint(card.top, card.bottom, w.ceil() as u32, h.ceil() as u32)?;

        // Draw in card-local space so the gradient image lines up with the shape origin.
        let local = card.transform * Affine::translate(Vec2::new(rect.x0, rect.y0));
        let shape = kurbo::RoundedRect::from_rect(
            kurbo::Rect::new(0.0, 0.0, w, h),
            card.shape.radii(),
        );
        ctx.set_transform(affine_to_cpu(local));
        ctx.set_paint(paint);
        ctx.fill_path(&shape_to_cpu(&shape));
        Ok(())
    }

    fn gradient_paint(
        &mut self,
        top: Rgba8Premul,
        bottom: Rgba8Premul,
        w: u32,
        h: u32,
    ) -> StackResult<vello_cpu::Image> {
        let key = GradientKey {
            top: top.to_array(),
            bottom: bottom.to_array(),
            w,
            h,
        };
        if let Some(img) = self.gradient_cache.get(&key).cloned() {
            return Ok(img);
        }
        let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
        let h1 = (h.max(1) - 1) as f32;
        for y in 0..h {
            let t = if h1 <= 0.0 { 0.0 } else { (y as f32) / h1 };
            let c = top.lerp(bottom, t).to_array();
            let row = (y as usize) * (w as usize) * 4;
            for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&c);
            }
        }
        let img = rgba_premul_to_image(&bytes, w, h)?;
        self.gradient_cache.insert(key, img.clone());
        Ok(img)
    }

    fn text_layout(
        &mut self,
        label: &TextLabel,
        font: &FontBytes,
    ) -> StackResult<Arc<parley::Layout<TextBrushRgba8>>> {
        let key = TextKey {
            text: label.text.clone(),
            size_bits: label.size.to_bits(),
            color: label.color,
        };
        if let Some(layout) = self.text_cache.get(&key) {
            return Ok(Arc::clone(layout));
        }
        let layout = Arc::new(self.text_engine.layout_line(
            &label.text,
            font,
            label.size as f32,
            label.color.into(),
        )?);
        self.text_cache.insert(key, Arc::clone(&layout));
        Ok(layout)
    }

    fn cpu_font(&mut self, font: &FontBytes) -> vello_cpu::peniko::FontData {
        match &self.font {
            Some(f) if f.bytes == *font => f.data.clone(),
            _ => {
                // A different font invalidates every shaped label.
                self.text_cache.clear();
                let data = vello_cpu::peniko::FontData::new(
                    vello_cpu::peniko::Blob::from(font.as_slice().to_vec()),
                    0,
                );
                self.font = Some(CpuFont {
                    bytes: font.clone(),
                    data: data.clone(),
                });
                data
            }
        }
    }

    fn draw_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        label: &TextLabel,
        font: &FontBytes,
    ) -> StackResult<()> {
        let data = self.cpu_font(font);
        let layout = self.text_layout(label, font)?;
        let top = label.center_y - f64::from(layout.height()) / 2.0;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((label.x, top)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

impl RenderBackend for CpuBackend {
    fn render_stage(&mut self, stage: &EvaluatedStage, canvas: Canvas) -> StackResult<FrameRGBA> {
        let (width, height) = canvas.raster_size()?;

        self.with_ctx_mut(width, height, |this, ctx| {
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(color(stage.background));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(width),
                f64::from(height),
            ));

            for card in &stage.cards {
                this.draw_card(ctx, card)?;
            }

            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            if let Some(indicator) = &stage.indicator {
                ctx.set_paint(color(indicator_rgba(stage.indicator_flash)));
                ctx.fill_path(&shape_to_cpu(indicator));
            }

            ctx.set_paint(color(PANEL_RGBA));
            ctx.fill_path(&shape_to_cpu(&stage.panel));
            for switch in &stage.switches {
                draw_switch(ctx, switch);
            }

            if let Some(font) = &stage.font {
                for label in &stage.texts {
                    this.draw_text(ctx, label, font)?;
                }
            }

            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(FrameRGBA {
                width: canvas.width,
                height: canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }
}

fn indicator_rgba(flash: f64) -> [u8; 4] {
    let [r, g, b, a] = INDICATOR_RGBA;
    let boost = f64::from(INDICATOR_FLASH_ALPHA - a) * flash.clamp(0.0, 1.0);
    [r, g, b, a + boost.round() as u8]
}

fn draw_switch(ctx: &mut vello_cpu::RenderContext, switch: &SwitchGeom) {
    ctx.set_paint(color(if switch.on {
        TRACK_ON_RGBA
    } else {
        TRACK_OFF_RGBA
    }));
    ctx.fill_path(&shape_to_cpu(&switch.track));

    ctx.set_paint(color(KNOB_RGBA));
    ctx.fill_path(&shape_to_cpu(&Circle::new(
        switch.knob_center,
        switch.knob_radius,
    )));
}

fn color([r, g, b, a]: [u8; 4]) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(r, g, b, a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn shape_to_cpu(shape: &impl Shape) -> vello_cpu::kurbo::BezPath {
    let p = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);

    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in shape.path_elements(PATH_TOLERANCE) {
        match el {
            PathEl::MoveTo(a) => out.move_to(p(a)),
            PathEl::LineTo(a) => out.line_to(p(a)),
            PathEl::QuadTo(a, b) => out.quad_to(p(a), p(b)),
            PathEl::CurveTo(a, b, c) => out.curve_to(p(a), p(b), p(c)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StackResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StackError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StackError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StackError::render("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> StackResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}
