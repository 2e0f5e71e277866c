// ============================================================================
// RETAINED MODE DRAWING
// ============================================================================
//
// UI code pushes `DrawCommand`s into a `Scene`, which is rasterized into the
// RGBA framebuffer by the software primitives at the bottom of this file.

use std::f64::consts::TAU;
use std::fs;
use std::path::{Path, PathBuf};

use rusttype::{point, Font, PositionedGlyph, Scale};
use tracing::{info, warn};

use crate::config::Color;
use crate::error::FontError;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Load `path`, or the first readable well-known system font.
pub fn load_font(path: Option<&Path>) -> Result<Font<'static>, FontError> {
    if let Some(path) = path {
        return read_font(path);
    }
    for candidate in FONT_CANDIDATES {
        let candidate = Path::new(candidate);
        if candidate.is_file() {
            match read_font(candidate) {
                Ok(font) => {
                    info!(path = %candidate.display(), "loaded label font");
                    return Ok(font);
                }
                Err(err) => warn!(%err, "skipping font candidate"),
            }
        }
    }
    Err(FontError::NotFound)
}

fn read_font(path: &Path) -> Result<Font<'static>, FontError> {
    let data = fs::read(path).map_err(|source| FontError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Font::try_from_vec(data).ok_or_else(|| FontError::Parse {
        path: PathBuf::from(path),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Debug)]
pub enum DrawCommand {
    Clear(Color),
    Wheel {
        cx: i32,
        cy: i32,
        r: i32,
        rotation: f64,
        colors: Vec<Color>,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        thickness: f32,
        color: Color,
        alpha: f32,
    },
    Disc {
        cx: i32,
        cy: i32,
        radius: i32,
        color: Color,
    },
    Ring {
        cx: i32,
        cy: i32,
        radius: i32,
        thickness: i32,
        color: Color,
    },
    Rect {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        color: Color,
        alpha: f32,
    },
    RectOutline {
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        thickness: i32,
        color: Color,
    },
    /// Triangle whose tip sits at (`tip_x`, `tip_y`) pointing left.
    Pointer {
        tip_x: i32,
        tip_y: i32,
        size: i32,
        color: Color,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        font_size: f32,
        color: Color,
        align: Align,
    },
    /// Text laid along a ray from the center, right-aligned at `end_radius`.
    RadialText {
        cx: i32,
        cy: i32,
        angle: f64,
        end_radius: f64,
        text: String,
        font_size: f32,
        color: Color,
    },
}

#[derive(Default)]
pub struct Scene {
    commands: Vec<DrawCommand>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_command(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Rasterize. Text is skipped when no font is available.
    pub fn render(&self, canvas: &mut Canvas, font: Option<&Font>) {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => canvas.clear(*color),
                DrawCommand::Wheel {
                    cx,
                    cy,
                    r,
                    rotation,
                    colors,
                } => render_wheel_immediate(canvas, *cx, *cy, *r, *rotation, colors),
                DrawCommand::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    thickness,
                    color,
                    alpha,
                } => draw_thick_line_aa(
                    canvas, *x0, *y0, *x1, *y1, *thickness, *color, *alpha,
                ),
                DrawCommand::Disc {
                    cx,
                    cy,
                    radius,
                    color,
                } => draw_circle(canvas, *cx, *cy, *radius, *color),
                DrawCommand::Ring {
                    cx,
                    cy,
                    radius,
                    thickness,
                    color,
                } => draw_ring(canvas, *cx, *cy, *radius, *thickness, *color),
                DrawCommand::Rect {
                    x,
                    y,
                    w,
                    h,
                    color,
                    alpha,
                } => fill_rect(canvas, *x, *y, *w, *h, *color, *alpha),
                DrawCommand::RectOutline {
                    x,
                    y,
                    w,
                    h,
                    thickness,
                    color,
                } => {
                    let t = *thickness;
                    fill_rect(canvas, *x, *y, *w, t, *color, 1.0);
                    fill_rect(canvas, *x, *y + *h - t, *w, t, *color, 1.0);
                    fill_rect(canvas, *x, *y, t, *h, *color, 1.0);
                    fill_rect(canvas, *x + *w - t, *y, t, *h, *color, 1.0);
                }
                DrawCommand::Pointer {
                    tip_x,
                    tip_y,
                    size,
                    color,
                } => draw_pointer(canvas, *tip_x, *tip_y, *size, *color),
                DrawCommand::Text {
                    x,
                    y,
                    text,
                    font_size,
                    color,
                    align,
                } => {
                    if let Some(font) = font {
                        draw_text(
                            canvas,
                            *x,
                            *y,
                            text,
                            font,
                            Scale::uniform(*font_size),
                            *color,
                            *align,
                        );
                    }
                }
                DrawCommand::RadialText {
                    cx,
                    cy,
                    angle,
                    end_radius,
                    text,
                    font_size,
                    color,
                } => {
                    if let Some(font) = font {
                        draw_radial_text(
                            canvas,
                            *cx,
                            *cy,
                            *angle,
                            *end_radius,
                            text,
                            font,
                            Scale::uniform(*font_size),
                            *color,
                        );
                    }
                }
            }
        }
    }
}

// ============================================================================
// CANVAS
// ============================================================================

pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: usize, height: usize) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        for chunk in self.frame.chunks_exact_mut(4) {
            chunk.copy_from_slice(&[color.r, color.g, color.b, 0xff]);
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        self.frame
            .get(idx..idx + 4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    fn blend(&mut self, x: i32, y: i32, color: Color, alpha: f32) {
        if x < 0 || y < 0 {
            return;
        }
        set_pixel(self.frame, self.width, x as usize, y as usize, color, alpha);
    }
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

pub fn calculate_text_width(text: &str, font: &Font, scale: Scale) -> i32 {
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, 0.0)).collect();
    let (min_x, max_x) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(min_x, max_x), bb| {
            (min_x.min(bb.min.x), max_x.max(bb.max.x))
        });
    if min_x < max_x {
        max_x - min_x
    } else {
        0
    }
}

// ============================================================================
// DRAWING PRIMITIVES
// ============================================================================

fn set_pixel(frame: &mut [u8], width: usize, x: usize, y: usize, color: Color, alpha: f32) {
    if x < width && y < frame.len() / (width * 4) {
        let idx = (y * width + x) * 4;
        let src = [color.r as f32, color.g as f32, color.b as f32];
        let a = alpha.clamp(0.0, 1.0);
        let out = [
            (src[0] * a + frame[idx] as f32 * (1.0 - a)).round() as u8,
            (src[1] * a + frame[idx + 1] as f32 * (1.0 - a)).round() as u8,
            (src[2] * a + frame[idx + 2] as f32 * (1.0 - a)).round() as u8,
            0xff,
        ];
        frame[idx..idx + 4].copy_from_slice(&out);
    }
}

/// All segments in one pass over the wheel's bounding box.
fn render_wheel_immediate(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    r: i32,
    rotation: f64,
    colors: &[Color],
) {
    if colors.is_empty() || r <= 0 {
        return;
    }
    let per_segment = TAU / colors.len() as f64;
    for y in (cy - r - 1)..=(cy + r + 1) {
        for x in (cx - r - 1)..=(cx + r + 1) {
            let dx = (x - cx) as f64;
            let dy = (y - cy) as f64;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > r as f64 + 1.0 {
                continue;
            }
            let aa = if dist > r as f64 {
                1.0 - (dist - r as f64).min(1.0)
            } else {
                1.0
            };
            let angle = dy.atan2(dx);
            let index = ((angle - rotation) / per_segment)
                .floor()
                .rem_euclid(colors.len() as f64) as usize;
            let color = colors[index.min(colors.len() - 1)];
            canvas.blend(x, y, color, aa as f32);
        }
    }
}

fn draw_thick_line_aa(
    canvas: &mut Canvas,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    thickness: f32,
    color: Color,
    alpha: f32,
) {
    let min_x = x0.min(x1) - thickness.ceil() as i32 - 1;
    let max_x = x0.max(x1) + thickness.ceil() as i32 + 1;
    let min_y = y0.min(y1) - thickness.ceil() as i32 - 1;
    let max_y = y0.max(y1) + thickness.ceil() as i32 + 1;
    let dx = (x1 - x0) as f32;
    let dy = (y1 - y0) as f32;
    let len_sq = (dx * dx + dy * dy).max(f32::EPSILON);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let px = x as f32 - x0 as f32;
            let py = y as f32 - y0 as f32;
            let t = ((px * dx + py * dy) / len_sq).clamp(0.0, 1.0);
            let lx = x0 as f32 + t * dx;
            let ly = y0 as f32 + t * dy;
            let dist = ((lx - x as f32).powi(2) + (ly - y as f32).powi(2)).sqrt();
            let aa = (1.0 - (dist - thickness / 2.0).clamp(0.0, 1.0)).clamp(0.0, 1.0);
            if aa > 0.01 {
                canvas.blend(x, y, color, aa * alpha);
            }
        }
    }
}

fn draw_circle(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, color: Color) {
    for y in -radius - 1..=radius + 1 {
        for x in -radius - 1..=radius + 1 {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = if dist > radius as f64 {
                1.0 - (dist - radius as f64).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.blend(cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

fn draw_ring(canvas: &mut Canvas, cx: i32, cy: i32, radius: i32, thickness: i32, color: Color) {
    let outer = radius as f64;
    let inner = (radius - thickness) as f64;
    for y in -radius - 1..=radius + 1 {
        for x in -radius - 1..=radius + 1 {
            let dist = ((x * x + y * y) as f64).sqrt();
            let aa = if dist > outer {
                1.0 - (dist - outer).min(1.0)
            } else if dist < inner {
                1.0 - (inner - dist).min(1.0)
            } else {
                1.0
            };
            if aa > 0.0 {
                canvas.blend(cx + x, cy + y, color, aa as f32);
            }
        }
    }
}

fn fill_rect(canvas: &mut Canvas, x: i32, y: i32, w: i32, h: i32, color: Color, alpha: f32) {
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + w).min(canvas.width as i32);
    let y1 = (y + h).min(canvas.height as i32);
    for py in y0..y1 {
        for px in x0..x1 {
            canvas.blend(px, py, color, alpha);
        }
    }
}

fn draw_pointer(canvas: &mut Canvas, tip_x: i32, tip_y: i32, size: i32, color: Color) {
    // Tip on the left, flat edge `size` pixels to the right.
    let size = size.max(1);
    for dy in -size..=size {
        for dx in 0..=size {
            let half_height = dx as f64 / 2.0;
            let edge = half_height - (dy as f64).abs();
            let aa = (edge + 0.5).clamp(0.0, 1.0);
            if aa > 0.0 {
                canvas.blend(tip_x + dx, tip_y + dy, color, aa as f32);
            }
        }
    }
}

fn draw_text(
    canvas: &mut Canvas,
    x: i32,
    y: i32,
    text: &str,
    font: &Font,
    scale: Scale,
    color: Color,
    align: Align,
) {
    let v_metrics = font.v_metrics(scale);
    let glyphs: Vec<PositionedGlyph> = font
        .layout(text, scale, point(0.0, v_metrics.ascent))
        .collect();
    let (min_x, max_x) = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .fold((i32::MAX, i32::MIN), |(min_x, max_x), bb| {
            (min_x.min(bb.min.x), max_x.max(bb.max.x))
        });
    let width_px = if min_x < max_x { max_x - min_x } else { 0 };
    let offset_x = match align {
        Align::Center => x - width_px / 2,
        Align::Left => x,
    };
    // Vertically center on the font's line box so baselines line up.
    let line_height = (v_metrics.ascent - v_metrics.descent).ceil() as i32;
    let offset_y = y - line_height / 2;
    for glyph in glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                let px = offset_x + gx as i32 + bb.min.x - min_x;
                let py = offset_y + gy as i32 + bb.min.y;
                canvas.blend(px, py, color, v);
            });
        }
    }
}

fn draw_radial_text(
    canvas: &mut Canvas,
    cx: i32,
    cy: i32,
    angle: f64,
    end_radius: f64,
    text: &str,
    font: &Font,
    scale: Scale,
    color: Color,
) {
    let glyphs: Vec<PositionedGlyph> = font.layout(text, scale, point(0.0, 0.0)).collect();
    if glyphs.is_empty() {
        return;
    }
    let width = calculate_text_width(text, font, scale) as f64;
    let start = end_radius - width;
    // Baseline sits a third of the em below the ray, like a centered label.
    let baseline = scale.y as f64 / 3.0;
    let (sin_a, cos_a) = angle.sin_cos();
    let first_x = glyphs
        .iter()
        .filter_map(|g| g.pixel_bounding_box())
        .map(|bb| bb.min.x)
        .min()
        .unwrap_or(0);

    for glyph in &glyphs {
        if let Some(bb) = glyph.pixel_bounding_box() {
            glyph.draw(|gx, gy, v| {
                if v > 0.001 {
                    let u = start + (gx as i32 + bb.min.x - first_x) as f64;
                    let w = baseline + (gy as i32 + bb.min.y) as f64;
                    let px = cx as f64 + u * cos_a - w * sin_a;
                    let py = cy as f64 + u * sin_a + w * cos_a;
                    draw_antialiased_pixel(canvas, px, py, color, v);
                }
            });
        }
    }
}

fn draw_antialiased_pixel(canvas: &mut Canvas, x: f64, y: f64, color: Color, alpha: f32) {
    let x_floor = x.floor() as i32;
    let y_floor = y.floor() as i32;
    let x_frac = x - x_floor as f64;
    let y_frac = y - y_floor as f64;

    // Bilinear spread over the 4 nearest pixels
    let samples = [
        (x_floor, y_floor, (1.0 - x_frac) * (1.0 - y_frac)),
        (x_floor + 1, y_floor, x_frac * (1.0 - y_frac)),
        (x_floor, y_floor + 1, (1.0 - x_frac) * y_frac),
        (x_floor + 1, y_floor + 1, x_frac * y_frac),
    ];

    for (px, py, weight) in samples {
        let final_alpha = alpha * weight as f32;
        if final_alpha > 0.001 {
            canvas.blend(px, py, color, final_alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::new(0xff, 0, 0);
    const BLUE: Color = Color::new(0, 0, 0xff);

    fn frame(w: usize, h: usize) -> Vec<u8> {
        vec![0; w * h * 4]
    }

    #[test]
    fn clear_fills_every_pixel_opaque() {
        let mut buf = frame(4, 3);
        let mut canvas = Canvas::new(&mut buf, 4, 3);
        canvas.clear(Color::new(1, 2, 3));
        assert_eq!(canvas.pixel(3, 2), Some([1, 2, 3, 0xff]));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn wheel_segments_follow_rotation() {
        let mut buf = frame(101, 101);
        let mut canvas = Canvas::new(&mut buf, 101, 101);
        let mut scene = Scene::new();
        scene.add_command(DrawCommand::Wheel {
            cx: 50,
            cy: 50,
            r: 40,
            rotation: 0.0,
            colors: vec![RED, BLUE],
        });
        scene.render(&mut canvas, None);
        // Segment 0 spans the lower half (angles 0..PI in screen space).
        assert_eq!(canvas.pixel(50, 70), Some([0xff, 0, 0, 0xff]));
        assert_eq!(canvas.pixel(50, 30), Some([0, 0, 0xff, 0xff]));
        // Outside the rim stays untouched.
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn shapes_clip_at_frame_edges() {
        let mut buf = frame(10, 10);
        let mut canvas = Canvas::new(&mut buf, 10, 10);
        let mut scene = Scene::new();
        scene.add_command(DrawCommand::Disc {
            cx: 0,
            cy: 0,
            radius: 6,
            color: RED,
        });
        scene.add_command(DrawCommand::Rect {
            x: -5,
            y: 8,
            w: 40,
            h: 40,
            color: BLUE,
            alpha: 1.0,
        });
        scene.add_command(DrawCommand::Pointer {
            tip_x: 8,
            tip_y: 2,
            size: 10,
            color: RED,
        });
        scene.render(&mut canvas, None);
        assert_eq!(canvas.pixel(1, 1), Some([0xff, 0, 0, 0xff]));
        assert_eq!(canvas.pixel(9, 9), Some([0, 0, 0xff, 0xff]));
    }

    #[test]
    fn half_alpha_blends() {
        let mut buf = frame(2, 2);
        let mut canvas = Canvas::new(&mut buf, 2, 2);
        canvas.clear(Color::new(0, 0, 0));
        let mut scene = Scene::new();
        scene.add_command(DrawCommand::Rect {
            x: 0,
            y: 0,
            w: 1,
            h: 1,
            color: Color::new(200, 100, 0),
            alpha: 0.5,
        });
        scene.render(&mut canvas, None);
        assert_eq!(canvas.pixel(0, 0), Some([100, 50, 0, 0xff]));
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 0xff]));
    }

    #[test]
    fn text_is_skipped_without_font() {
        let mut buf = frame(8, 8);
        let mut canvas = Canvas::new(&mut buf, 8, 8);
        let mut scene = Scene::new();
        scene.add_command(DrawCommand::Text {
            x: 4,
            y: 4,
            text: "Ava".into(),
            font_size: 12.0,
            color: RED,
            align: Align::Center,
        });
        scene.render(&mut canvas, None);
        assert!((0..8).all(|y| (0..8).all(|x| canvas.pixel(x, y) == Some([0, 0, 0, 0]))));
    }

    #[test]
    fn explicit_missing_font_path_is_an_io_error() {
        let result = load_font(Some(Path::new("/definitely/not/here.ttf")));
        assert!(matches!(result, Err(FontError::Io { .. })));
    }
}
