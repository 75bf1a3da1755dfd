use std::io::Cursor;
use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale};
use image::{DynamicImage, ImageFormat, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

use crate::error::PlaceholderError;
use crate::placeholder::config::Color;

/// Minimal 2D drawing API the placeholder layout is written against.
///
/// Coordinates follow canvas conventions: `fill_text` takes the centre of the
/// text box, `stroke_rect` strokes along the rectangle path so the line
/// straddles it.
pub trait DrawingSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Color);

    fn fill_text(&mut self, text: &str, center_x: f32, center_y: f32, font_size: f32, color: Color);
}

/// Pixel backend producing PNG output.
pub struct RasterSurface {
    canvas: RgbaImage,
    font: Option<FontArc>,
}

impl RasterSurface {
    /// Returns `None` when no pixel buffer can be allocated for the size.
    pub fn new(width: u32, height: u32, font: Option<FontArc>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let len = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if len > isize::MAX as usize {
            return None;
        }
        Some(Self {
            canvas: RgbaImage::new(width, height),
            font,
        })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn into_image(self) -> RgbaImage {
        self.canvas
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, PlaceholderError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(self.canvas.clone())
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn save_png(&self, path: &Path) -> Result<(), PlaceholderError> {
        self.canvas
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| PlaceholderError::Write {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Pixel scale whose em square matches `font_size` CSS pixels.
fn em_scale(font: &FontArc, font_size: f32) -> PxScale {
    match font.units_per_em() {
        Some(units_per_em) if units_per_em > 0.0 => {
            PxScale::from(font_size * font.height_unscaled() / units_per_em)
        }
        _ => PxScale::from(font_size),
    }
}

impl DrawingSurface for RasterSurface {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x.round() as i32, y.round() as i32)
            .of_size(width.round() as u32, height.round() as u32);
        draw_filled_rect_mut(&mut self.canvas, rect, color.to_rgba());
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Color) {
        let passes = line_width.round().max(1.0) as i32;
        let outset = passes / 2;
        let (x, y) = (x.round() as i32, y.round() as i32);
        let (width, height) = (width.round() as i32, height.round() as i32);

        for pass in 0..passes {
            let shift = outset - pass;
            let w = width + 2 * shift;
            let h = height + 2 * shift;
            if w <= 0 || h <= 0 {
                break;
            }
            let rect = Rect::at(x - shift, y - shift).of_size(w as u32, h as u32);
            draw_hollow_rect_mut(&mut self.canvas, rect, color.to_rgba());
        }
    }

    fn fill_text(&mut self, text: &str, center_x: f32, center_y: f32, font_size: f32, color: Color) {
        let Some(font) = &self.font else {
            tracing::trace!(text, "no font available, skipping text");
            return;
        };
        if text.is_empty() {
            return;
        }
        let scale = em_scale(font, font_size);
        let (w, h) = text_size(scale, font, text);
        let left = (center_x - w as f32 / 2.0).round() as i32;
        let top = (center_y - h as f32 / 2.0).round() as i32;
        draw_text_mut(&mut self.canvas, color.to_rgba(), left, top, scale, font, text);
    }
}

/// A recorded drawing operation, replayable on a host canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawCommand {
    #[serde(rename_all = "camelCase")]
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    #[serde(rename_all = "camelCase")]
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Color,
    },
    #[serde(rename_all = "camelCase")]
    FillText {
        text: String,
        x: f32,
        y: f32,
        font_size: f32,
        color: Color,
    },
}

/// Backend that only records what would have been drawn.
#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }
}

impl DrawingSurface for CommandRecorder {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, line_width: f32, color: Color) {
        self.commands.push(DrawCommand::StrokeRect {
            x,
            y,
            width,
            height,
            line_width,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, center_x: f32, center_y: f32, font_size: f32, color: Color) {
        self.commands.push(DrawCommand::FillText {
            text: text.to_string(),
            x: center_x,
            y: center_y,
            font_size,
            color,
        });
    }
}
