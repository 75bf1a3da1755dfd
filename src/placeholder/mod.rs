pub mod config;
pub mod font;
pub mod naming;
pub mod surface;

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use serde::Serialize;

use crate::error::PlaceholderError;
pub use config::{Color, ImageCategory, PlaceholderConfig};
pub use naming::{LOAD_FAILED_TEXT, file_name_from_url, placeholder_text};
pub use surface::{CommandRecorder, DrawCommand, DrawingSurface, RasterSurface};

pub const DEFAULT_OUTPUT_DIR: &str = "public/images/placeholders";
pub const DEFAULT_FILE_NAME: &str = "placeholder.png";

const BORDER_INSET: f32 = 5.0;
const BORDER_WIDTH: f32 = 3.0;
const LINE_HEIGHT_FACTOR: f32 = 1.5;

/// One line of placeholder text, positioned by its centre.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine<'a> {
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
}

/// Centres the `\n`-separated lines of `text` as a block on the surface.
pub fn layout_lines<'a>(config: &PlaceholderConfig, text: &'a str) -> Vec<TextLine<'a>> {
    let lines: Vec<&str> = text.split('\n').collect();
    let line_height = config.font_size * LINE_HEIGHT_FACTOR;
    let center_x = config.width as f32 / 2.0;
    let start_y = config.height as f32 / 2.0 - (lines.len() - 1) as f32 * line_height / 2.0;

    lines
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextLine {
            text,
            x: center_x,
            y: start_y + index as f32 * line_height,
        })
        .collect()
}

/// Draws the placeholder for `config` onto any surface.
pub fn draw_placeholder<S: DrawingSurface>(surface: &mut S, config: &PlaceholderConfig, text: &str) {
    let (width, height) = (config.width as f32, config.height as f32);

    surface.fill_rect(0.0, 0.0, width, height, config.background);
    surface.stroke_rect(
        BORDER_INSET,
        BORDER_INSET,
        width - 2.0 * BORDER_INSET,
        height - 2.0 * BORDER_INSET,
        BORDER_WIDTH,
        config.text_color,
    );

    for line in layout_lines(config, text) {
        surface.fill_text(line.text, line.x, line.y, config.font_size, config.text_color);
    }
}

/// A generated image paired with the name it would be downloaded as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedDataUrl {
    pub file_name: String,
    pub data_url: String,
}

/// Renders fallback images for the categories in the configuration table.
#[derive(Clone, Default)]
pub struct PlaceholderGenerator {
    font: Option<FontArc>,
}

impl std::fmt::Debug for PlaceholderGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderGenerator")
            .field("has_font", &self.font.is_some())
            .finish()
    }
}

fn label_for<'a>(config: &'a PlaceholderConfig, custom_text: Option<&'a str>) -> &'a str {
    custom_text.filter(|text| !text.is_empty()).unwrap_or(config.label)
}

impl PlaceholderGenerator {
    pub fn new(font: Option<FontArc>) -> Self {
        Self { font }
    }

    /// Generator using the configured font path or a discovered system font.
    pub fn with_font_path(font_path: Option<&Path>) -> Self {
        Self::new(font::discover_font(font_path))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Raster surface with the placeholder drawn, or `None` if no surface
    /// could be allocated.
    pub fn render_surface(&self, category: ImageCategory, custom_text: Option<&str>) -> Option<RasterSurface> {
        self.render_config(category.config(), custom_text)
    }

    /// Like [`render_surface`](Self::render_surface) for a config outside
    /// the category table.
    pub fn render_config(&self, config: &PlaceholderConfig, custom_text: Option<&str>) -> Option<RasterSurface> {
        let mut surface = RasterSurface::new(config.width, config.height, self.font.clone())?;
        draw_placeholder(&mut surface, config, label_for(config, custom_text));
        Some(surface)
    }

    pub fn render(&self, category: ImageCategory, custom_text: Option<&str>) -> Option<RgbaImage> {
        self.render_surface(category, custom_text)
            .map(RasterSurface::into_image)
    }

    /// The drawing routine as a replayable command list.
    pub fn commands(&self, category: ImageCategory, custom_text: Option<&str>) -> Vec<DrawCommand> {
        let config = category.config();
        let mut recorder = CommandRecorder::new();
        draw_placeholder(&mut recorder, config, label_for(config, custom_text));
        recorder.into_commands()
    }

    /// PNG data URL of the placeholder; empty when rendering is unavailable.
    pub fn data_url(&self, category: ImageCategory, custom_text: Option<&str>) -> String {
        self.data_url_for_config(category.config(), custom_text)
    }

    pub fn data_url_for_config(&self, config: &PlaceholderConfig, custom_text: Option<&str>) -> String {
        let (width, height) = (config.width, config.height);
        let Some(surface) = self.render_config(config, custom_text) else {
            tracing::warn!(width, height, "no drawing surface available for placeholder");
            return String::new();
        };
        match surface.encode_png() {
            Ok(bytes) => format!("data:image/png;base64,{}", STANDARD.encode(bytes)),
            Err(err) => {
                tracing::warn!(width, height, "failed to encode placeholder: {err}");
                String::new()
            }
        }
    }

    /// Writes the placeholder as PNG to `output` (or `placeholder.png`),
    /// creating parent directories. Returns the written path.
    pub fn save(
        &self,
        category: ImageCategory,
        custom_text: Option<&str>,
        output: Option<&Path>,
    ) -> Result<PathBuf, PlaceholderError> {
        let path = match output {
            Some(output) => {
                if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                    ensure_dir(parent)?;
                }
                output.to_path_buf()
            }
            None => PathBuf::from(DEFAULT_FILE_NAME),
        };

        let config = category.config();
        let surface = self
            .render_surface(category, custom_text)
            .ok_or(PlaceholderError::Surface {
                width: config.width,
                height: config.height,
            })?;
        surface.save_png(&path)?;

        tracing::debug!(%category, path = %path.display(), "saved placeholder");
        Ok(path)
    }

    /// One placeholder per URL, named `placeholder-<n>-<file name>.png`.
    pub fn batch_save(
        &self,
        urls: &[String],
        output_dir: &Path,
        category: ImageCategory,
    ) -> Result<Vec<PathBuf>, PlaceholderError> {
        ensure_dir(output_dir)?;

        urls.iter()
            .enumerate()
            .map(|(index, url)| {
                let file_name = file_name_from_url(url);
                let text = format!("{LOAD_FAILED_TEXT}\n{file_name}");
                let output = output_dir.join(batch_file_name(index, &file_name));
                self.save(category, Some(&text), Some(&output))
            })
            .collect()
    }

    /// Placeholder for a single failed URL, written as `<file name>.png`.
    pub fn save_for_url(
        &self,
        url: &str,
        output_dir: &Path,
        category: ImageCategory,
    ) -> Result<PathBuf, PlaceholderError> {
        ensure_dir(output_dir)?;

        let file_name = file_name_from_url(url);
        let text = format!("{LOAD_FAILED_TEXT}\n{file_name}");
        let output = output_dir.join(format!("{file_name}.png"));
        self.save(category, Some(&text), Some(&output))
    }

    /// In-memory counterpart of [`batch_save`](Self::batch_save).
    pub fn batch_data_urls(&self, urls: &[String], category: ImageCategory) -> Vec<NamedDataUrl> {
        urls.iter()
            .enumerate()
            .map(|(index, url)| {
                let file_name = file_name_from_url(url);
                let text = format!("{LOAD_FAILED_TEXT}\n{file_name}");
                NamedDataUrl {
                    file_name: batch_file_name(index, &file_name),
                    data_url: self.data_url(category, Some(&text)),
                }
            })
            .collect()
    }
}

fn batch_file_name(index: usize, file_name: &str) -> String {
    format!("placeholder-{}-{}.png", index + 1, file_name)
}

fn ensure_dir(path: &Path) -> Result<(), PlaceholderError> {
    std::fs::create_dir_all(path).map_err(|source| PlaceholderError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_is_vertically_centred() {
        let config = ImageCategory::Default.config();
        let lines = layout_lines(config, "图片加载失败");
        assert_eq!(lines, vec![TextLine { text: "图片加载失败", x: 150.0, y: 100.0 }]);
    }

    #[test]
    fn multi_line_block_is_centred() {
        // font 18 -> line height 27
        let config = ImageCategory::BookCover.config();
        let lines = layout_lines(config, "a\nb\nc");
        let ys: Vec<f32> = lines.iter().map(|l| l.y).collect();
        assert_eq!(ys, vec![150.0 - 27.0, 150.0, 150.0 + 27.0]);
        assert!(lines.iter().all(|l| l.x == 100.0));
    }

    #[test]
    fn empty_custom_text_uses_label() {
        let config = ImageCategory::Quote.config();
        assert_eq!(label_for(config, Some("")), "经典名句");
        assert_eq!(label_for(config, None), "经典名句");
        assert_eq!(label_for(config, Some("静夜思")), "静夜思");
    }

    #[test]
    fn commands_follow_the_drawing_routine() {
        let generator = PlaceholderGenerator::default();
        let commands = generator.commands(ImageCategory::Avatar, Some("张\n三"));
        let config = ImageCategory::Avatar.config();

        assert_eq!(commands.len(), 4);
        assert_eq!(
            commands[0],
            DrawCommand::FillRect { x: 0.0, y: 0.0, width: 120.0, height: 120.0, color: config.background }
        );
        assert_eq!(
            commands[1],
            DrawCommand::StrokeRect {
                x: 5.0,
                y: 5.0,
                width: 110.0,
                height: 110.0,
                line_width: 3.0,
                color: config.text_color,
            }
        );
        assert!(matches!(&commands[2], DrawCommand::FillText { text, .. } if text == "张"));
        assert!(matches!(&commands[3], DrawCommand::FillText { text, .. } if text == "三"));
    }

    #[test]
    fn data_url_has_png_prefix() {
        let url = PlaceholderGenerator::default().data_url(ImageCategory::Avatar, None);
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn data_url_is_empty_without_a_surface() {
        let generator = PlaceholderGenerator::default();
        let config = PlaceholderConfig {
            width: 0,
            ..ImageCategory::Default.config().clone()
        };
        assert_eq!(generator.data_url_for_config(&config, None), "");
        assert!(generator.render_config(&config, Some("x")).is_none());
    }

    #[test]
    fn batch_names_are_one_based() {
        assert_eq!(batch_file_name(0, "cover.jpg"), "placeholder-1-cover.jpg.png");
    }
}
