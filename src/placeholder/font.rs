use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc};

use crate::placeholder::config::ImageCategory;
use crate::placeholder::naming::LOAD_FAILED_TEXT;

/// Well-known locations of fonts that cover CJK labels.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
];

pub fn load_font_file(path: &Path) -> anyhow::Result<FontArc> {
    let bytes = std::fs::read(path)?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| anyhow::anyhow!("Failed to parse font {}: {}", path.display(), e))
}

/// Whether `font` has glyphs for every category label and the load failure
/// text. Fonts without them would draw missing-glyph boxes.
pub fn covers_labels(font: &FontArc) -> bool {
    ImageCategory::ALL
        .iter()
        .flat_map(|category| category.config().label.chars())
        .chain(LOAD_FAILED_TEXT.chars())
        .all(|c| font.glyph_id(c).0 != 0)
}

/// Loads the explicitly configured font, or the first usable system font.
/// Only fonts that can draw the placeholder labels are accepted.
///
/// Returns `None` when nothing qualifies; placeholders are then drawn
/// without their text.
pub fn discover_font(configured: Option<&Path>) -> Option<FontArc> {
    let candidates = configured
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

    let font = first_covering_font(candidates);
    if font.is_none() {
        tracing::warn!("no usable font found, placeholder text will not be rendered");
    }
    font
}

fn first_covering_font(candidates: impl IntoIterator<Item = PathBuf>) -> Option<FontArc> {
    for path in candidates {
        if !path.exists() {
            continue;
        }
        match load_font_file(&path) {
            Ok(font) if covers_labels(&font) => {
                tracing::debug!(path = %path.display(), "loaded placeholder font");
                return Some(font);
            }
            Ok(_) => tracing::warn!(path = %path.display(), "skipping font without CJK glyphs"),
            Err(err) => tracing::warn!(path = %path.display(), "skipping font: {err:#}"),
        }
    }
    None
}
