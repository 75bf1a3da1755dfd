use std::collections::HashMap;
use std::path::PathBuf;

use ab_glyph::FontArc;
use guoxue::placeholder::font::discover_font;
use guoxue::router::session::{LOGGED_IN_KEY, ONBOARDING_COMPLETED_KEY};
use guoxue::router::{Router, SessionState, StaticViewLoader, classic_routes};
use image::{Rgba, RgbaImage};

/// Persisted storage as the login/onboarding flows would leave it.
pub fn storage(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn anonymous_storage() -> HashMap<String, String> {
    storage(&[])
}

pub fn fresh_user_storage() -> HashMap<String, String> {
    storage(&[(LOGGED_IN_KEY, "true")])
}

pub fn onboarded_user_storage() -> HashMap<String, String> {
    storage(&[(LOGGED_IN_KEY, "true"), (ONBOARDING_COMPLETED_KEY, "true")])
}

/// The site's router over a loader that knows every view in the table.
pub fn classic_router(storage: &HashMap<String, String>) -> Router<StaticViewLoader> {
    let loader = StaticViewLoader::for_routes(&classic_routes());
    Router::classic(SessionState::from_store(storage), loader)
}

/// Decodes a data URL produced by the placeholder generator.
pub fn decode_data_url(data_url: &str) -> RgbaImage {
    use base64::Engine;

    let payload = data_url
        .strip_prefix("data:image/png;base64,")
        .expect("not a png data url");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .expect("invalid base64 payload");
    image::load_from_memory(&bytes)
        .expect("payload is not an image")
        .to_rgba8()
}

/// A CJK-capable font from `GUOXUE_TEST_FONT` or the system, if any.
pub fn test_font() -> Option<FontArc> {
    let configured = std::env::var_os("GUOXUE_TEST_FONT").map(PathBuf::from);
    discover_font(configured.as_deref())
}

/// Pixels inside the border that differ from `background`.
pub fn ink_pixels(img: &RgbaImage, background: Rgba<u8>) -> Vec<(u32, u32)> {
    // the 3px border straddles the 5px inset
    let margin = 8;
    let (width, height) = img.dimensions();
    (margin..height - margin)
        .flat_map(|y| (margin..width - margin).map(move |x| (x, y)))
        .filter(|&(x, y)| *img.get_pixel(x, y) != background)
        .collect()
}
