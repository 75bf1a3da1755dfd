mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from guoxue for tests
pub use guoxue::fallback::{FallbackState, ORIGINAL_SRC_ATTR, TITLE_ATTR};
pub use guoxue::placeholder::{Color, LOAD_FAILED_TEXT};
pub use guoxue::router::{RouteLocation, ScrollPosition, ScrollTarget};
pub use guoxue::{
    DetachedImage, ImageCategory, ImageElement, ImageFallback, PlaceholderGenerator, RouterError,
    SessionState,
};
