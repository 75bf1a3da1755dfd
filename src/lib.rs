pub mod config;
pub mod error;
pub mod fallback;
pub mod performance;
pub mod placeholder;
pub mod router;
pub mod telemetry;

pub use config::Settings;
pub use error::{PlaceholderError, RouterError};
pub use fallback::{DetachedImage, ImageBinding, ImageElement, ImageFallback, classify};
pub use performance::Performance;
pub use placeholder::{ImageCategory, PlaceholderGenerator};
pub use router::{Navigation, Router, SessionState, StaticViewLoader, ViewLoader};
