//! Swapping failed images for generated placeholders.
//!
//! The hosting view layer registers every rendered image once and forwards
//! its load-error and click events to the returned [`ImageBinding`].

use std::collections::{BTreeMap, BTreeSet};

use crate::placeholder::{ImageCategory, PlaceholderGenerator, placeholder_text};

pub const ORIGINAL_SRC_ATTR: &str = "data-original-src";
pub const TITLE_ATTR: &str = "title";

/// CSS classes checked in order; the first present one decides the category.
pub const CLASS_CATEGORIES: [(&str, ImageCategory); 5] = [
    ("book-cover", ImageCategory::BookCover),
    ("avatar", ImageCategory::Avatar),
    ("article-img", ImageCategory::Article),
    ("banner", ImageCategory::Banner),
    ("quote-img", ImageCategory::Quote),
];

/// The parts of an image element the fallback logic touches.
pub trait ImageElement {
    fn src(&self) -> &str;

    fn set_src(&mut self, src: String);

    fn has_class(&self, class: &str) -> bool;

    fn attribute(&self, name: &str) -> Option<&str>;

    fn set_attribute(&mut self, name: &str, value: String);
}

/// Image element that lives outside any document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetachedImage {
    pub src: String,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
}

impl DetachedImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }
}

impl ImageElement for DetachedImage {
    fn src(&self) -> &str {
        &self.src
    }

    fn set_src(&mut self, src: String) {
        self.src = src;
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    fn set_attribute(&mut self, name: &str, value: String) {
        self.attributes.insert(name.to_string(), value);
    }
}

pub fn classify<E: ImageElement + ?Sized>(element: &E) -> ImageCategory {
    CLASS_CATEGORIES
        .iter()
        .find(|(class, _)| element.has_class(class))
        .map(|(_, category)| *category)
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    Original,
    Placeholder,
    /// The original source was put back by a click.
    Retrying,
    /// The retry failed too; the element is left alone.
    Failed,
}

/// Creates bindings and performs the source swap.
#[derive(Debug, Clone, Default)]
pub struct ImageFallback {
    generator: PlaceholderGenerator,
}

impl ImageFallback {
    pub fn new(generator: PlaceholderGenerator) -> Self {
        Self { generator }
    }

    pub fn register<E: ImageElement + ?Sized>(&self, element: &E) -> ImageBinding {
        ImageBinding {
            category: classify(element),
            state: FallbackState::Original,
        }
    }

    /// Replaces the element's source with a placeholder for `category`,
    /// remembering the original URL and describing the failure in the title.
    pub fn handle_image_error<E: ImageElement + ?Sized>(
        &self,
        element: &mut E,
        category: ImageCategory,
        original_src: Option<&str>,
    ) {
        let original = original_src.unwrap_or_else(|| element.src()).to_string();
        let text = placeholder_text(&original);
        let placeholder = self.generator.data_url(category, Some(&text));

        tracing::debug!(%category, src = %original, "image failed to load, using placeholder");

        element.set_src(placeholder);
        element.set_attribute(TITLE_ATTR, format!("原图加载失败: {text}"));
        element.set_attribute(ORIGINAL_SRC_ATTR, original);
    }
}

/// Per-image fallback state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBinding {
    category: ImageCategory,
    state: FallbackState,
}

impl ImageBinding {
    pub fn category(&self) -> ImageCategory {
        self.category
    }

    pub fn state(&self) -> FallbackState {
        self.state
    }

    pub fn on_load_error<E: ImageElement + ?Sized>(&mut self, element: &mut E, fallback: &ImageFallback) {
        match self.state {
            FallbackState::Original => {
                fallback.handle_image_error(element, self.category, None);
                self.state = FallbackState::Placeholder;
            }
            FallbackState::Retrying => {
                tracing::debug!(src = %element.src(), "retry failed, giving up");
                self.state = FallbackState::Failed;
            }
            FallbackState::Placeholder | FallbackState::Failed => {}
        }
    }

    /// Restores the recorded original source. Returns whether a retry started.
    pub fn on_click<E: ImageElement + ?Sized>(&mut self, element: &mut E) -> bool {
        if self.state != FallbackState::Placeholder {
            return false;
        }
        let Some(original) = element.attribute(ORIGINAL_SRC_ATTR).map(str::to_string) else {
            return false;
        };
        element.set_src(original);
        self.state = FallbackState::Retrying;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_matching_class_wins() {
        let img = DetachedImage::new("x.png").with_class("banner").with_class("avatar");
        assert_eq!(classify(&img), ImageCategory::Avatar);
    }

    #[test]
    fn article_requires_the_img_suffix() {
        let img = DetachedImage::new("x.png").with_class("article");
        assert_eq!(classify(&img), ImageCategory::Default);

        let img = DetachedImage::new("x.png").with_class("article-img");
        assert_eq!(classify(&img), ImageCategory::Article);
    }

    #[test]
    fn unclassified_image_is_default() {
        assert_eq!(classify(&DetachedImage::new("x.png")), ImageCategory::Default);
    }

    #[test]
    fn explicit_original_src_overrides_element_src() {
        let fallback = ImageFallback::default();
        let mut img = DetachedImage::new("blob:whatever");
        fallback.handle_image_error(&mut img, ImageCategory::Quote, Some("/img/jing-ye-si.png"));

        assert_eq!(img.attribute(ORIGINAL_SRC_ATTR), Some("/img/jing-ye-si.png"));
        assert_eq!(img.attribute(TITLE_ATTR), Some("原图加载失败: jing ye si"));
    }

    #[test]
    fn click_before_failure_does_nothing() {
        let mut img = DetachedImage::new("/img/a.png");
        let mut binding = ImageFallback::default().register(&img);
        assert!(!binding.on_click(&mut img));
        assert_eq!(img.src, "/img/a.png");
        assert_eq!(binding.state(), FallbackState::Original);
    }
}
