use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PlaceholderError;

/// Visual styling family of a synthesized fallback image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageCategory {
    BookCover,
    Avatar,
    Article,
    Banner,
    Quote,
    #[default]
    Default,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 6] = [
        ImageCategory::BookCover,
        ImageCategory::Avatar,
        ImageCategory::Article,
        ImageCategory::Banner,
        ImageCategory::Quote,
        ImageCategory::Default,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ImageCategory::BookCover => "book-cover",
            ImageCategory::Avatar => "avatar",
            ImageCategory::Article => "article",
            ImageCategory::Banner => "banner",
            ImageCategory::Quote => "quote",
            ImageCategory::Default => "default",
        }
    }

    /// Looks up a category by key. Unknown keys map to `Default`.
    pub fn from_key(key: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|category| category.key() == key)
            .unwrap_or_default()
    }

    pub fn config(&self) -> &'static PlaceholderConfig {
        match self {
            ImageCategory::BookCover => &BOOK_COVER,
            ImageCategory::Avatar => &AVATAR,
            ImageCategory::Article => &ARTICLE,
            ImageCategory::Banner => &BANNER,
            ImageCategory::Quote => &QUOTE,
            ImageCategory::Default => &DEFAULT,
        }
    }
}

impl fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ImageCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_key(s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(value: u32) -> Self {
        Color {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.r, self.g, self.b, 255])
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<&str> for Color {
    type Error = PlaceholderError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let hex = value
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6)
            .ok_or_else(|| PlaceholderError::InvalidColor(value.to_string()))?;
        let rgb = u32::from_str_radix(hex, 16)
            .map_err(|_| PlaceholderError::InvalidColor(value.to_string()))?;
        Ok(Color::from_rgb(rgb))
    }
}

impl TryFrom<String> for Color {
    type Error = PlaceholderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::try_from(value.as_str())
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Color::try_from(raw).map_err(serde::de::Error::custom)
    }
}

/// Size and styling of one placeholder category.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub text_color: Color,
    pub label: &'static str,
    pub font_size: f32,
}

const INK: Color = Color::from_rgb(0x842029);

static BOOK_COVER: PlaceholderConfig = PlaceholderConfig {
    width: 200,
    height: 300,
    background: Color::from_rgb(0xf9e9d6),
    text_color: INK,
    label: "经典书籍",
    font_size: 18.0,
};

static AVATAR: PlaceholderConfig = PlaceholderConfig {
    width: 120,
    height: 120,
    background: Color::from_rgb(0xe6f7ff),
    text_color: INK,
    label: "用户头像",
    font_size: 14.0,
};

static ARTICLE: PlaceholderConfig = PlaceholderConfig {
    width: 800,
    height: 450,
    background: Color::from_rgb(0xf0f7ec),
    text_color: INK,
    label: "文章配图",
    font_size: 24.0,
};

static BANNER: PlaceholderConfig = PlaceholderConfig {
    width: 1200,
    height: 300,
    background: Color::from_rgb(0xeae2d8),
    text_color: INK,
    label: "国学经典",
    font_size: 36.0,
};

static QUOTE: PlaceholderConfig = PlaceholderConfig {
    width: 600,
    height: 400,
    background: Color::from_rgb(0xf5f5f5),
    text_color: INK,
    label: "经典名句",
    font_size: 24.0,
};

static DEFAULT: PlaceholderConfig = PlaceholderConfig {
    width: 300,
    height: 200,
    background: Color::from_rgb(0xf7f7f7),
    text_color: INK,
    label: "图片加载失败",
    font_size: 16.0,
};
