//! Deriving file names and placeholder labels from image URLs.

use percent_encoding::percent_decode_str;
use url::Url;

/// Label used whenever nothing readable can be derived from a URL.
pub const LOAD_FAILED_TEXT: &str = "图片加载失败";

/// Last path segment of `url`, or `unknown` when there is none.
///
/// Absolute URLs are parsed so query strings and fragments are ignored;
/// anything that does not parse is split on `/` as-is.
pub fn file_name_from_url(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(str::to_string),
        Err(_) => url.rsplit('/').next().map(str::to_string),
    };

    segment
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Human readable label for a failed image: extension stripped, percent
/// escapes decoded, `-` and `_` turned into spaces.
pub fn placeholder_text(url: &str) -> String {
    readable_name(&file_name_from_url(url)).unwrap_or_else(|| LOAD_FAILED_TEXT.to_string())
}

fn readable_name(file_name: &str) -> Option<String> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && !ext.is_empty()
                && ext.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            stem
        }
        _ => file_name,
    };

    let decoded = percent_decode_str(stem).decode_utf8().ok()?;
    let text = decoded.replace(['-', '_'], " ");
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_from_absolute_url() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/covers/lunyu.jpg?v=3#top"),
            "lunyu.jpg"
        );
    }

    #[test]
    fn file_name_from_relative_path() {
        assert_eq!(file_name_from_url("/images/books/daodejing.png"), "daodejing.png");
        assert_eq!(file_name_from_url("cover.webp"), "cover.webp");
    }

    #[test]
    fn file_name_falls_back_to_unknown() {
        assert_eq!(file_name_from_url("https://example.com/"), "unknown");
        assert_eq!(file_name_from_url("images/"), "unknown");
        assert_eq!(file_name_from_url(""), "unknown");
    }

    #[test]
    fn hyphenated_name_becomes_words() {
        assert_eq!(placeholder_text("https://example.com/img/my-book.png"), "my book");
        assert_eq!(placeholder_text("/img/tang_poems-300.jpeg"), "tang poems 300");
    }

    #[test]
    fn percent_escapes_are_decoded() {
        assert_eq!(
            placeholder_text("https://example.com/%E8%AE%BA%E8%AF%AD.png"),
            "论语"
        );
        assert_eq!(placeholder_text("/img/spring%20festival.png"), "spring festival");
    }

    #[test]
    fn undecodable_name_uses_failure_text() {
        assert_eq!(placeholder_text("/img/%FF%FE.png"), LOAD_FAILED_TEXT);
        assert_eq!(placeholder_text("/img/---.png"), LOAD_FAILED_TEXT);
    }

    #[test]
    fn name_without_extension_is_kept() {
        assert_eq!(placeholder_text("https://example.com/avatar/zhang_san"), "zhang san");
    }
}
