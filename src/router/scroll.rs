use serde::{Deserialize, Serialize};

use crate::router::RouteLocation;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScrollTarget {
    /// Back/forward navigation: where the page was left.
    Restore { position: ScrollPosition },
    /// In-page anchor from the URL hash, e.g. `#chapter-3`.
    Anchor { selector: String },
    Top,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrollInstruction {
    pub target: ScrollTarget,
    pub smooth: bool,
}

/// Saved position first, then the hash anchor, then the top of the page.
pub fn scroll_behavior(to: &RouteLocation, saved: Option<ScrollPosition>) -> ScrollInstruction {
    let target = match saved {
        Some(position) => ScrollTarget::Restore { position },
        None if !to.hash.is_empty() => ScrollTarget::Anchor {
            selector: to.hash.clone(),
        },
        None => ScrollTarget::Top,
    };
    ScrollInstruction { target, smooth: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_position_wins_over_hash() {
        let to = RouteLocation::parse("/book/read/1#chapter-2");
        let saved = ScrollPosition { left: 0.0, top: 640.0 };
        assert_eq!(
            scroll_behavior(&to, Some(saved)).target,
            ScrollTarget::Restore { position: saved }
        );
    }

    #[test]
    fn hash_scrolls_to_anchor() {
        let to = RouteLocation::parse("/book/read/1#chapter-2");
        assert_eq!(
            scroll_behavior(&to, None).target,
            ScrollTarget::Anchor { selector: "#chapter-2".to_string() }
        );
    }

    #[test]
    fn default_is_smooth_scroll_to_top() {
        let instruction = scroll_behavior(&RouteLocation::parse("/books"), None);
        assert_eq!(instruction, ScrollInstruction { target: ScrollTarget::Top, smooth: true });
    }
}
