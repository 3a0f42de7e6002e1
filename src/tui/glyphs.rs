//! Glyph sets for tree twisties and decorations.
//!
//! Same register pattern as the theme: chosen at startup from the
//! environment, replaceable by an explicit preference change only.

use std::sync::{LazyLock, RwLock};

use crate::store::config::AppearanceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphKind {
    #[default]
    Unicode,
    Utf8,
    Ascii,
}

impl GlyphKind {
    pub fn parse(name: &str) -> Option<GlyphKind> {
        match name {
            "unicode" => Some(GlyphKind::Unicode),
            "utf8" => Some(GlyphKind::Utf8),
            "ascii" => Some(GlyphKind::Ascii),
            _ => None,
        }
    }
}

/// The characters rendering asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphSet {
    pub twisty_collapsed: &'static str,
    pub twisty_expanded: &'static str,
    pub bullet: &'static str,
    pub arrow: &'static str,
    pub hrule: &'static str,
}

impl GlyphSet {
    pub fn for_kind(kind: GlyphKind) -> GlyphSet {
        match kind {
            GlyphKind::Unicode => GlyphSet {
                twisty_collapsed: "▸",
                twisty_expanded: "▾",
                bullet: "•",
                arrow: "→",
                hrule: "─",
            },
            GlyphKind::Utf8 => GlyphSet {
                twisty_collapsed: "‣",
                twisty_expanded: "▿",
                bullet: "·",
                arrow: "›",
                hrule: "―",
            },
            GlyphKind::Ascii => GlyphSet {
                twisty_collapsed: ">",
                twisty_expanded: "v",
                bullet: "*",
                arrow: "->",
                hrule: "-",
            },
        }
    }
}

impl Default for GlyphSet {
    fn default() -> Self {
        GlyphSet::for_kind(GlyphKind::Unicode)
    }
}

static GLYPHS: LazyLock<RwLock<GlyphSet>> = LazyLock::new(|| RwLock::new(GlyphSet::default()));

pub fn current() -> GlyphSet {
    *GLYPHS.read().expect("glyph register poisoned")
}

pub fn install(set: GlyphSet) {
    *GLYPHS.write().expect("glyph register poisoned") = set;
}

/// Resolve the glyph set: `CLARITY_TUI_GLYPHS`, then workspace config,
/// then unicode. Unknown values are ignored.
pub fn detect(config: &AppearanceConfig) -> GlyphSet {
    let kind = std::env::var("CLARITY_TUI_GLYPHS")
        .ok()
        .as_deref()
        .and_then(GlyphKind::parse)
        .or_else(|| config.glyphs.as_deref().and_then(GlyphKind::parse))
        .unwrap_or_default();
    GlyphSet::for_kind(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ignores_unknown() {
        assert_eq!(GlyphKind::parse("ascii"), Some(GlyphKind::Ascii));
        assert_eq!(GlyphKind::parse("emoji"), None);
    }

    #[test]
    fn ascii_set_is_plain() {
        let set = GlyphSet::for_kind(GlyphKind::Ascii);
        assert!(set.twisty_collapsed.is_ascii());
        assert!(set.arrow.is_ascii());
    }
}
