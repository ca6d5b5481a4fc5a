//! Palette selection
//!
//! Maps a card's category (and, failing that, its tags) onto a palette
//! through a fixed table. Unknown categories get the default palette.

use cardsmith_core::{Color, Theme};

/// Fixed bottom stop of the background gradient
pub const GRADIENT_END: Color = Color::WHITE;

/// Category keyword → palette, checked in order
const THEME_TABLE: &[(&str, Theme)] = &[
    (
        "忍术",
        Theme::new(Color::rgb(0xe6, 0xee, 0xfa), Color::rgb(0x2f, 0x5d, 0xa8)),
    ),
    (
        "忍者",
        Theme::new(Color::rgb(0xfb, 0xe9, 0xe4), Color::rgb(0xb0, 0x3a, 0x2e)),
    ),
    (
        "状态",
        Theme::new(Color::rgb(0xe8, 0xf5, 0xe9), Color::rgb(0x3b, 0x7d, 0x4f)),
    ),
];

/// Pick the palette for a card
///
/// A category containing a table keyword wins; otherwise a tag equal to a
/// keyword (case-insensitive) is used; otherwise [`Theme::default`].
pub fn select_theme(category: &str, tags: &[String]) -> Theme {
    let category = category.trim();

    if let Some((_, theme)) = THEME_TABLE
        .iter()
        .find(|(keyword, _)| category.contains(keyword))
    {
        return *theme;
    }

    THEME_TABLE
        .iter()
        .find(|(keyword, _)| {
            tags.iter()
                .any(|tag| tag.trim().to_lowercase() == keyword.to_lowercase())
        })
        .map(|(_, theme)| *theme)
        .unwrap_or_default()
}
