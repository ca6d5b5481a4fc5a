//! Theme command

use cardsmith_raster::select_theme;
use cardsmith_raster::theme::GRADIENT_END;

pub fn run(category: &str, tags: &str) -> Result<(), Box<dyn std::error::Error>> {
    let tags: Vec<String> = tags
        .split([',', '，'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let theme = select_theme(category, &tags);
    let json = serde_json::json!({
        "category": category,
        "tags": tags,
        "background": theme.background,
        "accent": theme.accent,
        "gradientEnd": GRADIENT_END,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);

    Ok(())
}
