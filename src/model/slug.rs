/// Characters of the title kept in a slug before sanitizing
const TITLE_PREFIX_CHARS: usize = 30;

/// Maximum slug length after sanitizing
const MAX_SLUG_CHARS: usize = 50;

/// Builds the filesystem-safe directory name for an item's images
///
/// The slug is `build_<index:05>_<title prefix>` with everything except
/// alphanumerics, `_` and `-` removed, capped at 50 characters.
///
/// # Examples
///
/// ```
/// use craft_harvest::model::item_slug;
///
/// assert_eq!(item_slug(7, "Small Oak House #2"), "build_00007_SmallOakHouse2");
/// ```
pub fn item_slug(index: usize, title: &str) -> String {
    let prefix: String = title.chars().take(TITLE_PREFIX_CHARS).collect();
    format!("build_{:05}_{}", index, prefix)
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .take(MAX_SLUG_CHARS)
        .collect()
}

/// File name of the `position`-th image of an item
pub fn image_file_name(position: usize) -> String {
    format!("image_{:03}.jpg", position)
}
