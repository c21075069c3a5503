//! Static extension-to-category table.
//!
//! Matching is by exact suffix against the lowercased file extension,
//! leading dot included, so `photo.JPG` lands in `Images` and
//! `archive.tar.gz` lands in `Archives` (only the final suffix counts).

use std::path::Path;

/// Category for files whose extension matches nothing in the table.
pub const FALLBACK_CATEGORY: &str = "Others";

/// Category folders and the extensions routed to them. Declaration order
/// is match order; the first category claiming a suffix wins.
pub const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    ("Images", &[".jpg", ".jpeg", ".png", ".gif", ".svg"]),
    ("Documents", &[".pdf", ".docx", ".txt", ".xlsx", ".pptx"]),
    ("Audio", &[".mp3", ".wav", ".flac"]),
    ("Video", &[".mp4", ".mkv", ".mov"]),
    ("Archives", &[".zip", ".tar", ".rar", ".gz"]),
];

/// Look up the category for a dotted, lowercased suffix such as `".pdf"`.
pub fn category_for_suffix(suffix: &str) -> Option<&'static str> {
    CATEGORY_TABLE
        .iter()
        .find(|(_, suffixes)| suffixes.contains(&suffix))
        .map(|(category, _)| *category)
}

/// Look up the category for a path. `None` means the file belongs in
/// [`FALLBACK_CATEGORY`].
pub fn category_for_path(path: &Path) -> Option<&'static str> {
    let suffix = dotted_suffix(path)?;
    category_for_suffix(&suffix)
}

/// Final suffix of the file name, lowercased, with the dot re-attached.
/// `None` when the name has no extension at all.
pub fn dotted_suffix(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    Some(format!(".{}", ext.to_lowercase()))
}

/// Every category folder name the organizer may create, fallback included.
pub fn all_category_names() -> impl Iterator<Item = &'static str> {
    CATEGORY_TABLE
        .iter()
        .map(|(category, _)| *category)
        .chain(std::iter::once(FALLBACK_CATEGORY))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_their_category() {
        assert_eq!(category_for_path(Path::new("photo.jpg")), Some("Images"));
        assert_eq!(category_for_path(Path::new("report.pdf")), Some("Documents"));
        assert_eq!(category_for_path(Path::new("song.flac")), Some("Audio"));
        assert_eq!(category_for_path(Path::new("clip.mkv")), Some("Video"));
        assert_eq!(category_for_path(Path::new("bundle.rar")), Some("Archives"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(category_for_path(Path::new("PHOTO.JPG")), Some("Images"));
        assert_eq!(category_for_path(Path::new("Mixed.PnG")), Some("Images"));
        assert_eq!(category_for_path(Path::new("NOTES.TXT")), Some("Documents"));
    }

    #[test]
    fn unknown_and_missing_extensions_fall_through() {
        assert_eq!(category_for_path(Path::new("data.xyz")), None);
        assert_eq!(category_for_path(Path::new("README")), None);
        assert_eq!(category_for_path(Path::new("noext.")), None);
    }

    #[test]
    fn only_the_final_suffix_is_considered() {
        // `.gz` wins even though `.tar` is also in the table.
        assert_eq!(
            category_for_path(Path::new("backup.tar.gz")),
            Some("Archives")
        );
        // A dotfile with a real suffix is classified by that suffix.
        assert_eq!(category_for_path(Path::new(".hidden.pdf")), Some("Documents"));
    }

    #[test]
    fn dotfiles_without_suffix_have_none() {
        assert_eq!(category_for_path(Path::new(".gitignore")), None);
        assert_eq!(dotted_suffix(Path::new(".bashrc")), None);
    }

    #[test]
    fn fallback_is_not_in_the_table() {
        assert!(all_category_names().any(|c| c == FALLBACK_CATEGORY));
        assert!(CATEGORY_TABLE
            .iter()
            .all(|(category, _)| *category != FALLBACK_CATEGORY));
    }
}
