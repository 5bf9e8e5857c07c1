//! Output file naming and the already-downloaded check.
//!
//! Playlist entries land at `<dir>/<NN> - <sanitized title>.<ext>`. Existence is
//! judged by file name alone: a truncated or corrupt file with the right name
//! counts as downloaded. yt-dlp keeps in-flight data in `.part` files, which
//! never match. Source streams left behind by a failed conversion are removed
//! with [`remove_leftovers`] so they do not count on the next run.

use crate::orchestrator::LOG_DIR;
use std::path::{Path, PathBuf};

/// Maximum sanitized name length, in UTF-8 bytes.
///
/// Filesystems cap names at 255 bytes. The rest is left for the `NN - ` prefix
/// and yt-dlp's suffixes such as `.temp.webm.part`.
pub const MAX_NAME_BYTES: usize = 200;

/// Extensions that count as an existing download, in lookup order.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "webm", "opus"];

/// Replacement for empty titles.
const UNTITLED: &str = "untitled";

fn is_illegal(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || c.is_control()
}

/// Make a title safe to use as a file or directory name.
///
/// Illegal characters become `_`, whitespace runs collapse to one space, and the
/// result is cut to [`MAX_NAME_BYTES`] on a char boundary. Trailing dots and
/// spaces are dropped since Windows rejects them.
pub fn sanitize(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if is_illegal(c) && !c.is_whitespace() { '_' } else { c })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let trimmed = truncate_bytes(&collapsed, MAX_NAME_BYTES).trim_end_matches(['.', ' ']);

    if trimmed.is_empty() {
        UNTITLED.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Longest prefix of `s` within `max` bytes that ends on a char boundary.
fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let end = (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0);
    &s[..end]
}

/// File stem of a playlist entry: zero-padded index and sanitized title.
pub fn entry_stem(index: usize, title: &str) -> String {
    format!("{index:02} - {}", sanitize(title))
}

/// Directory name of a playlist under the output root.
///
/// Same as [`sanitize`], except the log directory name is suffixed with `_` so
/// audio never lands next to the run artifacts.
pub fn playlist_dir_name(title: &str) -> String {
    let name = sanitize(title);
    if name.eq_ignore_ascii_case(LOG_DIR) {
        format!("{name}_")
    } else {
        name
    }
}

/// First existing `<dir>/<stem>.<ext>` over [`AUDIO_EXTENSIONS`].
pub fn find_existing(dir: &Path, stem: &str) -> Option<PathBuf> {
    AUDIO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|path| path.is_file())
}

/// Remove every `<dir>/<stem>.<ext>` over [`AUDIO_EXTENSIONS`], returning the
/// removed paths.
pub fn remove_leftovers(dir: &Path, stem: &str) -> std::io::Result<Vec<PathBuf>> {
    let mut removed = Vec::new();

    for ext in AUDIO_EXTENSIONS {
        let path = dir.join(format!("{stem}.{ext}"));
        if path.is_file() {
            std::fs::remove_file(&path)?;
            removed.push(path);
        }
    }

    Ok(removed)
}

/// yt-dlp output template writing `<dir>/<stem>.<ext>`.
///
/// `%` is the template field marker, so literal ones are doubled.
pub fn output_template(dir: &Path, stem: &str) -> String {
    let dir = PathBuf::from(dir.to_string_lossy().replace('%', "%%"));
    let file_name = format!("{}.%(ext)s", stem.replace('%', "%%"));

    dir.join(file_name).to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_illegal_characters() {
        assert_eq!(sanitize(r#"AC/DC: "Live" <1991>?"#), "AC_DC_ _Live_ _1991__");
        assert_eq!(sanitize(r"a\b|c*d"), "a_b_c_d");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(sanitize("  Song \t  Title\n "), "Song Title");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let name = sanitize(&"歌".repeat(150));
        assert!(name.len() <= MAX_NAME_BYTES);
        assert_eq!(name, "歌".repeat(MAX_NAME_BYTES / 3));

        let mixed = sanitize(&format!("a{}", "歌".repeat(100)));
        assert!(mixed.len() <= MAX_NAME_BYTES);
        assert!(mixed.starts_with('a'));
    }

    #[test]
    fn ascii_titles_keep_full_budget() {
        let name = sanitize(&"x".repeat(300));
        assert_eq!(name.len(), MAX_NAME_BYTES);
    }

    #[test]
    fn long_cjk_titles_fit_on_disk() {
        let dir = tempfile::tempdir().unwrap();

        let playlist_dir = dir.path().join(sanitize(&"歌".repeat(150)));
        std::fs::create_dir_all(&playlist_dir).unwrap();

        let stem = entry_stem(100, &"歌".repeat(100));
        for suffix in ["wav", "mp3", "temp.webm.part"] {
            std::fs::write(playlist_dir.join(format!("{stem}.{suffix}")), b"").unwrap();
        }
        assert_eq!(
            find_existing(&playlist_dir, &stem),
            Some(playlist_dir.join(format!("{stem}.wav")))
        );
    }

    #[test]
    fn drops_trailing_dots() {
        assert_eq!(sanitize("Wait..."), "Wait");
    }

    #[test]
    fn empty_title_gets_placeholder() {
        assert_eq!(sanitize(""), "untitled");
        assert_eq!(sanitize("  ..  "), "untitled");
    }

    #[test]
    fn sanitize_is_idempotent() {
        for title in ["a/b", "  x  y ", "Wait...", "", "ok", r#"<>:"|?*"#] {
            let once = sanitize(title);
            assert_eq!(sanitize(&once), once, "title: {title:?}");
            assert!(!once.chars().any(is_illegal), "title: {title:?}");
        }
    }

    #[test]
    fn entry_stem_pads_index() {
        assert_eq!(entry_stem(7, "Song"), "07 - Song");
        assert_eq!(entry_stem(123, "Song"), "123 - Song");
    }

    #[test]
    fn finds_any_supported_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_existing(dir.path(), "01 - Song"), None);

        std::fs::write(dir.path().join("01 - Song.mp3"), b"").unwrap();
        assert_eq!(
            find_existing(dir.path(), "01 - Song"),
            Some(dir.path().join("01 - Song.mp3"))
        );
    }

    #[test]
    fn ignores_partial_downloads() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("01 - Song.webm.part"), b"").unwrap();
        std::fs::write(dir.path().join("02 - Song.wav"), b"").unwrap();

        assert_eq!(find_existing(dir.path(), "01 - Song"), None);
    }

    #[test]
    fn log_dir_name_is_reserved() {
        assert_eq!(playlist_dir_name("logs"), "logs_");
        assert_eq!(playlist_dir_name(" Logs. "), "Logs_");
        assert_eq!(playlist_dir_name("logs 2024"), "logs 2024");
        assert_eq!(playlist_dir_name("a/b"), "a_b");
    }

    #[test]
    fn removes_leftover_streams_only_for_stem() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["01 - Song.webm", "01 - Song.m4a", "02 - Song.webm"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let mut removed = remove_leftovers(dir.path(), "01 - Song").unwrap();
        removed.sort();

        assert_eq!(
            removed,
            [
                dir.path().join("01 - Song.m4a"),
                dir.path().join("01 - Song.webm")
            ]
        );
        assert_eq!(find_existing(dir.path(), "01 - Song"), None);
        assert!(dir.path().join("02 - Song.webm").is_file());
    }

    #[test]
    fn template_escapes_percent() {
        let template = output_template(Path::new("out/100% Hits"), "01 - 50% Off");
        assert_eq!(
            template,
            Path::new("out/100%% Hits")
                .join("01 - 50%% Off.%(ext)s")
                .to_string_lossy()
        );
    }
}
