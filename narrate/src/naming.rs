// Identifier and download-name derivation

use std::path::Path;

/// Title used when none is given
pub const DEFAULT_TITLE: &str = "My Story";

const AUDIO_EXTENSION: &str = "mp3";

/// Identifier for an uploaded file: its name without the last extension.
///
/// `chapter1.txt` becomes `chapter1`, `notes.draft.txt` becomes
/// `notes.draft`, and a leading-dot name like `.story` is kept whole.
/// When the stem alone is unusable (`..txt`), the whole file name is used.
pub fn identifier_from_filename(name: &str) -> String {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| clean(&s.to_string_lossy()))
        .unwrap_or_default();
    if !is_reserved(&stem) {
        return stem;
    }

    let whole = path
        .file_name()
        .map(|s| clean(&s.to_string_lossy()))
        .unwrap_or_else(|| clean(name));
    if whole.is_empty() {
        "_".to_string()
    } else if is_reserved(&whole) {
        whole.replace('.', "_")
    } else {
        whole
    }
}

/// Identifier for a story title, safe to use as a file name
pub fn identifier_from_title(title: &str) -> String {
    let cleaned = clean(title);
    if is_reserved(&cleaned) {
        DEFAULT_TITLE.to_string()
    } else {
        cleaned
    }
}

/// File name an artifact is downloaded as
pub fn download_name(identifier: &str) -> String {
    format!("{}.{}", identifier, AUDIO_EXTENSION)
}

fn clean(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Names that cannot stand alone as a file name
fn is_reserved(name: &str) -> bool {
    matches!(name, "" | "." | "..")
}
