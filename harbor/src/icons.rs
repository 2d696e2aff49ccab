//! Icon glyphs for list rows and the preview pane.

/// Glyph shown in front of a row. Folders win over extension lookup.
pub fn glyph(name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        return "📁";
    }
    match extension(name).as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp" | "svg" | "tiff" => "🖼",
        "mp3" | "wav" | "flac" | "ogg" | "aac" | "m4a" | "mid" | "midi" => "🎵",
        "mp4" | "mkv" | "avi" | "mov" | "webm" => "🎬",
        "zip" | "gz" | "tar" | "rar" | "xz" | "zst" | "7z" => "📦",
        "pdf" | "epub" | "mobi" | "doc" | "docx" => "📕",
        _ => "📄",
    }
}

/// Whether the preview pane should decode this file as an image.
pub fn is_image(name: &str) -> bool {
    matches!(
        extension(name).as_str(),
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "webp"
    )
}

/// Whether the preview pane should show this file as text.
pub fn is_text(name: &str) -> bool {
    matches!(
        extension(name).as_str(),
        "txt" | "md" | "rs" | "go" | "py" | "js" | "ts" | "c" | "h" | "cpp" | "hpp"
            | "java" | "rb" | "php" | "sh" | "css" | "html" | "xml" | "json" | "yaml"
            | "yml" | "toml" | "ini" | "env" | "lock" | "log" | "csv" | "sum" | "mod"
    )
}

fn extension(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos < name.len() - 1 => name[pos + 1..].to_lowercase(),
        _ => String::new(),
    }
}
