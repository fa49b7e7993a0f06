//! Target path for re-submitted transfers.

/// Used when the proposed filename sanitizes to nothing.
const DEFAULT_FILENAME: &str = "download.bin";

/// Length limit per path component (Linux NAME_MAX).
const NAME_MAX: usize = 255;

/// Sanitizes one path component.
///
/// - Replaces NUL, `/`, `\`, whitespace and control characters with `_`
/// - Collapses consecutive underscores
/// - Trims leading/trailing dots and underscores
/// - Limits length to 255 bytes on a char boundary
pub fn sanitize_component(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if c == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}

/// Final component of a host-proposed filename, which may be a full path.
pub fn basename(filename: &str) -> &str {
    filename.rsplit(['/', '\\']).next().unwrap_or(filename)
}

/// `<folder>/<name>` for a re-submitted transfer. An empty folder yields just the name.
pub fn target_path(folder: &str, filename: &str) -> String {
    let name = match sanitize_component(basename(filename)) {
        n if n.is_empty() => DEFAULT_FILENAME.to_string(),
        n => n,
    };
    let folder = sanitize_component(folder);
    if folder.is_empty() {
        name
    } else {
        format!("{folder}/{name}")
    }
}
