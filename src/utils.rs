use url::Url;

use crate::types::LinkKind;

const RESERVED_NAMES: [&str; 4] = ["CON", "PRN", "AUX", "NUL"];

fn is_reserved_device_name(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or_default().to_uppercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        return true;
    }

    // COM1-COM9, LPT1-LPT9
    let bytes = stem.as_bytes();
    bytes.len() == 4
        && (stem.starts_with("COM") || stem.starts_with("LPT"))
        && (b'1'..=b'9').contains(&bytes[3])
}

/// Makes a name usable as a single path component on every platform.
///
/// Path separators, `: | < > " ? *` and control characters become `_`, as do
/// a leading whitespace and a trailing whitespace or dot. Windows device names
/// such as `CON` or `LPT1` get a `_` prefix.
pub fn sanitize_filename(name: &str) -> String {
    let mut chars: Vec<char> = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '|' | '<' | '>' | '"' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if let Some(first) = chars.first_mut() {
        if first.is_whitespace() {
            *first = '_';
        }
    }
    if let Some(last) = chars.last_mut() {
        if last.is_whitespace() || *last == '.' {
            *last = '_';
        }
    }

    let sanitized: String = chars.into_iter().collect();
    if is_reserved_device_name(&sanitized) {
        format!("_{}", sanitized)
    } else {
        sanitized
    }
}

/// Parses an album or artist reference.
///
/// Accepts `https://open.spotify.com/{album|artist}/{id}` (optionally with a
/// locale segment such as `intl-de` and a query string) and
/// `spotify:{album|artist}:{id}`.
pub fn parse_link(input: &str) -> Option<(LinkKind, String)> {
    let parsed = Url::parse(input.trim()).ok()?;

    let (kind, id) = match parsed.scheme() {
        "spotify" => {
            let (kind, id) = parsed.path().split_once(':')?;
            (kind.to_string(), id.to_string())
        }
        "http" | "https" => {
            if parsed.host_str() != Some("open.spotify.com") {
                return None;
            }
            let mut segments = parsed.path_segments()?.filter(|s| !s.is_empty());
            let mut kind = segments.next()?;
            if kind.starts_with("intl-") {
                kind = segments.next()?;
            }
            (kind.to_string(), segments.next()?.to_string())
        }
        _ => return None,
    };

    let kind = match kind.as_str() {
        "album" => LinkKind::Album,
        "artist" => LinkKind::Artist,
        _ => return None,
    };

    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some((kind, id))
}

/// Accepts a bare id or a link to an item of `kind`.
pub fn resolve_id(input: &str, kind: LinkKind) -> Option<String> {
    match parse_link(input) {
        Some((parsed, id)) if parsed == kind => Some(id),
        Some(_) => None,
        None => {
            let id = input.trim();
            (!id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()))
                .then(|| id.to_string())
        }
    }
}
