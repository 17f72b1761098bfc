//! Archive filename conventions.
//!
//! Local files are named `<identifier>_<remote basename>`; the identifier is
//! recovered later by splitting on the first underscore. Remote basenames come
//! from the URL path and are sanitized for Linux filesystems.

/// Default name when the URL path yields nothing usable.
const FALLBACK_NAME: &str = "download.bin";

/// Local filename for `id` fetched from `url`.
pub fn dest_filename(id: &str, url: &str) -> String {
    format!("{}_{}", id, remote_basename(url))
}

/// Identifier prefix of an archive filename: the text before the first `_`.
/// Returns `None` when the name has no separator or an empty prefix.
pub fn identifier_prefix(name: &str) -> Option<&str> {
    let (id, rest) = name.split_once('_')?;
    if id.is_empty() || rest.is_empty() {
        return None;
    }
    Some(id)
}

/// Last path segment of `url`, sanitized; falls back to a fixed name when the
/// URL has no usable path (query strings and fragments are not part of the path).
pub fn remote_basename(url: &str) -> String {
    let segment = url::Url::parse(url)
        .ok()
        .and_then(|u| u.path().split('/').filter(|s| !s.is_empty()).next_back().map(str::to_string));

    let raw = match segment {
        Some(s) => s,
        None => return FALLBACK_NAME.to_string(),
    };

    let clean = sanitize(&raw);
    if clean.is_empty() || clean == "." || clean == ".." {
        FALLBACK_NAME.to_string()
    } else {
        clean
    }
}

/// Sanitizes a candidate filename for safe use on Linux: path separators,
/// NUL, control characters and whitespace become `_` (runs collapsed),
/// leading/trailing dots and underscores are trimmed, length capped at
/// NAME_MAX.
fn sanitize(name: &str) -> String {
    const NAME_MAX: usize = 255;

    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;
    for c in name.chars() {
        let keep = !(c == '\0' || c == '/' || c == '\\' || c.is_control() || c == ' ' || c == '\t');
        if keep {
            out.push(c);
            prev_underscore = false;
        } else if !prev_underscore {
            out.push('_');
            prev_underscore = true;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.len() > NAME_MAX {
        let mut take = NAME_MAX;
        while take > 0 && !trimmed.is_char_boundary(take) {
            take -= 1;
        }
        trimmed[..take].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dest_filename_joins_id_and_basename() {
        assert_eq!(
            dest_filename("42", "https://example.com/assemblies/sample.fa.gz"),
            "42_sample.fa.gz"
        );
    }

    #[test]
    fn identifier_prefix_splits_on_first_underscore() {
        assert_eq!(identifier_prefix("42_sample.fa.gz"), Some("42"));
        assert_eq!(identifier_prefix("42_a_b.fa.gz"), Some("42"));
        assert_eq!(identifier_prefix("HG002_maternal.fa.gz"), Some("HG002"));
    }

    #[test]
    fn identifier_prefix_rejects_unparsable_names() {
        assert_eq!(identifier_prefix("noprefix.fa.gz"), None);
        assert_eq!(identifier_prefix("_leading.fa.gz"), None);
        assert_eq!(identifier_prefix("trailing_"), None);
    }

    #[test]
    fn remote_basename_from_path() {
        assert_eq!(
            remote_basename("https://example.com/a/b/sample.fa.gz"),
            "sample.fa.gz"
        );
        assert_eq!(
            remote_basename("https://example.com/file.zip?token=abc"),
            "file.zip"
        );
    }

    #[test]
    fn remote_basename_fallback() {
        assert_eq!(remote_basename("https://example.com/"), FALLBACK_NAME);
        assert_eq!(remote_basename("https://example.com"), FALLBACK_NAME);
        assert_eq!(remote_basename("not a url"), FALLBACK_NAME);
    }

    #[test]
    fn sanitize_replaces_and_collapses() {
        assert_eq!(sanitize("we ird\tname.gz"), "we_ird_name.gz");
        assert_eq!(sanitize("file\x00name.txt"), "file_name.txt");
        assert_eq!(sanitize("file___name.txt"), "file___name.txt");
        assert_eq!(sanitize("..file.txt.."), "file.txt");
    }
}
