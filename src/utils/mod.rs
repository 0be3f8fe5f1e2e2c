use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::Path;

use crate::constants::TAG_MARKER;

lazy_static! {
    static ref MIME_BY_EXTENSION: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("png", "image/png");
        m.insert("jpg", "image/jpeg");
        m.insert("jpeg", "image/jpeg");
        m.insert("bmp", "image/bmp");
        m.insert("gif", "image/gif");
        m.insert("webp", "image/webp");
        m
    };
}

/// Base64 payload for inline_data. No data-URL prefix; the API wants the
/// bare encoding.
pub fn encode_image_base64(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Guess an image MIME type from a file name extension. Used by the CLI,
/// where no browser supplies the content type.
pub fn guess_mime_type(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    MIME_BY_EXTENSION.get(ext.as_str()).copied()
}

/// Extract hashtag tokens from a response buffer: whitespace-delimited,
/// tag-marker-prefixed only, in order of appearance.
pub fn extract_hashtags(buffer: &str) -> Vec<String> {
    buffer
        .split_whitespace()
        .filter(|tok| tok.starts_with(TAG_MARKER))
        .map(|tok| tok.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_only_marked_tokens_in_order() {
        assert_eq!(extract_hashtags("#a #b text #c"), vec!["#a", "#b", "#c"]);
    }

    #[test]
    fn extraction_handles_newlines_and_empty_input() {
        assert_eq!(extract_hashtags("#cat\n#dog\tplain"), vec!["#cat", "#dog"]);
        assert!(extract_hashtags("").is_empty());
        assert!(extract_hashtags("no tags here").is_empty());
    }

    #[test]
    fn guesses_mime_types_by_extension() {
        assert_eq!(guess_mime_type("x.png"), Some("image/png"));
        assert_eq!(guess_mime_type("photo.JPG"), Some("image/jpeg"));
        assert_eq!(guess_mime_type("notes.txt"), None);
        assert_eq!(guess_mime_type("noext"), None);
    }

    #[test]
    fn encodes_bytes_without_data_url_prefix() {
        let encoded = encode_image_base64(b"abc");
        assert_eq!(encoded, "YWJj");
        assert!(!encoded.starts_with("data:"));
    }
}
