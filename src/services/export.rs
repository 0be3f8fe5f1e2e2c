use base64::{engine::general_purpose, Engine as _};
use std::path::Path;

/// Download href for the aggregated keywords: a base64 data URL used with a
/// `download` attribute on the results page. Nothing is kept server-side
/// between submissions.
pub fn export_download_href(json: &str) -> String {
    format!(
        "data:application/json;base64,{}",
        general_purpose::STANDARD.encode(json.as_bytes())
    )
}

/// CLI counterpart: write the export payload to disk.
pub fn write_export_file(path: &Path, json: &str) -> std::io::Result<()> {
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn href_is_a_json_data_url_of_the_payload() {
        let json = "[\n  {\n    \"file\": \"x.png\"\n  }\n]";
        let href = export_download_href(json);

        let encoded = href
            .strip_prefix("data:application/json;base64,")
            .expect("data URL prefix");
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), json);
    }

    #[test]
    fn writes_export_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keywords.json");
        write_export_file(&path, "[]").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
