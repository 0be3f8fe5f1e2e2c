use anyhow::Context;
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;

use crate::constants::GEMINI_API_BASE;
use crate::models::SelectedImage;
use crate::utils::encode_image_base64;

/// Seam to the generative model. One streaming call per image: the sink is
/// invoked once per text fragment, in strict arrival order.
#[async_trait]
pub trait KeywordProvider: Send + Sync {
    async fn annotate_stream(
        &self,
        image: &SelectedImage,
        prompt: &str,
        on_fragment: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> anyhow::Result<()>;

    fn name(&self) -> &'static str;
}

/// Gemini over the REST `streamGenerateContent` endpoint (SSE).
pub struct GeminiProvider {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl KeywordProvider for GeminiProvider {
    async fn annotate_stream(
        &self,
        image: &SelectedImage,
        prompt: &str,
        on_fragment: &mut (dyn for<'a> FnMut(&'a str) + Send),
    ) -> anyhow::Result<()> {
        let url = format!(
            "{}/{}:streamGenerateContent?alt=sse&key={}",
            GEMINI_API_BASE, self.model, self.api_key
        );

        let body = build_request_body(image, prompt);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("failed to send model request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("model call failed with status {}: {}", status, text);
        }

        // SSE events arrive as `data: {json}` lines. Chunk boundaries do not
        // line up with line boundaries, so buffer bytes until a newline.
        let mut stream = response.bytes_stream();
        let mut pending: Vec<u8> = Vec::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("error while reading model response stream")?;
            pending.extend_from_slice(&chunk);

            while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = pending.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&line);
                if let Some(fragment) = parse_sse_line(line.trim_end()) {
                    if !fragment.is_empty() {
                        on_fragment(&fragment);
                    }
                }
            }
        }

        // Stream may end without a trailing newline.
        if !pending.is_empty() {
            let line = String::from_utf8_lossy(&pending);
            if let Some(fragment) = parse_sse_line(line.trim_end()) {
                if !fragment.is_empty() {
                    on_fragment(&fragment);
                }
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

/// Single-turn multimodal request: the inline image followed by the fixed
/// instruction text. Exactly one safety category is overridden; everything
/// else stays at the API default.
pub fn build_request_body(image: &SelectedImage, prompt: &str) -> Value {
    serde_json::json!({
        "contents": [{
            "role": "user",
            "parts": [
                {
                    "inline_data": {
                        "mime_type": image.mime_type,
                        "data": encode_image_base64(&image.data)
                    }
                },
                { "text": prompt }
            ]
        }],
        "safetySettings": [{
            "category": "HARM_CATEGORY_HARASSMENT",
            "threshold": "BLOCK_ONLY_HIGH"
        }]
    })
}

/// Parse one SSE line into its text fragment, if any. Blank lines, comment
/// lines and non-text events yield `None`.
pub fn parse_sse_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }
    let event: Value = serde_json::from_str(payload).ok()?;
    event_text(&event)
}

/// Concatenated text parts of the first candidate of one stream event.
fn event_text(event: &Value) -> Option<String> {
    let parts = event
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let mut text = String::new();
    for part in parts {
        if let Some(t) = part.get("text").and_then(|v| v.as_str()) {
            text.push_str(t);
        }
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image() -> SelectedImage {
        SelectedImage {
            file_name: "x.png".to_string(),
            mime_type: "image/png".to_string(),
            data: vec![0x89, 0x50, 0x4e, 0x47],
        }
    }

    #[test]
    fn request_body_has_inline_image_then_prompt() {
        let body = build_request_body(&sample_image(), "list tags");
        let parts = &body["contents"][0]["parts"];

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inline_data"]["mime_type"], "image/png");
        assert_eq!(parts[1]["text"], "list tags");
    }

    #[test]
    fn request_body_overrides_exactly_one_safety_category() {
        let body = build_request_body(&sample_image(), "p");
        let settings = body["safetySettings"].as_array().unwrap();

        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0]["category"], "HARM_CATEGORY_HARASSMENT");
        assert_eq!(settings[0]["threshold"], "BLOCK_ONLY_HIGH");
    }

    #[test]
    fn parses_data_lines_into_fragments() {
        let line = r##"data: {"candidates":[{"content":{"parts":[{"text":"#cat "}]}}]}"##;
        assert_eq!(parse_sse_line(line).as_deref(), Some("#cat "));
    }

    #[test]
    fn concatenates_multiple_text_parts_in_one_event() {
        let line =
            r##"data: {"candidates":[{"content":{"parts":[{"text":"#a "},{"text":"#b"}]}}]}"##;
        assert_eq!(parse_sse_line(line).as_deref(), Some("#a #b"));
    }

    #[test]
    fn ignores_blank_done_and_non_data_lines() {
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line("data:"), None);
        assert_eq!(parse_sse_line("data: [DONE]"), None);
        assert_eq!(parse_sse_line(": keepalive"), None);
        assert_eq!(parse_sse_line("event: message"), None);
    }

    #[test]
    fn ignores_events_without_text_parts() {
        let line = r#"data: {"candidates":[{"finishReason":"STOP"}]}"#;
        assert_eq!(parse_sse_line(line), None);
    }
}
