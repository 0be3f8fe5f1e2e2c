use pulldown_cmark::{html, Parser};

/// Render a response buffer to HTML. No extensions are enabled; the
/// renderer is stateless, so re-rendering the same buffer always yields
/// the same output.
pub fn render_markdown(buffer: &str) -> String {
    let parser = Parser::new(buffer);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_plain_hashtag_text_as_paragraph() {
        let html = render_markdown("#cat #dog");
        assert!(html.contains("#cat #dog"), "got: {}", html);
    }

    #[test]
    fn rendering_is_idempotent_across_calls() {
        let buffer = "#a **bold** #b\n\n- item";
        let first = render_markdown(buffer);
        for _ in 0..3 {
            assert_eq!(render_markdown(buffer), first);
        }
    }

    #[test]
    fn renders_incremental_buffers_independently() {
        // Replace-not-append rendering: each accumulated buffer stands alone.
        let partial = render_markdown("#cat ");
        let full = render_markdown("#cat #dog");
        assert_ne!(partial, full);
        assert!(full.contains("#dog"));
    }
}
