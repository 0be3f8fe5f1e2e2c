use serde::Serialize;

/// One user-chosen image, read once at submission time.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Per-file outcome: either a rendered annotation or an inline error.
/// One of these backs each result container on the page.
#[derive(Debug, Clone, Serialize)]
pub struct FileAnnotation {
    pub file_name: String,
    /// Final accumulated response buffer, raw text.
    pub text: String,
    /// Markdown rendering of `text`, or the inline error markup.
    pub html: String,
    pub keywords: Vec<String>,
    pub error: Option<String>,
}

/// Entry of the exported keywords.json.
#[derive(Debug, Clone, Serialize)]
pub struct ResultRecord {
    pub file: String,
    pub keywords: Vec<String>,
}

/// Everything produced by one form submission. Scoped to that submission;
/// nothing survives into the next one.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    pub annotations: Vec<FileAnnotation>,
    /// Pretty-printed keywords.json payload, export variant only.
    pub export_json: Option<String>,
}
