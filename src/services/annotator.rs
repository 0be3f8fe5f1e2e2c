use log::{error, info};
use std::sync::Arc;

use crate::config::Variant;
use crate::models::{FileAnnotation, ResultRecord, SelectedImage, SubmissionReport};
use crate::services::gemini::KeywordProvider;
use crate::services::markdown::render_markdown;
use crate::utils::extract_hashtags;

/// The per-submission pipeline: files are annotated one at a time, in the
/// order given, and one file's failure never stops the rest.
pub struct Annotator {
    provider: Arc<dyn KeywordProvider>,
    variant: Variant,
}

impl Annotator {
    pub fn new(provider: Arc<dyn KeywordProvider>, variant: Variant) -> Self {
        Self { provider, variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub async fn process_submission(&self, images: &[SelectedImage]) -> SubmissionReport {
        self.process_with(images, &mut |_, _| {}).await
    }

    /// Same as `process_submission`, with a hook called once per streamed
    /// fragment (file name, fragment). The CLI uses it to echo progress.
    pub async fn process_with(
        &self,
        images: &[SelectedImage],
        observer: &mut (dyn FnMut(&str, &str) + Send),
    ) -> SubmissionReport {
        let mut annotations = Vec::with_capacity(images.len());
        let mut records: Vec<ResultRecord> = Vec::new();

        for image in images {
            info!(
                "annotating {} ({}, {} bytes) via {}",
                image.file_name,
                image.mime_type,
                image.data.len(),
                self.provider.name()
            );

            match self.annotate_one(image, observer).await {
                Ok((text, html)) => {
                    let keywords = if self.variant.export_enabled() {
                        extract_hashtags(&text)
                    } else {
                        Vec::new()
                    };

                    if self.variant.export_enabled() {
                        records.push(ResultRecord {
                            file: image.file_name.clone(),
                            keywords: keywords.clone(),
                        });
                    }

                    annotations.push(FileAnnotation {
                        file_name: image.file_name.clone(),
                        text,
                        html,
                        keywords,
                        error: None,
                    });
                }
                Err(e) => {
                    // Per-file isolation: report inline, keep going.
                    error!("annotation failed for {}: {:#}", image.file_name, e);
                    annotations.push(FileAnnotation {
                        file_name: image.file_name.clone(),
                        text: String::new(),
                        html: String::new(),
                        keywords: Vec::new(),
                        error: Some(format!("{:#}", e)),
                    });
                }
            }
        }

        let export_json = if self.variant.export_enabled() {
            // Aggregate contents are taken as-is; no further validation.
            serde_json::to_string_pretty(&records).ok()
        } else {
            None
        };

        SubmissionReport {
            annotations,
            export_json,
        }
    }

    /// Streams one image's annotation. The buffer grows fragment by
    /// fragment and is re-rendered from scratch after every append
    /// (quadratic, fine for short keyword lists).
    async fn annotate_one(
        &self,
        image: &SelectedImage,
        observer: &mut (dyn FnMut(&str, &str) + Send),
    ) -> anyhow::Result<(String, String)> {
        let mut buffer = String::new();
        let mut html = String::new();

        {
            let mut on_fragment = |fragment: &str| {
                buffer.push_str(fragment);
                html = render_markdown(&buffer);
                observer(&image.file_name, fragment);
            };

            self.provider
                .annotate_stream(image, self.variant.prompt(), &mut on_fragment)
                .await?;
        }

        Ok((buffer, html))
    }
}
