use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use log::{debug, warn};
use serde::Serialize;
use tera::{Context, Tera};

use crate::constants::EXPORT_FILE_NAME;
use crate::error::{AppError, AppResult};
use crate::models::SelectedImage;
use crate::services::export::export_download_href;
use crate::services::Annotator;

/// One result container on the page.
#[derive(Debug, Serialize)]
struct ContainerView {
    anchor: String,
    file_name: String,
    html: String,
    error: Option<String>,
}

/// Form submission handler. Collects the uploaded images, runs the
/// sequential annotation pipeline, and renders one container per file.
/// Zero selected files yields a single validation message and no containers.
pub async fn annotate(
    payload: Multipart,
    tmpl: web::Data<Tera>,
    annotator: web::Data<Annotator>,
) -> AppResult<HttpResponse> {
    let images = collect_images(payload).await?;

    if images.is_empty() {
        warn!("submission with no files selected");
        return render_results(
            &tmpl,
            Some("Please select at least one image."),
            &[],
            None,
        );
    }

    let report = annotator.process_submission(&images).await;

    let containers: Vec<ContainerView> = report
        .annotations
        .iter()
        .map(|a| ContainerView {
            anchor: urlencoding::encode(&a.file_name).into_owned(),
            file_name: a.file_name.clone(),
            html: a.html.clone(),
            error: a.error.clone(),
        })
        .collect();

    let download_href = report.export_json.as_deref().map(export_download_href);

    render_results(&tmpl, None, &containers, download_href.as_deref())
}

fn render_results(
    tmpl: &Tera,
    validation_error: Option<&str>,
    containers: &[ContainerView],
    download_href: Option<&str>,
) -> AppResult<HttpResponse> {
    let mut context = Context::new();
    context.insert("validation_error", &validation_error);
    context.insert("containers", containers);
    context.insert("download_href", &download_href);
    context.insert("export_file_name", EXPORT_FILE_NAME);

    let rendered = tmpl
        .render("results.html", &context)
        .map_err(|e| AppError::Internal(format!("template error: {}", e)))?;
    Ok(HttpResponse::Ok().content_type("text/html").body(rendered))
}

/// Drain the multipart payload into in-memory images, preserving field
/// order. Browsers send one empty file part when nothing was chosen; such
/// parts are skipped, which is what makes the zero-file validation fire.
async fn collect_images(mut payload: Multipart) -> AppResult<Vec<SelectedImage>> {
    let mut images = Vec::new();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("invalid multipart payload: {}", e)))?
    {
        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string);

        let Some(file_name) = file_name.filter(|n| !n.is_empty()) else {
            continue;
        };

        let mime_type = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::BadRequest(format!("failed to read upload: {}", e)))?
        {
            data.extend_from_slice(&chunk);
        }

        if data.is_empty() {
            continue;
        }

        debug!("received {} ({}, {} bytes)", file_name, mime_type, data.len());
        images.push(SelectedImage {
            file_name,
            mime_type,
            data,
        });
    }

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use crate::services::KeywordProvider;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StubProvider;

    #[async_trait]
    impl KeywordProvider for StubProvider {
        async fn annotate_stream(
            &self,
            image: &SelectedImage,
            _prompt: &str,
            on_fragment: &mut (dyn for<'a> FnMut(&'a str) + Send),
        ) -> anyhow::Result<()> {
            if image.file_name.starts_with("bad") {
                anyhow::bail!("simulated model failure");
            }
            on_fragment("#cat ");
            on_fragment("#dog");
            Ok(())
        }

        fn name(&self) -> &'static str {
            "stub"
        }
    }

    fn test_tera() -> Tera {
        Tera::new("templates/**/*").expect("templates available in test cwd")
    }

    fn app_annotator() -> Annotator {
        Annotator::new(Arc::new(StubProvider), Variant::Export)
    }

    fn multipart_body(files: &[(&str, &[u8])]) -> (String, Vec<u8>) {
        let boundary = "testboundary";
        let mut body = Vec::new();
        for (name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                    boundary, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", boundary),
            body,
        )
    }

    async fn submit(files: &[(&str, &[u8])]) -> String {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_tera()))
                .app_data(web::Data::new(app_annotator()))
                .route("/annotate", web::post().to(annotate)),
        )
        .await;

        let (content_type, body) = multipart_body(files);
        let req = test::TestRequest::post()
            .uri("/annotate")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();

        let response = test::call_and_read_body(&app, req).await;
        String::from_utf8(response.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn zero_files_yields_one_validation_message_and_no_containers() {
        // A browser submits one empty part with filename="" when nothing
        // was chosen; that counts as no selection.
        let page = submit(&[("", b"")]).await;
        assert_eq!(page.matches("Please select at least one image.").count(), 1);
        assert!(!page.contains("class=\"result\""));
    }

    #[actix_web::test]
    async fn one_png_renders_keywords_and_download_link() {
        let page = submit(&[("x.png", b"fakepng")]).await;
        assert!(page.contains("x.png"));
        assert!(page.contains("#cat #dog"));
        assert!(page.contains("data:application/json;base64,"));
        assert!(page.contains("download=\"keywords.json\""));
    }

    #[actix_web::test]
    async fn containers_appear_in_submission_order_and_isolate_failures() {
        let page = submit(&[
            ("a.png", b"one"),
            ("bad.png", b"two"),
            ("c.png", b"three"),
        ])
        .await;

        let a = page.find("a.png").unwrap();
        let bad = page.find("bad.png").unwrap();
        let c = page.find("c.png").unwrap();
        assert!(a < bad && bad < c);

        assert_eq!(page.matches("class=\"result\"").count(), 3);
        assert!(page.contains("simulated model failure"));
        assert_eq!(page.matches("#cat #dog").count(), 2);
    }
}
