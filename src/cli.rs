use clap::{Parser, Subcommand};
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::config::Config;
use crate::constants::SUPPORTED_EXTENSIONS;
use crate::error::{AppError, AppResult};
use crate::models::SelectedImage;
use crate::services::export::write_export_file;
use crate::services::{Annotator, GeminiProvider, KeywordProvider};
use crate::utils::guess_mime_type;

#[derive(Parser)]
#[command(name = "tagsmith")]
#[command(author, version, about = "Batch image annotator: streamed keyword tags via Gemini", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve,

    /// Annotate image files or folders from the command line
    Annotate {
        /// Image files or directories to annotate
        paths: Vec<PathBuf>,

        /// Where to write the aggregated keywords (export variant only)
        #[arg(long, default_value = "keywords.json")]
        out: PathBuf,
    },
}

pub async fn handle_annotate(config: &Config, paths: &[PathBuf], out: &Path) -> AppResult<()> {
    let images = collect_images(paths);

    if images.is_empty() {
        return Err(AppError::BadRequest(
            "Please select at least one image.".to_string(),
        ));
    }

    info!("annotating {} image(s)", images.len());

    let provider: Arc<dyn KeywordProvider> = Arc::new(GeminiProvider::new(
        config.api_key.clone(),
        config.model.clone(),
    ));
    let annotator = Annotator::new(provider, config.variant);

    // Echo fragments as they arrive, one heading per file.
    let mut current = String::new();
    let mut observer = move |file: &str, fragment: &str| {
        if current != file {
            current = file.to_string();
            println!("\n== {} ==", file);
        }
        print!("{}", fragment);
        let _ = std::io::stdout().flush();
    };

    let report = annotator.process_with(&images, &mut observer).await;
    println!();

    for annotation in &report.annotations {
        if let Some(err) = &annotation.error {
            error!("{}: {}", annotation.file_name, err);
            println!("{}: Error: {}", annotation.file_name, err);
        } else if config.variant.export_enabled() {
            println!(
                "{}: {} keyword(s)",
                annotation.file_name,
                annotation.keywords.len()
            );
        }
    }

    if let Some(json) = &report.export_json {
        write_export_file(out, json)?;
        println!("Keywords written to {}", out.display());
    }

    Ok(())
}

/// Expand the given paths into annotatable images, in encounter order.
/// Directories are walked recursively; unsupported extensions are skipped;
/// unreadable files are reported and skipped without stopping the rest.
fn collect_images(paths: &[PathBuf]) -> Vec<SelectedImage> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).into_iter().filter_map(|e| e.ok()) {
                if entry.path().is_file() {
                    push_image(&mut images, entry.path());
                }
            }
        } else {
            push_image(&mut images, path);
        }
    }

    images
}

fn push_image(images: &mut Vec<SelectedImage>, path: &Path) {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return;
    };
    let Some(mime_type) = guess_mime_type(file_name) else {
        return;
    };
    if !has_supported_extension(file_name) {
        return;
    }

    match std::fs::read(path) {
        Ok(data) => images.push(SelectedImage {
            file_name: file_name.to_string(),
            mime_type: mime_type.to_string(),
            data,
        }),
        Err(e) => {
            error!("failed to read {}: {}", path.display(), e);
            println!("{}: Error: {}", path.display(), e);
        }
    }
}

fn has_supported_extension(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
