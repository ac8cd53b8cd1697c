//! Conversion entry points.
//!
//! [`convert`] is the primary API: resolve a path or URL, route on the
//! input's category, run the matching handler, return an output record.
//! [`convert_bytes`] spools an in-memory buffer first, which is the
//! embedding point for an upload handler. [`convert_many`] runs a batch
//! with bounded concurrency without letting one bad input sink the rest.

use crate::config::ConversionConfig;
use crate::error::MorphError;
use crate::fonts::RasterFont;
use crate::formats::{Category, Target};
use crate::naming::{allocate_output, spool_upload, AllocatedOutput};
use crate::output::{BatchItem, BatchOutcome, ConversionOutput, ConversionStats};
use crate::pipeline::{cleanup, extract, image, input, media, render};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert a local file or URL to `target`.
///
/// # Errors
/// Returns a typed [`MorphError`] when the input cannot be resolved, the
/// extension maps to no category, the category does not offer `target`,
/// or the handler fails. On handler failure the allocated output file is
/// removed, so no partial artifact is left behind.
pub async fn convert(
    input_str: impl AsRef<str>,
    target: Target,
    config: &ConversionConfig,
) -> Result<ConversionOutput, MorphError> {
    let total_start = Instant::now();
    let input_str = input_str.as_ref();
    info!("Starting conversion: {} -> {}", input_str, target);

    let resolve_start = Instant::now();
    let resolved = input::resolve_input(input_str, config.download_timeout_secs).await?;
    let resolve_duration_ms = resolve_start.elapsed().as_millis() as u64;

    let category = resolved.category;
    if !category.allows(target) {
        return Err(MorphError::UnsupportedTarget { category, target });
    }

    let allocated = allocate_output(&config.output_dir, target)?;
    debug!("Allocated output {}", allocated.path.display());

    let convert_start = Instant::now();
    let handler_result = run_handler(&resolved, target, config, &allocated).await;
    let convert_duration_ms = convert_start.elapsed().as_millis() as u64;

    let extra_pages = match handler_result {
        Ok(extra) => extra,
        Err(e) => {
            remove_quietly(&allocated.path);
            return Err(e);
        }
    };

    let bytes_written = std::fs::metadata(&allocated.path).map(|m| m.len()).unwrap_or(0);
    let stats = ConversionStats {
        resolve_duration_ms,
        convert_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "Conversion complete: {} ({} bytes, {}ms)",
        allocated.file_name, bytes_written, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        path: allocated.path,
        file_name: allocated.file_name,
        category,
        target,
        extra_pages,
        bytes_written,
        stats,
    })
}

/// Route to the category handler. Returns extra page paths for multi-page
/// raster output, empty otherwise.
async fn run_handler(
    resolved: &input::ResolvedInput,
    target: Target,
    config: &ConversionConfig,
    allocated: &AllocatedOutput,
) -> Result<Vec<PathBuf>, MorphError> {
    let input_path = resolved.path().to_path_buf();
    let output_path = allocated.path.clone();

    match resolved.category {
        Category::Image => {
            run_blocking(move || image::convert_image(&input_path, target, &output_path)).await?;
            Ok(Vec::new())
        }
        Category::Document => {
            let extension = resolved.extension.clone();
            let config = config.clone();
            run_blocking(move || {
                convert_document(&input_path, &extension, target, &config, &output_path)
            })
            .await
        }
        Category::Audio | Category::Video => {
            media::convert_media(&input_path, target, config, &output_path).await?;
            Ok(Vec::new())
        }
    }
}

/// Extract, clean, then render to the requested document format.
fn convert_document(
    input_path: &Path,
    extension: &str,
    target: Target,
    config: &ConversionConfig,
    output_path: &Path,
) -> Result<Vec<PathBuf>, MorphError> {
    let paragraphs = extract::extract_paragraphs(input_path, extension)?;
    let paragraphs = cleanup::clean_paragraphs(paragraphs);

    match target {
        Target::Txt => {
            let mut text = paragraphs.join("\n");
            text.push('\n');
            std::fs::write(output_path, text).map_err(|e| MorphError::OutputWriteFailed {
                path: output_path.to_path_buf(),
                source: e,
            })?;
            Ok(Vec::new())
        }
        Target::Pdf => {
            render::render_text_to_pdf(&paragraphs, config, output_path)?;
            Ok(Vec::new())
        }
        Target::Png => {
            let font = RasterFont::load(config.font_path.as_deref())?;
            let pages = render::render_text_to_png(&paragraphs, config, &font, output_path)?;
            // Page 1 is the allocated output itself.
            Ok(pages.into_iter().skip(1).collect())
        }
        other => Err(MorphError::Internal(format!(
            "document handler asked for non-document target {other}"
        ))),
    }
}

/// CPU-bound handlers run off the async runtime.
async fn run_blocking<T, F>(f: F) -> Result<T, MorphError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, MorphError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| MorphError::Internal(format!("blocking task panicked: {e}")))?
}

/// Convert in-memory bytes tagged with their source `extension`.
///
/// The buffer is spooled to the upload directory under a unique name and
/// removed again once the conversion finishes, either way.
pub async fn convert_bytes(
    bytes: &[u8],
    extension: &str,
    target: Target,
    config: &ConversionConfig,
) -> Result<ConversionOutput, MorphError> {
    let spooled = spool_upload(&config.upload_dir, extension, bytes)?;
    let result = convert(spooled.to_string_lossy(), target, config).await;
    remove_quietly(&spooled);
    result
}

/// Convert a batch of inputs to the same `target` with bounded concurrency.
///
/// Results come back in input order. A failed input is reported in its
/// [`BatchItem`] rather than failing the whole batch.
pub async fn convert_many(
    inputs: &[String],
    target: Target,
    config: &ConversionConfig,
) -> Vec<BatchItem> {
    let mut items: Vec<(usize, BatchItem)> = stream::iter(inputs.iter().enumerate().map(
        |(index, input_str)| async move {
            let outcome = match convert(input_str, target, config).await {
                Ok(output) => BatchOutcome::Converted { output },
                Err(e) => {
                    warn!("Batch input {} failed: {}", input_str, e);
                    BatchOutcome::Failed {
                        error: e.to_string(),
                    }
                }
            };
            (
                index,
                BatchItem {
                    input: input_str.clone(),
                    outcome,
                },
            )
        },
    ))
    .buffer_unordered(config.concurrency)
    .collect()
    .await;

    items.sort_by_key(|(index, _)| *index);
    items.into_iter().map(|(_, item)| item).collect()
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    input_str: impl AsRef<str>,
    target: Target,
    config: &ConversionConfig,
) -> Result<ConversionOutput, MorphError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MorphError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert(input_str, target, config))
}

fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &Path) -> ConversionConfig {
        ConversionConfig::builder()
            .output_dir(dir.join("converted"))
            .upload_dir(dir.join("uploads"))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn txt_to_txt_normalizes_line_endings() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let src = dir.path().join("in.txt");
        std::fs::write(&src, "one\r\ntwo\r\n").unwrap();

        let output = convert(src.to_str().unwrap(), Target::Txt, &config)
            .await
            .unwrap();
        assert_eq!(output.category, Category::Document);
        assert!(output.extra_pages.is_empty());
        assert_eq!(std::fs::read_to_string(&output.path).unwrap(), "one\ntwo\n");
    }

    #[tokio::test]
    async fn txt_to_pdf_produces_pdf_magic() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let src = dir.path().join("in.txt");
        std::fs::write(&src, "hello world\nsecond line\n").unwrap();

        let output = convert(src.to_str().unwrap(), Target::Pdf, &config)
            .await
            .unwrap();
        assert!(output.file_name.starts_with("converted_"));
        assert!(output.file_name.ends_with(".pdf"));
        let bytes = std::fs::read(&output.path).unwrap();
        assert_eq!(&bytes[..4], b"%PDF");
        assert_eq!(output.bytes_written, bytes.len() as u64);
    }

    #[tokio::test]
    async fn cross_category_target_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let src = dir.path().join("in.txt");
        std::fs::write(&src, "text").unwrap();

        let err = convert(src.to_str().unwrap(), Target::Mp3, &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MorphError::UnsupportedTarget {
                category: Category::Document,
                target: Target::Mp3,
            }
        ));
    }

    #[tokio::test]
    async fn failed_conversion_leaves_no_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let src = dir.path().join("broken.png");
        std::fs::write(&src, b"not an image at all").unwrap();

        let err = convert(src.to_str().unwrap(), Target::Webp, &config)
            .await
            .unwrap_err();
        assert!(matches!(err, MorphError::ImageFailed { .. }));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("converted"))
            .unwrap()
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn convert_bytes_spools_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let output = convert_bytes(b"spooled content\n", "txt", Target::Txt, &config)
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(&output.path).unwrap(),
            "spooled content\n"
        );

        let uploads: Vec<_> = std::fs::read_dir(dir.path().join("uploads"))
            .unwrap()
            .collect();
        assert!(uploads.is_empty());
    }

    #[tokio::test]
    async fn batch_reports_per_input_outcomes_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let good = dir.path().join("good.txt");
        std::fs::write(&good, "fine\n").unwrap();

        let inputs = vec![
            good.to_string_lossy().into_owned(),
            "/no/such/file.txt".to_string(),
        ];
        let items = convert_many(&inputs, Target::Txt, &config).await;

        assert_eq!(items.len(), 2);
        assert!(matches!(items[0].outcome, BatchOutcome::Converted { .. }));
        assert!(matches!(items[1].outcome, BatchOutcome::Failed { .. }));
        assert_eq!(items[1].input, "/no/such/file.txt");
    }
}
