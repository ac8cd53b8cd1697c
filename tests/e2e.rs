//! End-to-end integration tests for filemorph.
//!
//! Document, image and layout round trips run everywhere; tests that need
//! a system TrueType font or an ffmpeg binary probe for the dependency
//! first and skip with a message when it is absent, so the suite passes
//! on bare CI machines without silently losing coverage elsewhere.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use filemorph::{convert, convert_bytes, convert_many, ConversionConfig, Category, Target};
use std::io::Write;
use std::path::Path;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn test_config(root: &Path) -> ConversionConfig {
    ConversionConfig::builder()
        .output_dir(root.join("converted"))
        .upload_dir(root.join("uploads"))
        .build()
        .unwrap()
}

/// Skip this test unless a system TrueType font can be resolved.
macro_rules! skip_unless_font {
    () => {{
        match filemorph::fonts::resolve_font_path(None) {
            Ok(p) => p,
            Err(_) => {
                println!("SKIP — no DejaVu/Liberation font found on this system");
                return;
            }
        }
    }};
}

/// Skip this test unless an ffmpeg binary is on PATH.
macro_rules! skip_unless_ffmpeg {
    () => {{
        let available = std::process::Command::new("ffmpeg")
            .arg("-version")
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false);
        if !available {
            println!("SKIP — ffmpeg not found on PATH");
            return;
        }
    }};
}

fn write_sample_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let document = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    writer
        .start_file("[Content_Types].xml", options)
        .unwrap();
    writer
        .write_all(b"<?xml version=\"1.0\"?><Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>")
        .unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.finish().unwrap();
}

/// Minimal 44-byte WAV header plus a short burst of silence.
fn write_sample_wav(path: &Path) {
    let sample_rate: u32 = 8000;
    let samples: u32 = 8000; // one second
    let data_len = samples * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
    bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    bytes.resize(44 + data_len as usize, 0);
    std::fs::write(path, bytes).unwrap();
}

// ── Document round trips ─────────────────────────────────────────────────────

#[tokio::test]
async fn txt_to_pdf_and_back_preserves_text() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("story.txt");
    std::fs::write(&src, "The quick brown fox\n\njumps over the lazy dog\n").unwrap();

    let pdf = convert(src.to_str().unwrap(), Target::Pdf, &config)
        .await
        .expect("txt -> pdf should succeed");
    assert!(pdf.file_name.ends_with(".pdf"));
    assert_eq!(&std::fs::read(&pdf.path).unwrap()[..4], b"%PDF");

    // Round trip through our own extractor.
    let txt = convert(pdf.path.to_str().unwrap(), Target::Txt, &config)
        .await
        .expect("pdf -> txt should succeed");
    let text = std::fs::read_to_string(&txt.path).unwrap();
    assert!(text.contains("quick brown fox"), "got: {text:?}");
    assert!(text.contains("lazy dog"), "got: {text:?}");
}

#[tokio::test]
async fn docx_to_txt_extracts_paragraphs() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("report.docx");
    write_sample_docx(&src, &["First paragraph", "Second one"]);

    let output = convert(src.to_str().unwrap(), Target::Txt, &config)
        .await
        .expect("docx -> txt should succeed");
    let text = std::fs::read_to_string(&output.path).unwrap();
    assert_eq!(text, "First paragraph\nSecond one\n");
}

#[tokio::test]
async fn docx_to_pdf_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("memo.docx");
    write_sample_docx(&src, &["A short memo body that fits on one line."]);

    let output = convert(src.to_str().unwrap(), Target::Pdf, &config)
        .await
        .expect("docx -> pdf should succeed");
    assert_eq!(output.category, Category::Document);
    assert!(output.bytes_written > 0);
}

#[tokio::test]
async fn long_txt_to_png_paginates_into_numbered_files() {
    skip_unless_font!();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    // 1400px page, 30px pitch, 30px margin: 45 lines fit, 90 force page 2.
    let text: String = (0..90).map(|i| format!("line number {i}\n")).collect();
    let src = dir.path().join("long.txt");
    std::fs::write(&src, text).unwrap();

    let output = convert(src.to_str().unwrap(), Target::Png, &config)
        .await
        .expect("txt -> png should succeed");

    assert!(!output.extra_pages.is_empty(), "expected multiple pages");
    for page in output.all_paths() {
        let img = image::open(page).expect("each page decodes as PNG");
        assert_eq!((img.width(), img.height()), (1000, 1400));
    }
    let second = output.extra_pages[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(second.ends_with("-2.png"), "got: {second}");
}

#[tokio::test]
async fn failed_png_page_removes_earlier_pages() {
    let font_path = skip_unless_font!();
    let font = filemorph::fonts::RasterFont::load(Some(&font_path)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    // A directory in the page-2 slot makes that page's write fail.
    let base = dir.path().join("pages.png");
    std::fs::create_dir(dir.path().join("pages-2.png")).unwrap();

    let paragraphs: Vec<String> = (0..90).map(|i| format!("line number {i}")).collect();
    let err =
        filemorph::pipeline::render::render_text_to_png(&paragraphs, &config, &font, &base)
            .unwrap_err();
    assert!(matches!(err, filemorph::MorphError::OutputWriteFailed { .. }));
    assert!(!base.exists(), "page 1 must not survive a failed page 2");
}

// ── Image round trips ────────────────────────────────────────────────────────

fn write_sample_image(path: &Path) {
    let mut img = image::RgbImage::new(16, 16);
    for (x, _, p) in img.enumerate_pixels_mut() {
        *p = image::Rgb([(x * 16) as u8, 64, 128]);
    }
    img.save(path).unwrap();
}

#[tokio::test]
async fn png_to_webp_to_pdf_chain() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("gradient.png");
    write_sample_image(&src);

    let webp = convert(src.to_str().unwrap(), Target::Webp, &config)
        .await
        .expect("png -> webp should succeed");
    let decoded = image::open(&webp.path).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 16));

    let pdf = convert(webp.path.to_str().unwrap(), Target::Pdf, &config)
        .await
        .expect("webp -> pdf should succeed");
    assert_eq!(&std::fs::read(&pdf.path).unwrap()[..4], b"%PDF");
}

// ── Media round trips (ffmpeg) ───────────────────────────────────────────────

#[tokio::test]
async fn wav_to_ogg_transcodes() {
    skip_unless_ffmpeg!();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("tone.wav");
    write_sample_wav(&src);

    let output = convert(src.to_str().unwrap(), Target::Ogg, &config)
        .await
        .expect("wav -> ogg should succeed");
    assert!(output.file_name.ends_with(".ogg"));
    assert!(output.bytes_written > 0);
    assert_eq!(&std::fs::read(&output.path).unwrap()[..4], b"OggS");
}

#[tokio::test]
async fn garbage_audio_fails_and_removes_partial_output() {
    skip_unless_ffmpeg!();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("noise.wav");
    std::fs::write(&src, b"this is not audio data").unwrap();

    let err = convert(src.to_str().unwrap(), Target::Mp3, &config)
        .await
        .expect_err("garbage input should fail");
    let msg = err.to_string();
    assert!(msg.contains("ffmpeg"), "got: {msg}");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("converted"))
        .unwrap()
        .collect();
    assert!(leftovers.is_empty(), "partial output not removed");
}

// ── Upload spooling and batches ──────────────────────────────────────────────

#[tokio::test]
async fn convert_bytes_behaves_like_a_web_upload() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let output = convert_bytes(b"uploaded body\n", "txt", Target::Pdf, &config)
        .await
        .expect("byte upload should convert");
    assert!(output.file_name.starts_with("converted_"));
    assert_eq!(&std::fs::read(&output.path).unwrap()[..4], b"%PDF");
}

#[tokio::test]
async fn mixed_batch_reports_each_input() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    std::fs::write(&a, "alpha\n").unwrap();
    std::fs::write(&b, "beta\n").unwrap();

    let inputs = vec![
        a.to_string_lossy().into_owned(),
        "missing.txt".to_string(),
        b.to_string_lossy().into_owned(),
    ];
    let items = convert_many(&inputs, Target::Pdf, &config).await;

    assert_eq!(items.len(), 3);
    assert!(matches!(
        items[0].outcome,
        filemorph::BatchOutcome::Converted { .. }
    ));
    assert!(matches!(
        items[1].outcome,
        filemorph::BatchOutcome::Failed { .. }
    ));
    assert!(matches!(
        items[2].outcome,
        filemorph::BatchOutcome::Converted { .. }
    ));
}

// ── Raster font behaviour ────────────────────────────────────────────────────

#[tokio::test]
async fn raster_font_measures_monotonically() {
    let font_path = skip_unless_font!();
    let font = filemorph::fonts::RasterFont::load(Some(&font_path)).unwrap();

    let short = font.measure("hi", 20.0);
    let long = font.measure("hi there, much longer line", 20.0);
    assert!(short > 0.0);
    assert!(long > short);

    let doubled = font.measure("hi", 40.0);
    assert!((doubled / short - 2.0).abs() < 0.01, "advance should scale linearly");

    assert!(font.has_glyph('A'));
}

#[tokio::test]
async fn png_pages_are_not_blank() {
    skip_unless_font!();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());
    let src = dir.path().join("hello.txt");
    std::fs::write(&src, "Hello, raster world!\n").unwrap();

    let output = convert(src.to_str().unwrap(), Target::Png, &config)
        .await
        .expect("txt -> png should succeed");

    let img = image::open(&output.path).unwrap().to_luma8();
    let dark = img.pixels().filter(|p| p.0[0] < 128).count();
    assert!(dark > 0, "rendered page contains no dark pixels");
}

// ── URL classification (no network) ──────────────────────────────────────────

#[tokio::test]
async fn unknown_extension_is_rejected_before_any_io() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let err = convert("data.tar.gz", Target::Pdf, &config)
        .await
        .expect_err("unknown extension should fail");
    assert!(err.to_string().contains("gz"), "got: {err}");
}
