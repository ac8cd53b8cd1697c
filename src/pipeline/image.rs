//! Image conversions: re-encode between raster formats or embed into PDF.

use crate::error::MorphError;
use crate::formats::Target;
use image::{DynamicImage, RgbImage};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref};
use std::path::Path;
use tracing::debug;

/// Convert the image at `input` to `target`, writing to `output`.
pub fn convert_image(input: &Path, target: Target, output: &Path) -> Result<(), MorphError> {
    let img = image::open(input).map_err(|e| MorphError::ImageFailed {
        path: input.to_path_buf(),
        source: e,
    })?;
    debug!(
        "Decoded {} ({}x{}), encoding as {}",
        input.display(),
        img.width(),
        img.height(),
        target
    );

    match target {
        Target::Png => save_as(&img, image::ImageFormat::Png, output),
        Target::Webp => save_webp(&img, output),
        Target::Pdf => embed_in_pdf(&img, output),
        other => Err(MorphError::Internal(format!(
            "image handler asked for non-image target {other}"
        ))),
    }
}

fn save_as(
    img: &DynamicImage,
    format: image::ImageFormat,
    output: &Path,
) -> Result<(), MorphError> {
    img.save_with_format(output, format)
        .map_err(|e| MorphError::ImageFailed {
            path: output.to_path_buf(),
            source: e,
        })
}

/// The `image` crate's WebP encoder is lossless-only, which suits a
/// format converter: no generation loss on repeated round trips.
fn save_webp(img: &DynamicImage, output: &Path) -> Result<(), MorphError> {
    let rgba = img.to_rgba8();
    let file = std::fs::File::create(output).map_err(|e| MorphError::OutputWriteFailed {
        path: output.to_path_buf(),
        source: e,
    })?;
    image::codecs::webp::WebPEncoder::new_lossless(std::io::BufWriter::new(file))
        .encode(
            &rgba,
            rgba.width(),
            rgba.height(),
            image::ExtendedColorType::Rgba8,
        )
        .map_err(|e| MorphError::ImageFailed {
            path: output.to_path_buf(),
            source: e,
        })
}

/// Write a single-page PDF whose page is exactly the image's pixel size in
/// points, with the bitmap embedded as an uncompressed RGB image XObject.
/// Alpha is flattened against white first since the XObject carries no mask.
fn embed_in_pdf(img: &DynamicImage, output: &Path) -> Result<(), MorphError> {
    let rgb = flatten_to_rgb(img);
    let (width, height) = (rgb.width(), rgb.height());

    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let image_id = Ref::new(5);
    let image_name = Name(b"Im1");

    pdf.catalog(catalog_id).pages(page_tree_id);

    {
        let mut xobject = pdf.image_xobject(image_id, rgb.as_raw());
        xobject.width(width as i32);
        xobject.height(height as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
    }

    let mut content = Content::new();
    content.save_state();
    content.transform([width as f32, 0.0, 0.0, height as f32, 0.0, 0.0]);
    content.x_object(image_name);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, width as f32, height as f32));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(image_name, image_id);
    page.finish();

    pdf.pages(page_tree_id).kids([page_id]).count(1);

    std::fs::write(output, pdf.finish()).map_err(|e| MorphError::OutputWriteFailed {
        path: output.to_path_buf(),
        source: e,
    })
}

/// Composite over a white background, dropping the alpha channel.
fn flatten_to_rgb(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (out, src) in rgb.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u16;
        for channel in 0..3 {
            let value = src[channel] as u16;
            out[channel] = ((value * alpha + 255 * (255 - alpha)) / 255) as u8;
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checker(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbaImage::new(width, height);
        for (x, y, p) in img.enumerate_pixels_mut() {
            *p = if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            };
        }
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn png_round_trip_preserves_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.png");
        checker(8, 6).save(&src).unwrap();

        let out = dir.path().join("out.webp");
        convert_image(&src, Target::Webp, &out).unwrap();

        let decoded = image::open(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (8, 6));
    }

    #[test]
    fn pdf_embedding_writes_image_xobject() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.png");
        checker(4, 4).save(&src).unwrap();

        let out = dir.path().join("out.pdf");
        convert_image(&src, Target::Pdf, &out).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        assert_eq!(&bytes[..4], b"%PDF");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/XObject"));
        assert!(text.contains("/DeviceRGB"));
    }

    #[test]
    fn transparent_pixels_flatten_to_white() {
        let mut img = RgbaImage::new(1, 1);
        img.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let rgb = flatten_to_rgb(&DynamicImage::ImageRgba8(img));
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn non_image_target_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("in.png");
        checker(2, 2).save(&src).unwrap();

        let err = convert_image(&src, Target::Mp3, &dir.path().join("x.mp3")).unwrap_err();
        assert!(matches!(err, MorphError::Internal(_)));
    }
}
