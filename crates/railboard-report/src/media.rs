//! Byte-budgeted media transformation for attachment payloads.
//!
//! Images are decoded, downscaled and re-encoded against a byte budget;
//! everything else is copied verbatim. The transcode is an explicit
//! ordered fallback chain: any failure inside it is logged with its cause
//! and degrades to a verbatim copy of the original bytes, never an error.

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use railboard_core::PipelineConfig;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// What landed at the destination path.
#[derive(Debug, Clone)]
pub struct MediaOutcome {
    /// Final written size (the downloaded/emitted size, not the declared one).
    pub size: u64,
    pub is_image: bool,
    pub content_type: String,
}

#[derive(Error, Debug)]
enum MediaError {
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi", "mkv", "m4v"];

/// File extension for a declared content type, used when an attachment
/// name arrives without one.
pub fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/bmp" => Some("bmp"),
        "image/webp" => Some("webp"),
        "video/mp4" => Some("mp4"),
        "video/webm" => Some("webm"),
        "video/quicktime" => Some("mov"),
        "text/plain" => Some("txt"),
        "text/html" => Some("html"),
        "application/json" => Some("json"),
        "application/pdf" => Some("pdf"),
        "application/zip" => Some("zip"),
        _ => None,
    }
}

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}

/// Best-effort content type for a filename, for payloads declared without one.
pub fn guess_content_type(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("txt" | "log") => "text/plain",
        Some("html") => "text/html",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

pub fn is_image(content_type: Option<&str>, filename: &str) -> bool {
    if let Some(ct) = content_type {
        if ct.starts_with("image/") {
            return true;
        }
    }
    extension_of(filename)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

pub fn is_video(content_type: Option<&str>, filename: &str) -> bool {
    if let Some(ct) = content_type {
        if ct.starts_with("video/") {
            return true;
        }
    }
    extension_of(filename)
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Move a downloaded payload from its staging location to its final path,
/// transcoding images against the configured budget. Never fails on a
/// transcode problem; the verbatim copy is the terminal fallback.
pub fn finalize(
    src: &Path,
    dest: &Path,
    declared_type: Option<&str>,
    filename: &str,
    config: &PipelineConfig,
) -> io::Result<MediaOutcome> {
    let image_kind = is_image(declared_type, filename);
    if image_kind {
        match compress_image(src, dest, config) {
            Ok(outcome) => return Ok(outcome),
            Err(e) => warn!("image processing of {filename} failed ({e}); copying original bytes"),
        }
    }

    let size = fs::copy(src, dest)?;
    let content_type = declared_type
        .map(str::to_string)
        .unwrap_or_else(|| guess_content_type(filename).to_string());
    Ok(MediaOutcome {
        size,
        is_image: image_kind,
        content_type,
    })
}

fn compress_image(
    src: &Path,
    dest: &Path,
    config: &PipelineConfig,
) -> Result<MediaOutcome, MediaError> {
    let reader = image::ImageReader::open(src)?.with_guessed_format()?;
    let format = reader.format();
    let mut img = reader.decode()?;

    let max_dim = config.max_image_dimension;
    if img.width() > max_dim || img.height() > max_dim {
        debug!(
            "downscaling {}x{} image to fit {max_dim}px",
            img.width(),
            img.height()
        );
        img = img.resize(max_dim, max_dim, FilterType::Lanczos3);
    }

    let (bytes, content_type) = if format == Some(ImageFormat::Png) {
        (encode_png(&img)?, "image/png")
    } else {
        (encode_jpeg_within_budget(&img, config)?, "image/jpeg")
    };

    fs::write(dest, &bytes)?;
    Ok(MediaOutcome {
        size: bytes.len() as u64,
        is_image: true,
        content_type: content_type.to_string(),
    })
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, MediaError> {
    let mut buf = Vec::new();
    let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
    img.write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, MediaError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    img.to_rgb8().write_with_encoder(encoder)?;
    Ok(buf)
}

/// Encode as JPEG, stepping quality down to the floor while over budget;
/// at the floor, shrink dimensions by sqrt(budget / size) and re-encode
/// once more. A small input takes the single initial encode pass.
fn encode_jpeg_within_budget(
    img: &DynamicImage,
    config: &PipelineConfig,
) -> Result<Vec<u8>, MediaError> {
    let budget = config.attachment_byte_budget;
    let floor = config.jpeg_quality_floor;
    let step = config.jpeg_quality_step.max(1);

    let mut quality = config.jpeg_quality;
    let mut bytes = encode_jpeg(img, quality)?;
    while bytes.len() as u64 > budget && quality > floor {
        quality = quality.saturating_sub(step).max(floor);
        debug!("re-encoding at quality {quality} ({} bytes over budget)", bytes.len());
        bytes = encode_jpeg(img, quality)?;
    }

    if bytes.len() as u64 > budget {
        let ratio = (budget as f64 / bytes.len() as f64).sqrt();
        let width = ((f64::from(img.width()) * ratio) as u32).max(1);
        let height = ((f64::from(img.height()) * ratio) as u32).max(1);
        debug!("still over budget at floor quality; shrinking to {width}x{height}");
        let shrunk = img.resize(width, height, FilterType::Lanczos3);
        bytes = encode_jpeg(&shrunk, floor)?;
    }
    Ok(bytes)
}

/// Base64 data URI for a finalized payload, for inline embedding.
pub fn inline_data_uri(path: &Path, content_type: &str) -> io::Result<String> {
    let bytes = fs::read(path)?;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{content_type};base64,{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn write_test_png(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 31 % 256) as u8, (y * 17 % 256) as u8, ((x + y) % 256) as u8])
        });
        img.save_with_format(path, ImageFormat::Png).unwrap();
    }

    fn write_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 13 % 256) as u8, (y * 7 % 256) as u8, ((x * y) % 256) as u8])
        });
        img.save_with_format(path, ImageFormat::Jpeg).unwrap();
    }

    #[test]
    fn kind_detection_prefers_content_type() {
        assert!(is_image(Some("image/webp"), "evidence"));
        assert!(is_image(None, "shot.PNG"));
        assert!(!is_image(Some("text/plain"), "notes.txt"));
        assert!(is_video(Some("video/mp4"), "clip"));
        assert!(is_video(None, "clip.webm"));
        assert!(!is_video(None, "shot.png"));
    }

    #[test]
    fn small_image_takes_a_single_encode_pass() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.png");
        let dest = dir.path().join("out.png");
        write_test_png(&src, 50, 50);

        let config = PipelineConfig::default();
        let outcome = finalize(&src, &dest, Some("image/png"), "out.png", &config).unwrap();
        assert!(outcome.is_image);
        assert_eq!(outcome.content_type, "image/png");
        assert!(outcome.size <= config.attachment_byte_budget);

        // Idempotence of the size class: re-running the pipeline on its own
        // output produces the same single-pass encode.
        let again = dir.path().join("again.png");
        let second = finalize(&dest, &again, Some("image/png"), "again.png", &config).unwrap();
        assert_eq!(second.content_type, "image/png");
        let reloaded = image::ImageReader::open(&again).unwrap().decode().unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (50, 50));
    }

    #[test]
    fn oversized_dimensions_are_downscaled() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("big.png");
        let dest = dir.path().join("out.png");
        write_test_png(&src, 300, 120);

        let config = PipelineConfig {
            max_image_dimension: 100,
            ..PipelineConfig::default()
        };
        finalize(&src, &dest, Some("image/png"), "out.png", &config).unwrap();
        let out = image::ImageReader::open(&dest).unwrap().decode().unwrap();
        assert_eq!(out.width(), 100);
        assert_eq!(out.height(), 40); // aspect preserved
    }

    #[test]
    fn non_png_raster_reencodes_as_jpeg_within_budget() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("noise.jpg");
        let dest = dir.path().join("out.jpg");
        write_test_jpeg(&src, 400, 400);

        let config = PipelineConfig {
            max_image_dimension: 1400,
            attachment_byte_budget: 8 * 1024,
            jpeg_quality: 85,
            jpeg_quality_floor: 40,
            jpeg_quality_step: 10,
            ..PipelineConfig::default()
        };
        let outcome = finalize(&src, &dest, Some("image/jpeg"), "out.jpg", &config).unwrap();
        assert_eq!(outcome.content_type, "image/jpeg");
        let original = std::fs::metadata(&src).unwrap().len();
        assert!(outcome.size < original);
        // The sqrt shrink runs once at floor quality, so the result lands
        // near the budget even for incompressible input.
        assert!(outcome.size <= config.attachment_byte_budget * 2);
    }

    #[test]
    fn undecodable_image_falls_back_to_verbatim_copy() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("corrupt.png");
        let dest = dir.path().join("out.png");
        fs::write(&src, b"definitely not a png").unwrap();

        let outcome = finalize(
            &src,
            &dest,
            Some("image/png"),
            "out.png",
            &PipelineConfig::default(),
        )
        .unwrap();
        assert!(outcome.is_image);
        assert_eq!(outcome.size, 20);
        assert_eq!(fs::read(&dest).unwrap(), b"definitely not a png");
    }

    #[test]
    fn non_image_payload_copies_byte_for_byte() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("trace.log");
        let dest = dir.path().join("out.log");
        fs::write(&src, b"line one\nline two\n").unwrap();

        let outcome = finalize(&src, &dest, None, "out.log", &PipelineConfig::default()).unwrap();
        assert!(!outcome.is_image);
        assert_eq!(outcome.content_type, "text/plain");
        assert_eq!(fs::read(&dest).unwrap(), fs::read(&src).unwrap());
    }

    #[test]
    fn data_uri_has_content_type_and_base64_payload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.txt");
        fs::write(&path, b"ok").unwrap();
        let uri = inline_data_uri(&path, "text/plain").unwrap();
        assert_eq!(uri, "data:text/plain;base64,b2s=");
    }
}
