use crate::models::image_types::PreviewHandle;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;

const THUMBNAIL_SIZE: u32 = 128;
const THUMBNAIL_QUALITY: u8 = 60;

/// Encode bytes as a data URI, the way a browser file reader would.
pub fn data_uri(mime_type: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{};base64,{}", mime_type, b64)
}

/// Build the preview for an accepted image.
///
/// The data URI is always produced. Thumbnail and dimensions are best effort:
/// bytes the `image` crate cannot decode still get a preview, just without them.
pub fn build_preview(mime_type: &str, bytes: &[u8]) -> PreviewHandle {
    let original_uri = data_uri(mime_type, bytes);

    let img = match decode(bytes) {
        Ok(img) => img,
        Err(e) => {
            tracing::debug!(mime_type, error = %e, "preview decode skipped");
            return PreviewHandle {
                data_uri: original_uri,
                thumbnail: None,
                width: None,
                height: None,
            };
        }
    };

    let (width, height) = (img.width(), img.height());
    let orientation = read_orientation(bytes);

    // Resize before rotating; the bounding box is square so orientation does not matter yet.
    let mut thumb = img.resize(THUMBNAIL_SIZE, THUMBNAIL_SIZE, FilterType::Triangle);
    if orientation != 1 {
        thumb = apply_orientation(thumb, orientation);
    }

    let thumbnail = match encode_jpeg_thumbnail(&thumb) {
        Ok(jpeg) => Some(data_uri("image/jpeg", &jpeg)),
        Err(e) => {
            tracing::debug!(error = %e, "thumbnail encode failed");
            None
        }
    };

    PreviewHandle {
        data_uri: original_uri,
        thumbnail,
        width: Some(width),
        height: Some(height),
    }
}

fn decode(bytes: &[u8]) -> Result<image::DynamicImage, image::ImageError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .decode()
}

fn encode_jpeg_thumbnail(img: &image::DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, THUMBNAIL_QUALITY);
    // JPEG has no alpha channel.
    image::DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buffer.into_inner())
}

/// EXIF orientation tag, defaulting to 1 when absent.
fn read_orientation(bytes: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: image::DynamicImage, orientation: u32) -> image::DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}
