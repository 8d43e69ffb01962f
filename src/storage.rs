use std::{io::Cursor, path::Path};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;

use crate::errors::RequestError;

/// Reduces an uploaded filename to a safe, flat name: accents are decomposed
/// and dropped, path separators and whitespace collapse to `_`, and only
/// `[A-Za-z0-9._-]` survive. Returns `None` when nothing usable is left.
pub fn secure_filename(name: &str) -> Option<String> {
    let spaced: String = name
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_');
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Re-encodes an image as plain RGB when it carries an alpha channel or is
/// palette based. Other images are returned untouched.
pub fn normalize_image(bytes: &[u8]) -> Result<Vec<u8>, image::ImageError> {
    let format = image::guess_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)?;
    if !img.color().has_alpha() && !is_palette_based(bytes, format) {
        return Ok(bytes.to_vec());
    }
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut out = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut out), output_format(format))?;
    Ok(out)
}

/// Decoders expand palettes, so the colour type has to come from the source.
fn is_palette_based(bytes: &[u8], format: ImageFormat) -> bool {
    match format {
        ImageFormat::Gif => true,
        ImageFormat::Png => png::Decoder::new(Cursor::new(bytes))
            .read_info()
            .map(|reader| reader.info().color_type == png::ColorType::Indexed)
            .unwrap_or(false),
        _ => false,
    }
}

fn output_format(format: ImageFormat) -> ImageFormat {
    match format {
        ImageFormat::Png
        | ImageFormat::Jpeg
        | ImageFormat::Gif
        | ImageFormat::Bmp
        | ImageFormat::Tiff => format,
        _ => ImageFormat::Png,
    }
}

/// Normalises an uploaded image off the async runtime and writes it to `dir`.
/// Returns the stored filename.
pub async fn store_image(
    dir: &Path,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<String, RequestError> {
    let name = secure_filename(file_name)
        .ok_or(RequestError::RunTimeError("That image has an unusable file name."))?;
    let normalized = tokio::task::spawn_blocking(move || normalize_image(&bytes))
        .await
        .map_err(|_| RequestError::ServerError)??;
    let path = dir.join(&name);
    tokio::fs::write(&path, normalized).await?;
    info!("Stored image {}", path.display());
    Ok(name)
}

/// Writes an upload verbatim to `dir`. Returns the stored filename.
pub async fn store_file(
    dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, RequestError> {
    let name = secure_filename(file_name)
        .ok_or(RequestError::RunTimeError("That file has an unusable file name."))?;
    let path = dir.join(&name);
    tokio::fs::write(&path, bytes).await?;
    info!("Stored file {} ({} bytes)", path.display(), bytes.len());
    Ok(name)
}

pub async fn ensure_dirs(dirs: &[&Path]) -> std::io::Result<()> {
    for dir in dirs {
        debug!("Ensuring storage directory {}", dir.display());
        tokio::fs::create_dir_all(dir).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), format).unwrap();
        out
    }

    fn indexed_png() -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, 2, 2);
            encoder.set_color(png::ColorType::Indexed);
            encoder.set_depth(png::BitDepth::Eight);
            encoder.set_palette(vec![255, 0, 0, 0, 0, 255]);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 1, 1, 0]).unwrap();
        }
        out
    }

    fn png_color_type(bytes: &[u8]) -> png::ColorType {
        png::Decoder::new(Cursor::new(bytes))
            .read_info()
            .unwrap()
            .info()
            .color_type
    }

    #[test]
    fn secure_filename_flattens_paths_and_spaces() {
        assert_eq!(secure_filename("My cool video.mp4").as_deref(), Some("My_cool_video.mp4"));
        assert_eq!(secure_filename("../../etc/passwd").as_deref(), Some("etc_passwd"));
        assert_eq!(secure_filename("C:\\Users\\me\\clip.mov").as_deref(), Some("C_Users_me_clip.mov"));
        assert_eq!(secure_filename("héllo wörld.png").as_deref(), Some("hello_world.png"));
        assert_eq!(secure_filename("café.png").as_deref(), Some("cafe.png"));
        assert_eq!(secure_filename("icon<script>.png").as_deref(), Some("iconscript.png"));
    }

    #[test]
    fn secure_filename_rejects_empty_results() {
        assert_eq!(secure_filename(""), None);
        assert_eq!(secure_filename("..."), None);
        assert_eq!(secure_filename("___"), None);
        assert_eq!(secure_filename("日本"), None);
    }

    #[test]
    fn transparent_png_becomes_rgb() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 128]));
        let bytes = encode(DynamicImage::ImageRgba8(rgba), ImageFormat::Png);

        let normalized = normalize_image(&bytes).unwrap();

        assert_eq!(image::guess_format(&normalized).unwrap(), ImageFormat::Png);
        let decoded = image::load_from_memory(&normalized).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!(decoded.width(), 2);
    }

    #[test]
    fn palette_png_becomes_rgb() {
        let bytes = indexed_png();
        assert_eq!(png_color_type(&bytes), png::ColorType::Indexed);

        let normalized = normalize_image(&bytes).unwrap();

        assert_ne!(normalized, bytes);
        assert_eq!(png_color_type(&normalized), png::ColorType::Rgb);
        let decoded = image::load_from_memory(&normalized).unwrap();
        assert_eq!(decoded.to_rgb8().get_pixel(1, 0), &Rgb([0, 0, 255]));
    }

    #[test]
    fn opaque_image_is_left_alone() {
        let rgb = RgbImage::from_pixel(3, 1, Rgb([200, 100, 50]));
        let bytes = encode(DynamicImage::ImageRgb8(rgb), ImageFormat::Png);
        assert_eq!(normalize_image(&bytes).unwrap(), bytes);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(normalize_image(b"definitely not an image").is_err());
    }

    #[tokio::test]
    async fn store_file_writes_under_sanitized_name() {
        let dir = std::env::temp_dir().join(format!("hkingdom-storage-{}", rand::random::<u64>()));
        ensure_dirs(&[dir.as_path()]).await.unwrap();

        let name = store_file(&dir, "../my clip.mp4", b"frames").await.unwrap();

        assert_eq!(name, "my_clip.mp4");
        assert_eq!(tokio::fs::read(dir.join(&name)).await.unwrap(), b"frames");
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
