//! Texture decoding and upload.
//!
//! Two payload formats are understood, routed by magic bytes: PNG
//! (delegated to the `image` crate, decoded to RGBA8) and a minimal subset
//! of 24-bit uncompressed BMP. The BMP reader keeps its quirks on purpose:
//! it reads width, height, pixel offset and payload size straight off the
//! header (with fallbacks for zeroed fields), swaps BGR to RGB, and does no
//! row reordering or stride handling. Assets are authored for exactly this
//! reader.

use std::fmt;

use anyhow::{Context as _, Result};

use crate::assets::AssetSource;
use crate::gfx::{Gfx, PixelBuffer, PixelFormat};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const BMP_HEADER_LEN: usize = 54;

/// Error decoding an image payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeError(pub String);

impl DecodeError {
    fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DecodeError {}

/// Decodes an image payload, sniffing the format from its magic bytes.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.starts_with(PNG_MAGIC) {
        decode_png(bytes)
    } else if bytes.starts_with(b"BM") {
        decode_bmp(bytes)
    } else {
        Err(DecodeError::new(
            "unrecognized image payload (expected PNG or BMP magic)",
        ))
    }
}

/// Decodes a 24-bit uncompressed BMP into tightly packed RGB8.
///
/// Rows come out in the order they are stored; callers that want a
/// particular vertical orientation author the asset accordingly.
pub fn decode_bmp(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    if bytes.len() < BMP_HEADER_LEN {
        return Err(DecodeError::new("BMP shorter than its 54-byte header"));
    }
    if &bytes[0..2] != b"BM" {
        return Err(DecodeError::new("not a BMP (missing BM magic)"));
    }

    let compression = u32_at(bytes, 0x1E);
    if compression != 0 {
        return Err(DecodeError::new(format!(
            "compressed BMP not supported (method {compression})"
        )));
    }
    let bpp = u16_at(bytes, 0x1C);
    if bpp != 24 {
        return Err(DecodeError::new(format!(
            "{bpp} bpp BMP not supported (only 24)"
        )));
    }

    let width = u32_at(bytes, 0x12);
    let height = u32_at(bytes, 0x16);
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or_else(|| DecodeError::new("BMP dimensions overflow"))?;

    let mut data_pos = u32_at(bytes, 0x0A) as usize;
    if data_pos == 0 {
        data_pos = BMP_HEADER_LEN;
    }
    let mut payload_len = u32_at(bytes, 0x22) as usize;
    if payload_len == 0 {
        payload_len = expected;
    }

    let end = data_pos
        .checked_add(payload_len)
        .filter(|&end| end <= bytes.len())
        .ok_or_else(|| DecodeError::new("BMP pixel payload out of bounds"))?;
    if payload_len < expected {
        return Err(DecodeError::new(
            "BMP pixel payload shorter than width * height * 3",
        ));
    }

    let mut pixels = bytes[data_pos..end].to_vec();
    for px in pixels.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
    pixels.truncate(expected);

    Ok(PixelBuffer::new(width, height, PixelFormat::Rgb8, pixels))
}

fn decode_png(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|err| DecodeError::new(format!("png: {err}")))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelBuffer::new(
        width,
        height,
        PixelFormat::Rgba8,
        rgba.into_raw(),
    ))
}

/// Loads a named asset, decodes it, and uploads it as a texture.
pub fn load_texture<G: Gfx>(
    gfx: &mut G,
    context: &mut G::Context,
    assets: &dyn AssetSource,
    name: &str,
) -> Result<G::Texture> {
    let bytes = assets
        .load(name)
        .with_context(|| format!("reading asset {name:?}"))?;
    let pixels =
        decode_image(&bytes).with_context(|| format!("decoding asset {name:?}"))?;
    let texture = gfx
        .create_texture(context, &pixels)
        .with_context(|| format!("uploading texture {name:?}"))?;
    Ok(texture)
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Builds a well-formed 24-bit BMP around a BGR payload.
#[cfg(test)]
pub(crate) fn make_bmp(width: u32, height: u32, bgr: &[u8]) -> Vec<u8> {
    assert_eq!(bgr.len(), width as usize * height as usize * 3);

    let payload_len = bgr.len() as u32;
    let mut out = Vec::with_capacity(BMP_HEADER_LEN + bgr.len());
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(BMP_HEADER_LEN as u32 + payload_len).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&(BMP_HEADER_LEN as u32).to_le_bytes()); // pixel data offset
    out.extend_from_slice(&40u32.to_le_bytes()); // info header size
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // compression
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]); // ppm x/y, palette sizes
    out.extend_from_slice(bgr);
    assert_eq!(out.len(), BMP_HEADER_LEN + bgr.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::gfx::fake::{Event, FakeContext, FakeGfx};

    #[test]
    fn bmp_pixels_come_out_rgb() {
        let bmp = make_bmp(2, 2, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let buf = decode_bmp(&bmp).unwrap();
        assert_eq!((buf.width, buf.height), (2, 2));
        assert_eq!(buf.format, PixelFormat::Rgb8);
        assert_eq!(buf.bytes, vec![3, 2, 1, 6, 5, 4, 9, 8, 7, 12, 11, 10]);
    }

    #[test]
    fn bmp_without_magic_is_rejected() {
        let mut bmp = make_bmp(1, 1, &[1, 2, 3]);
        bmp[0] = b'X';
        assert!(decode_bmp(&bmp).is_err());
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(decode_bmp(b"BM tiny").is_err());
    }

    #[test]
    fn compressed_bmp_is_rejected() {
        let mut bmp = make_bmp(1, 1, &[1, 2, 3]);
        bmp[0x1E] = 1; // RLE flag
        let err = decode_bmp(&bmp).unwrap_err();
        assert!(err.0.contains("compressed"), "{err}");
    }

    #[test]
    fn non_24bpp_bmp_is_rejected() {
        let mut bmp = make_bmp(1, 1, &[1, 2, 3]);
        bmp[0x1C] = 32;
        let err = decode_bmp(&bmp).unwrap_err();
        assert!(err.0.contains("32 bpp"), "{err}");
    }

    #[test]
    fn zeroed_offset_and_size_fall_back_to_defaults() {
        let mut bmp = make_bmp(2, 1, &[1, 2, 3, 4, 5, 6]);
        bmp[0x0A..0x0E].fill(0); // pixel data offset
        bmp[0x22..0x26].fill(0); // payload size
        let buf = decode_bmp(&bmp).unwrap();
        assert_eq!(buf.bytes, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let mut bmp = make_bmp(2, 2, &[0; 12]);
        bmp.truncate(bmp.len() - 4);
        assert!(decode_bmp(&bmp).is_err());
    }

    #[test]
    fn png_decodes_to_rgba() {
        let mut img = image::RgbaImage::new(3, 2);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = image::Rgba([x as u8 * 10, y as u8 * 10, 7, 255]);
        }
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let buf = decode_image(&png.into_inner()).unwrap();
        assert_eq!((buf.width, buf.height), (3, 2));
        assert_eq!(buf.format, PixelFormat::Rgba8);
        assert_eq!(&buf.bytes[0..4], &[0, 0, 7, 255]);
        assert_eq!(&buf.bytes[buf.bytes.len() - 4..], &[20, 10, 7, 255]);
    }

    #[test]
    fn unknown_magic_is_rejected() {
        assert!(decode_image(b"GIF89a what even is this").is_err());
    }

    #[test]
    fn load_texture_uploads_decoded_pixels() {
        let mut assets = MemoryAssets::new();
        assets.insert("t.bmp", make_bmp(2, 1, &[1, 2, 3, 4, 5, 6]));

        let (mut gfx, rec) = FakeGfx::new();
        let mut context = FakeContext;
        load_texture(&mut gfx, &mut context, &assets, "t.bmp").unwrap();

        assert!(rec.contains(&Event::CreateTexture {
            id: 0,
            width: 2,
            height: 1,
            format: PixelFormat::Rgb8,
        }));
    }

    #[test]
    fn load_texture_reports_missing_assets() {
        let (mut gfx, _rec) = FakeGfx::new();
        let mut context = FakeContext;
        let err =
            load_texture(&mut gfx, &mut context, &MemoryAssets::new(), "ghost.png").unwrap_err();
        assert!(format!("{err:#}").contains("ghost.png"));
    }
}
