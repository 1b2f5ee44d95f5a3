//! Generated demo assets.
//!
//! The demo carries no asset files; both textures are built at startup and
//! served from a [`MemoryAssets`] source. The checkerboard goes through
//! the 24-bit BMP path, the glyph sheet through the PNG path.

use std::io::Cursor;

use anyhow::{Context as _, Result};

use gyre_render::assets::MemoryAssets;

/// Asset name of the checkerboard the textured plane samples.
pub const PLANE_ASSET: &str = "checker.bmp";

/// Asset name of the hex glyph sheet the text row samples.
pub const SHEET_ASSET: &str = "hex-sheet.png";

const SHEET_SIZE: u32 = 128;
const CELL_W: u32 = 21;
const CELL_H: u32 = 40;
const CELLS_PER_ROW: u32 = 6;

/// Pixel scale of the embedded font inside a sheet cell. 5x7 glyphs at 3x
/// give 15x21 pixels, centered-ish in the 21x40 cell.
const SCALE: u32 = 3;
const PAD_X: u32 = 3;
const PAD_Y: u32 = 9;

/// 5x7 bitmap font for the sixteen hex digits, one row per byte, bit 4 the
/// leftmost column.
const FONT_5X7: [[u8; 7]; 16] = [
    [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e], // 0
    [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e], // 1
    [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f], // 2
    [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e], // 3
    [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02], // 4
    [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e], // 5
    [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e], // 6
    [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e], // 8
    [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c], // 9
    [0x00, 0x00, 0x0e, 0x01, 0x0f, 0x11, 0x0f], // a
    [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1e], // b
    [0x00, 0x00, 0x0e, 0x10, 0x10, 0x11, 0x0e], // c
    [0x01, 0x01, 0x0d, 0x13, 0x11, 0x11, 0x0f], // d
    [0x00, 0x00, 0x0e, 0x11, 0x1f, 0x10, 0x0e], // e
    [0x06, 0x09, 0x08, 0x1c, 0x08, 0x08, 0x08], // f
];

/// Builds the in-memory asset source both demo scenes load from.
pub fn demo_assets() -> Result<MemoryAssets> {
    let mut assets = MemoryAssets::new();
    assets.insert(PLANE_ASSET, checkerboard_bmp(128, 16));
    assets.insert(SHEET_ASSET, glyph_sheet_png()?);
    Ok(assets)
}

/// A `size` x `size` checkerboard with `cell`-pixel squares, as a 24-bit
/// uncompressed BMP.
fn checkerboard_bmp(size: u32, cell: u32) -> Vec<u8> {
    let mut bgr = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            // BGR byte order, like any 24-bit BMP payload
            if ((x / cell) + (y / cell)) % 2 == 0 {
                bgr.extend_from_slice(&[0x30, 0x68, 0xe8]);
            } else {
                bgr.extend_from_slice(&[0x58, 0x40, 0x20]);
            }
        }
    }
    bmp_bytes(size, size, &bgr)
}

/// Wraps a BGR payload in a 54-byte BMP header (uncompressed, 24-bit).
fn bmp_bytes(width: u32, height: u32, bgr: &[u8]) -> Vec<u8> {
    const HEADER_LEN: u32 = 54;

    let payload_len = bgr.len() as u32;
    let mut out = Vec::with_capacity((HEADER_LEN + payload_len) as usize);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(HEADER_LEN + payload_len).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // reserved
    out.extend_from_slice(&HEADER_LEN.to_le_bytes()); // pixel data offset
    out.extend_from_slice(&40u32.to_le_bytes()); // info header size
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // compression
    out.extend_from_slice(&payload_len.to_le_bytes());
    out.extend_from_slice(&[0u8; 16]); // ppm x/y, palette sizes
    out.extend_from_slice(bgr);
    out
}

/// Renders the sixteen hex digits into their sheet cells and encodes the
/// sheet as an RGBA PNG. Unset pixels stay fully transparent, which the
/// textured pipeline later discards.
fn glyph_sheet_png() -> Result<Vec<u8>> {
    let mut img = image::RgbaImage::new(SHEET_SIZE, SHEET_SIZE);

    for (value, rows) in FONT_5X7.iter().enumerate() {
        let cell_x = (value as u32 % CELLS_PER_ROW) * CELL_W;
        let cell_y = (value as u32 / CELLS_PER_ROW) * CELL_H;

        for (gy, row_bits) in rows.iter().enumerate() {
            for gx in 0..5u32 {
                if row_bits & (0x10 >> gx) == 0 {
                    continue;
                }
                for dy in 0..SCALE {
                    for dx in 0..SCALE {
                        let x = cell_x + PAD_X + gx * SCALE + dx;
                        let y = cell_y + PAD_Y + gy as u32 * SCALE + dy;
                        img.put_pixel(x, y, image::Rgba([0xff, 0xff, 0xff, 0xff]));
                    }
                }
            }
        }
    }

    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .context("encoding the glyph sheet")?;
    Ok(bytes)
}
