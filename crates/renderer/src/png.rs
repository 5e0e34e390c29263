//! Deterministic PNG encoding for heatmap images.
//!
//! Heatmaps drawn from a quantized palette usually fit in 256 colors and
//! are written as indexed PNG (color type 3, with `tRNS` when any entry is
//! translucent). Anything richer, such as a bilinear overlay on a photo
//! base map, is written as 8-bit RGBA (color type 6).
//!
//! The output depends only on the pixels: palette entries are numbered in
//! scan order, the zlib level is fixed and no ancillary chunks are emitted.

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{RenderError, Result};

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Largest palette an 8-bit indexed image can address.
pub const MAX_PALETTE_SIZE: usize = 256;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// RGBA palette numbered in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<[u8; 4]>,
}

impl Palette {
    /// Index every pixel of an RGBA buffer, or `None` past 256 colors.
    pub fn index(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
        let mut slots: HashMap<[u8; 4], u8> = HashMap::new();
        let mut palette = Palette::default();
        let mut indices = Vec::with_capacity(pixels.len() / 4);

        for px in pixels.chunks_exact(4) {
            let color = [px[0], px[1], px[2], px[3]];
            let slot = match slots.get(&color) {
                Some(&slot) => slot,
                None => {
                    if palette.entries.len() == MAX_PALETTE_SIZE {
                        return None;
                    }
                    let slot = palette.entries.len() as u8;
                    palette.entries.push(color);
                    slots.insert(color, slot);
                    slot
                }
            };
            indices.push(slot);
        }

        Some((palette, indices))
    }

    pub fn from_entries(entries: Vec<[u8; 4]>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[[u8; 4]] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn plte(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|c| [c[0], c[1], c[2]]).collect()
    }

    /// `tRNS` payload, omitted when every entry is opaque.
    fn trns(&self) -> Option<Vec<u8>> {
        self.entries
            .iter()
            .any(|c| c[3] < 255)
            .then(|| self.entries.iter().map(|c| c[3]).collect())
    }
}

/// Encode RGBA pixels, choosing indexed output when the palette fits.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    expect_len(pixels.len(), width, height, 4)?;
    match Palette::index(pixels) {
        Some((palette, indices)) => encode_indexed(width, height, &palette, &indices),
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode one palette index per pixel as color type 3.
pub fn encode_indexed(width: usize, height: usize, palette: &Palette, indices: &[u8]) -> Result<Vec<u8>> {
    expect_len(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encode(format!(
            "palette must hold 1 to {} colors, got {}",
            MAX_PALETTE_SIZE,
            palette.len()
        )));
    }
    if let Some(&bad) = indices.iter().find(|&&i| i as usize >= palette.len()) {
        return Err(RenderError::Encode(format!(
            "index {} outside palette of {}",
            bad,
            palette.len()
        )));
    }

    let mut png = ChunkWriter::new(width, height, COLOR_TYPE_INDEXED);
    png.chunk(b"PLTE", &palette.plte());
    if let Some(alpha) = palette.trns() {
        png.chunk(b"tRNS", &alpha);
    }
    png.image_data(indices, width)?;
    Ok(png.finish())
}

/// Encode RGBA pixels as color type 6.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    expect_len(pixels.len(), width, height, 4)?;
    let mut png = ChunkWriter::new(width, height, COLOR_TYPE_RGBA);
    png.image_data(pixels, width * 4)?;
    Ok(png.finish())
}

fn expect_len(len: usize, width: usize, height: usize, bytes_per_pixel: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!("cannot encode a {}x{} image", width, height)));
    }
    let expected = width * height * bytes_per_pixel;
    if len != expected {
        return Err(RenderError::Encode(format!(
            "{}x{} image needs {} bytes, got {}",
            width, height, expected, len
        )));
    }
    Ok(())
}

/// Accumulates a PNG stream chunk by chunk.
struct ChunkWriter {
    out: Vec<u8>,
}

impl ChunkWriter {
    /// Signature plus an 8-bit, non-interlaced IHDR.
    fn new(width: usize, height: usize, color_type: u8) -> Self {
        let mut writer = Self {
            out: SIGNATURE.to_vec(),
        };
        let mut ihdr = [0u8; 13];
        ihdr[0..4].copy_from_slice(&(width as u32).to_be_bytes());
        ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
        ihdr[8] = 8;
        ihdr[9] = color_type;
        writer.chunk(b"IHDR", &ihdr);
        writer
    }

    fn chunk(&mut self, kind: &[u8; 4], data: &[u8]) {
        let mut crc = crc32fast::Hasher::new();
        crc.update(kind);
        crc.update(data);

        self.out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        self.out.extend_from_slice(kind);
        self.out.extend_from_slice(data);
        self.out.extend_from_slice(&crc.finalize().to_be_bytes());
    }

    /// IDAT holding `data` split into rows of `row_bytes`, unfiltered.
    fn image_data(&mut self, data: &[u8], row_bytes: usize) -> Result<()> {
        let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
        for row in data.chunks_exact(row_bytes) {
            zlib.write_all(&[0])
                .and_then(|_| zlib.write_all(row))
                .map_err(|e| RenderError::Encode(format!("deflate failed: {}", e)))?;
        }
        let compressed = zlib
            .finish()
            .map_err(|e| RenderError::Encode(format!("deflate failed: {}", e)))?;
        self.chunk(b"IDAT", &compressed);
        Ok(())
    }

    fn finish(mut self) -> Vec<u8> {
        self.chunk(b"IEND", &[]);
        self.out
    }
}
