//! # Image Processing Module
//!
//! Questo modulo gestisce la conversione HEIC → JPEG.
//!
//! ## Architettura
//!
//! La conversione è composta da due adapter con interfaccia stretta:
//!
//! - **Decoder** (`HeicDecoder`): legge un file HEIC e produce un buffer di
//!   pixel grezzo (`RawImage`: pixel mode, dimensioni, stride, byte).
//! - **Encoder** (`encode_jpeg`): scrive un `RawImage` come JPEG con il crate
//!   `image`.
//!
//! ## Decoder esterno
//!
//! `ExternalHeicDecoder` non decodifica HEVC in-process: delega a tool esterni
//! che renderizzano un PNG temporaneo, poi caricato con `image`.
//!
//! | Priorità | Tool           | Comando                                   |
//! |----------|----------------|-------------------------------------------|
//! | 1        | `heif-dec`     | `heif-dec IN OUT.png` (libheif ≥ 1.17)    |
//! | 2        | `heif-convert` | `heif-convert IN OUT.png` (libheif)       |
//! | 3        | `magick`       | `magick IN OUT.png` (ImageMagick 7)       |
//! | 4        | `sips`         | `sips -s format png IN --out OUT.png`     |
//!
//! Prima di lanciare qualsiasi tool viene controllato il box `ftyp` del
//! container: un file che non è HEIF fallisce subito con `ImportError::Decode`.
//! Se un tool fallisce si prova il successivo; se falliscono tutti l'errore
//! riporta lo stderr dell'ultimo.
//!
//! ## Pixel mode supportati
//!
//! - `Gray` (1 byte/pixel), `Rgb` (3), `Rgba` (4, alpha scartato in JPEG)
//!
//! ## Esempio:
//! ```ignore
//! let decoder = ExternalHeicDecoder::new();
//! let jpg = convert_heic_to_jpeg(&decoder, &source, &target, 75)?;
//! ```

use crate::error::ImportError;
use crate::tool_resolver::ToolPathResolver;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage};
use std::borrow::Cow;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::debug;

/// HEIF brands accepted in the `ftyp` box
const HEIF_BRANDS: &[&[u8; 4]] = &[
    b"heic", b"heix", b"heim", b"heis", b"hevc", b"hevx", b"mif1", b"msf1",
];

/// Decoder tools in order of preference
const DECODER_TOOLS: &[&str] = &["heif-dec", "heif-convert", "magick", "sips"];

/// Layout of the bytes in a [`RawImage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelMode {
    Gray,
    Rgb,
    Rgba,
}

impl PixelMode {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Decoded pixel buffer. Rows are `stride` bytes apart and may carry padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub mode: PixelMode,
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub data: Vec<u8>,
}

impl RawImage {
    /// Tightly packed image from an `image` crate buffer
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (mode, width, height, data) = match img.color() {
            ColorType::L8 | ColorType::L16 => {
                let buf = img.into_luma8();
                (PixelMode::Gray, buf.width(), buf.height(), buf.into_raw())
            }
            ColorType::La8 | ColorType::La16 | ColorType::Rgba8 | ColorType::Rgba16 | ColorType::Rgba32F => {
                let buf = img.into_rgba8();
                (PixelMode::Rgba, buf.width(), buf.height(), buf.into_raw())
            }
            _ => {
                let buf = img.into_rgb8();
                (PixelMode::Rgb, buf.width(), buf.height(), buf.into_raw())
            }
        };

        Self {
            mode,
            stride: width as usize * mode.bytes_per_pixel(),
            width,
            height,
            data,
        }
    }

    fn row_len(&self) -> usize {
        self.width as usize * self.mode.bytes_per_pixel()
    }

    /// Pixel rows without stride padding
    pub fn packed(&self) -> Result<Cow<'_, [u8]>, ImportError> {
        let row_len = self.row_len();
        let height = self.height as usize;

        if self.stride < row_len {
            return Err(ImportError::Encode(format!(
                "stride {} is shorter than a row of {} bytes",
                self.stride, row_len
            )));
        }

        let needed = if height == 0 { 0 } else { self.stride * (height - 1) + row_len };
        if self.data.len() < needed {
            return Err(ImportError::Encode(format!(
                "pixel buffer holds {} bytes, {}x{} needs {}",
                self.data.len(),
                self.width,
                self.height,
                needed
            )));
        }

        if self.stride == row_len {
            return Ok(Cow::Borrowed(&self.data[..needed]));
        }

        let mut packed = Vec::with_capacity(row_len * height);
        for row in 0..height {
            let start = row * self.stride;
            packed.extend_from_slice(&self.data[start..start + row_len]);
        }
        Ok(Cow::Owned(packed))
    }
}

/// Decodes a HEIC file into raw pixels
pub trait HeicDecoder {
    fn decode(&self, path: &Path) -> Result<RawImage, ImportError>;
}

/// Check the leading `ftyp` box for a HEIF brand
pub fn is_heif_container(header: &[u8]) -> bool {
    if header.len() < 16 || &header[4..8] != b"ftyp" {
        return false;
    }

    let box_size = u32::from_be_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let end = box_size.clamp(16, header.len());

    // major brand at 8..12, minor version at 12..16, compatible brands after
    std::iter::once(&header[8..12])
        .chain(header[16..end].chunks_exact(4))
        .any(|brand| HEIF_BRANDS.iter().any(|known| brand == &known[..]))
}

/// HEIC decoder backed by external command-line tools
#[derive(Debug, Clone, Default)]
pub struct ExternalHeicDecoder {
    resolver: ToolPathResolver,
}

impl ExternalHeicDecoder {
    pub fn new() -> Self {
        Self {
            resolver: ToolPathResolver::new(),
        }
    }

    pub fn with_resolver(resolver: ToolPathResolver) -> Self {
        Self { resolver }
    }

    fn check_container(path: &Path) -> Result<(), ImportError> {
        let mut header = Vec::with_capacity(256);
        File::open(path)?.take(256).read_to_end(&mut header)?;

        if is_heif_container(&header) {
            Ok(())
        } else {
            Err(ImportError::Decode(format!(
                "{} is not a HEIF container",
                path.display()
            )))
        }
    }

    fn tool_args(tool: &str, input: &Path, output: &Path) -> Vec<OsString> {
        match tool {
            "sips" => vec![
                "-s".into(),
                "format".into(),
                "png".into(),
                input.into(),
                "--out".into(),
                output.into(),
            ],
            _ => vec![input.into(), output.into()],
        }
    }

    /// Run one tool; on success return the PNG it rendered
    fn render_with(&self, tool: &str, program: &Path, input: &Path, workdir: &Path) -> Result<PathBuf, String> {
        let output = workdir.join("decoded.png");
        debug!("Decoding {} with {}", input.display(), tool);

        let result = Command::new(program)
            .args(Self::tool_args(tool, input, &output))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to execute {}: {}", tool, e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(format!("{} exited with {}: {}", tool, result.status, stderr.trim()));
        }

        find_rendered(workdir, &output).ok_or_else(|| format!("{} produced no output image", tool))
    }
}

/// The expected output, or the first PNG in `dir`.
/// `heif-convert` suffixes the name when a file holds several top-level images.
fn find_rendered(dir: &Path, expected: &Path) -> Option<PathBuf> {
    if expected.is_file() {
        return Some(expected.to_path_buf());
    }

    let mut pngs: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |ext| ext.eq_ignore_ascii_case("png")))
        .collect();
    pngs.sort();
    pngs.into_iter().next()
}

impl HeicDecoder for ExternalHeicDecoder {
    fn decode(&self, path: &Path) -> Result<RawImage, ImportError> {
        Self::check_container(path)?;

        let available = self.resolver.available_tools(DECODER_TOOLS);

        if available.is_empty() {
            return Err(ImportError::MissingDependency(format!(
                "no HEIC decoder available, tried {} ({})",
                DECODER_TOOLS.join(", "),
                ToolPathResolver::install_hint("heif-dec")
            )));
        }

        let mut last_error = String::new();
        for (tool, program) in available {
            let workdir = TempDir::new()?;
            match self.render_with(tool, &program, path, workdir.path()) {
                Ok(png) => {
                    let img = image::open(&png)
                        .map_err(|e| ImportError::Decode(format!("{} output unreadable: {}", tool, e)))?;
                    return Ok(RawImage::from_dynamic(img));
                }
                Err(e) => {
                    debug!("HEIC decoder {} failed: {}", tool, e);
                    last_error = e;
                }
            }
        }

        Err(ImportError::Decode(last_error))
    }
}

/// Decode a HEIC file with the default external tools
pub fn decode_heic(path: &Path) -> Result<RawImage, ImportError> {
    ExternalHeicDecoder::new().decode(path)
}

/// Write `image` to `out_path` as a JPEG
pub fn encode_jpeg(image: &RawImage, out_path: &Path, quality: u8) -> Result<(), ImportError> {
    let packed = image.packed()?;

    let (pixels, color): (Cow<'_, [u8]>, ColorType) = match image.mode {
        PixelMode::Gray => (packed, ColorType::L8),
        PixelMode::Rgb => (packed, ColorType::Rgb8),
        PixelMode::Rgba => {
            let rgb: Vec<u8> = packed
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            (Cow::Owned(rgb), ColorType::Rgb8)
        }
    };

    let file = File::create(out_path)
        .map_err(|e| ImportError::Encode(format!("cannot create {}: {}", out_path.display(), e)))?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode(&pixels, image.width, image.height, color)
        .map_err(|e| ImportError::Encode(e.to_string()))?;

    writer
        .flush()
        .map_err(|e| ImportError::Encode(format!("cannot write {}: {}", out_path.display(), e)))?;

    Ok(())
}

/// Decode `source` and write it next to `out_path` with a `.jpg` extension.
/// The source file is left untouched. Returns the written path.
pub fn convert_heic_to_jpeg(
    decoder: &dyn HeicDecoder,
    source: &Path,
    out_path: &Path,
    quality: u8,
) -> Result<PathBuf, ImportError> {
    let jpg_path = out_path.with_extension("jpg");
    let image = decoder.decode(source)?;
    debug!(
        "Decoded {} ({}x{}, {:?})",
        source.display(),
        image.width,
        image.height,
        image.mode
    );
    encode_jpeg(&image, &jpg_path, quality)?;
    Ok(jpg_path)
}
