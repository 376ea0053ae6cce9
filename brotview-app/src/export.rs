//! PNG output with the plot position embedded as tEXt chunks.

use std::io::BufWriter;
use std::path::Path;

use tracing::debug;

use brotview_bridge::RenderSpec;

/// Plot details written alongside the pixels.
pub(crate) struct PlotMetadata {
    pub algorithm: String,
    pub colourer: String,
    pub max_iter: u32,
    /// Bottom-left corner of the plot.
    pub origin_re: f64,
    pub origin_im: f64,
    pub axes_re: f64,
    pub axes_im: f64,
}

impl PlotMetadata {
    pub fn from_spec(spec: &RenderSpec) -> Self {
        Self {
            algorithm: spec.algorithm.clone(),
            colourer: spec.colourer.clone(),
            max_iter: spec.max_iter,
            origin_re: spec.origin.re,
            origin_im: spec.origin.im,
            axes_re: spec.axes.re,
            axes_im: spec.axes.im,
        }
    }
}

/// Write an RGBA pixel buffer as a PNG file with the plot metadata attached.
pub(crate) fn write_png(
    pixels: &[u8],
    width: u32,
    height: u32,
    path: &Path,
    metadata: &PlotMetadata,
) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
    }
    let file = std::fs::File::create(path).map_err(|e| format!("Failed to create file: {e}"))?;
    let writer = BufWriter::new(file);

    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    encoder
        .add_text_chunk("Software".to_string(), "brotview".to_string())
        .map_err(|e| format!("Failed to add text chunk: {e}"))?;
    encoder
        .add_text_chunk("Description".to_string(), build_description(metadata))
        .map_err(|e| format!("Failed to add text chunk: {e}"))?;

    for (key, value) in build_metadata_pairs(metadata, width, height) {
        encoder
            .add_text_chunk(key.clone(), value)
            .map_err(|e| format!("Failed to add text chunk '{key}': {e}"))?;
    }

    let mut png_writer = encoder
        .write_header()
        .map_err(|e| format!("Failed to write PNG header: {e}"))?;
    png_writer
        .write_image_data(pixels)
        .map_err(|e| format!("Failed to write PNG image data: {e}"))?;

    debug!("Wrote PNG {}x{} to {}", width, height, path.display());
    Ok(())
}

fn build_description(meta: &PlotMetadata) -> String {
    format!(
        "{} / {} - Origin: {} {}i, Axes: {} {}i, Iterations: {}",
        meta.algorithm,
        meta.colourer,
        meta.origin_re,
        meta.origin_im,
        meta.axes_re,
        meta.axes_im,
        meta.max_iter,
    )
}

fn build_metadata_pairs(meta: &PlotMetadata, width: u32, height: u32) -> Vec<(String, String)> {
    vec![
        ("Brotview.Algorithm".into(), meta.algorithm.clone()),
        ("Brotview.Colourer".into(), meta.colourer.clone()),
        ("Brotview.MaxIter".into(), meta.max_iter.to_string()),
        ("Brotview.OriginRe".into(), meta.origin_re.to_string()),
        ("Brotview.OriginIm".into(), meta.origin_im.to_string()),
        ("Brotview.AxesRe".into(), meta.axes_re.to_string()),
        ("Brotview.AxesIm".into(), meta.axes_im.to_string()),
        ("Brotview.Resolution".into(), format!("{width}x{height}")),
    ]
}
