//! SVG → PNG rasterization for downloads.
//!
//! Uses resvg with system fonts. Output is the SVG's intrinsic size times
//! the scale factor, so a 2× download stays sharp on high-density screens.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::diagram::DiagramKind;

use super::{DOWNLOAD_SCALE, RenderError};

/// Rasterize SVG markup into encoded PNG bytes at `scale`.
///
/// # Errors
///
/// Returns `RenderError::Rasterize` if the SVG cannot be parsed, carries
/// HTML labels, has an empty scaled size, or fails PNG encoding.
pub fn rasterize_svg(svg: &str, scale: f32) -> Result<Vec<u8>, RenderError> {
    // resvg skips foreignObject, so HTML labels would rasterize as blank boxes.
    if svg.contains("<foreignObject") {
        return Err(RenderError::Rasterize("SVG labels use foreignObject HTML; request text labels".into()));
    }

    let mut opts = usvg::Options::default();
    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    opts.fontdb = Arc::new(fontdb);

    let tree = usvg::Tree::from_str(svg, &opts).map_err(|e| RenderError::Rasterize(format!("SVG parse: {e}")))?;

    let size = tree.size();
    let (width, height) = scaled_dimensions(size.width(), size.height(), scale)?;
    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::Rasterize(format!("cannot allocate {width}x{height} pixmap")))?;

    resvg::render(&tree, tiny_skia::Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Rasterize(format!("PNG encode: {e}")))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scaled_dimensions(width: f32, height: f32, scale: f32) -> Result<(u32, u32), RenderError> {
    let w = (width * scale).ceil();
    let h = (height * scale).ceil();
    if !(w >= 1.0 && h >= 1.0) || w > u32::MAX as f32 || h > u32::MAX as f32 {
        return Err(RenderError::Rasterize(format!("invalid raster size {w}x{h}")));
    }
    Ok((w as u32, h as u32))
}

/// Rasterize at the download scale and write `{kind}-process-diagram.png`
/// into `dir`. Returns the written path.
///
/// # Errors
///
/// Returns `RenderError::Rasterize` on conversion or write failure.
pub fn write_download(svg: &str, kind: DiagramKind, dir: &Path) -> Result<PathBuf, RenderError> {
    let png = rasterize_svg(svg, DOWNLOAD_SCALE)?;
    let path = dir.join(kind.download_file_name());
    std::fs::write(&path, png).map_err(|e| RenderError::Rasterize(format!("write {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), %kind, "diagram downloaded");
    Ok(path)
}
