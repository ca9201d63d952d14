//! Cairo rendering of a [`SketchPad`], shared by the on-screen canvas and the
//! PNG export.

use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::error::ExportError;
use crate::sketch::{Geometry, Shape, SketchPad};

pub fn paint_shape(cr: &cairo::Context, shape: &Shape) -> Result<(), cairo::Error> {
    let (r, g, b) = shape.color.to_unit();
    cr.set_source_rgb(r, g, b);
    cr.set_line_width(shape.width);
    cr.set_line_cap(cairo::LineCap::Round);
    cr.set_line_join(cairo::LineJoin::Round);
    cr.new_path();

    match &shape.geometry {
        Geometry::Polyline(points) => {
            let mut iter = points.iter();
            if let Some(first) = iter.next() {
                cr.move_to(first.x, first.y);
                for p in iter {
                    cr.line_to(p.x, p.y);
                }
            }
        }
        Geometry::Rect {
            origin,
            width,
            height,
        } => cr.rectangle(origin.x, origin.y, *width, *height),
        Geometry::Circle { center, radius } => cr.arc(center.x, center.y, *radius, 0.0, 2.0 * PI),
        Geometry::Triangle([a, b, c]) => {
            cr.move_to(a.x, a.y);
            cr.line_to(b.x, b.y);
            cr.line_to(c.x, c.y);
            cr.close_path();
        }
    }

    if shape.filled { cr.fill() } else { cr.stroke() }
}

/// Background, committed shapes, then the drag in progress.
pub fn paint_pad(cr: &cairo::Context, pad: &SketchPad) -> Result<(), cairo::Error> {
    let (r, g, b) = pad.background.to_unit();
    cr.set_source_rgb(r, g, b);
    cr.paint()?;
    for shape in pad.shapes() {
        paint_shape(cr, shape)?;
    }
    if let Some(preview) = pad.preview() {
        paint_shape(cr, &preview)?;
    }
    Ok(())
}

/// Rasterizes the pad at its current size.
pub fn render_surface(pad: &SketchPad) -> Result<cairo::ImageSurface, ExportError> {
    let (width, height) = pad.size();
    if width == 0 || height == 0 {
        return Err(ExportError::EmptyCanvas);
    }
    let width = i32::try_from(width).map_err(|_| cairo::Error::InvalidSize)?;
    let height = i32::try_from(height).map_err(|_| cairo::Error::InvalidSize)?;

    let surface = cairo::ImageSurface::create(cairo::Format::Rgb24, width, height)?;
    {
        let cr = cairo::Context::new(&surface)?;
        paint_pad(&cr, pad)?;
    }
    surface.flush();
    Ok(surface)
}

pub fn export_png(pad: &SketchPad, path: &Path) -> Result<(), ExportError> {
    let surface = render_surface(pad)?;
    let mut file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    surface
        .write_to_png(&mut file)
        .map_err(|source| ExportError::Png {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "drawing saved");
    Ok(())
}
