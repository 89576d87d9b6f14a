//! Region geometry: `GeoJSON` loading and polygon-to-mask construction.
//!
//! The region of interest arrives as a `GeoJSON` polygon or multipolygon in
//! the same planar coordinate system as the event data. A grid aligned to a
//! configurable origin is clipped to the region's bounding box, and each cell
//! is masked out unless its rectangle intersects the region geometry.

use geo::{BoundingRect, Contains, Intersects, MultiPolygon, Point, Rect, coord};
use geojson::GeoJson;

use crate::{Grid, GridError, Mask, MaskedGrid};

/// Loads region geometry from a `GeoJSON` file.
///
/// Accepts bare geometries, features, and feature collections; all polygon
/// geometry found is unioned into one [`MultiPolygon`].
///
/// # Errors
///
/// Returns an error if the file is unreadable, is not valid `GeoJSON`, or
/// contains no polygon geometry.
pub fn load_region(path: &std::path::Path) -> Result<MultiPolygon<f64>, GridError> {
    let raw = std::fs::read_to_string(path)?;
    parse_region(&raw)
}

/// Parses region geometry from a `GeoJSON` string.
///
/// # Errors
///
/// Returns [`GridError::RegionParse`] for malformed `GeoJSON` and
/// [`GridError::EmptyRegion`] when no polygon geometry is present.
pub fn parse_region(raw: &str) -> Result<MultiPolygon<f64>, GridError> {
    let geojson: GeoJson = raw.parse()?;
    let mut polygons = Vec::new();

    match geojson {
        GeoJson::Geometry(geom) => collect_polygons(&geom, &mut polygons)?,
        GeoJson::Feature(feature) => {
            if let Some(geom) = feature.geometry {
                collect_polygons(&geom, &mut polygons)?;
            }
        }
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                if let Some(geom) = feature.geometry {
                    collect_polygons(&geom, &mut polygons)?;
                }
            }
        }
    }

    if polygons.is_empty() {
        return Err(GridError::EmptyRegion);
    }
    Ok(MultiPolygon(polygons))
}

fn collect_polygons(
    geom: &geojson::Geometry,
    out: &mut Vec<geo::Polygon<f64>>,
) -> Result<(), GridError> {
    let geo_geom: geo::Geometry<f64> = geom.clone().try_into()?;
    match geo_geom {
        geo::Geometry::Polygon(p) => out.push(p),
        geo::Geometry::MultiPolygon(mp) => out.extend(mp.0),
        geo::Geometry::GeometryCollection(gc) => {
            for inner in gc {
                match inner {
                    geo::Geometry::Polygon(p) => out.push(p),
                    geo::Geometry::MultiPolygon(mp) => out.extend(mp.0),
                    _ => {}
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Builds a [`MaskedGrid`] covering a region.
///
/// Cells are aligned to the `(xoffset, yoffset)` origin with the given cell
/// sizes; the grid rectangle is the smallest aligned rectangle covering the
/// region's bounding box. A cell is in-region when its rectangle intersects
/// the region geometry.
///
/// # Errors
///
/// Returns [`GridError::EmptyRegion`] for degenerate geometry and
/// [`GridError::InvalidGeometry`] for non-positive cell sizes.
pub fn masked_grid_from_region(
    region: &MultiPolygon<f64>,
    xsize: f64,
    ysize: f64,
    xoffset: f64,
    yoffset: f64,
) -> Result<MaskedGrid, GridError> {
    if !(xsize > 0.0 && ysize > 0.0) {
        return Err(GridError::InvalidGeometry {
            message: format!("cell size must be positive, got {xsize}x{ysize}"),
        });
    }
    let bounds = region.bounding_rect().ok_or(GridError::EmptyRegion)?;

    let col_start = ((bounds.min().x - xoffset) / xsize).floor();
    let col_end = ((bounds.max().x - xoffset) / xsize).floor();
    let row_start = ((bounds.min().y - yoffset) / ysize).floor();
    let row_end = ((bounds.max().y - yoffset) / ysize).floor();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (xextent, yextent) = (
        (col_end - col_start) as usize + 1,
        (row_end - row_start) as usize + 1,
    );

    let grid = Grid::new(
        xsize,
        ysize,
        xoffset + col_start * xsize,
        yoffset + row_start * ysize,
        xextent,
        yextent,
    )?;

    let mut excluded = Vec::with_capacity(yextent * xextent);
    for row in 0..yextent {
        for col in 0..xextent {
            #[allow(clippy::cast_precision_loss)]
            let min = coord! {
                x: grid.xoffset + col as f64 * xsize,
                y: grid.yoffset + row as f64 * ysize,
            };
            let max = coord! { x: min.x + xsize, y: min.y + ysize };
            let cell_rect = Rect::new(min, max);
            excluded.push(!cell_rect.to_polygon().intersects(region));
        }
    }

    let mask = Mask::from_flat(yextent, xextent, excluded);
    let masked = MaskedGrid::new(grid, mask)?;
    log::debug!(
        "Built {}x{} masked grid, {} in-region cells",
        yextent,
        xextent,
        masked.region_cells().len()
    );
    Ok(masked)
}

/// Whether a planar point lies within the region geometry.
#[must_use]
pub fn region_contains(region: &MultiPolygon<f64>, x: f64, y: f64) -> bool {
    region.contains(&Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square_region() -> MultiPolygon<f64> {
        // 150m x 150m square anchored at (25, 25).
        MultiPolygon(vec![polygon![
            (x: 25.0, y: 25.0),
            (x: 175.0, y: 25.0),
            (x: 175.0, y: 175.0),
            (x: 25.0, y: 175.0),
            (x: 25.0, y: 25.0),
        ]])
    }

    #[test]
    fn grid_covers_bounding_box() {
        let masked = masked_grid_from_region(&square_region(), 100.0, 100.0, 0.0, 0.0).unwrap();
        let grid = masked.grid();
        assert_eq!((grid.yextent, grid.xextent), (2, 2));
        assert!((grid.xoffset - 0.0).abs() < f64::EPSILON);
        assert!((grid.yoffset - 0.0).abs() < f64::EPSILON);
        // All four cells intersect the square.
        assert_eq!(masked.region_cells().len(), 4);
    }

    #[test]
    fn cells_outside_polygon_are_masked() {
        // L-shaped region leaves the (1,1) cell empty.
        let region = MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 200.0, y: 0.0),
            (x: 200.0, y: 90.0),
            (x: 90.0, y: 90.0),
            (x: 90.0, y: 200.0),
            (x: 0.0, y: 200.0),
            (x: 0.0, y: 0.0),
        ]]);
        let masked = masked_grid_from_region(&region, 100.0, 100.0, 0.0, 0.0).unwrap();
        let cells = masked.region_cells();
        assert_eq!(cells.len(), 3);
        assert!(!masked.is_in_region(crate::CellCoord::new(1, 1)));
    }

    #[test]
    fn parses_feature_collection() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                }
            }]
        }"#;
        let region = parse_region(raw).unwrap();
        assert_eq!(region.0.len(), 1);
        assert!(region_contains(&region, 5.0, 5.0));
        assert!(!region_contains(&region, 15.0, 5.0));
    }

    #[test]
    fn rejects_geometry_without_polygons() {
        let raw = r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#;
        assert!(matches!(parse_region(raw), Err(GridError::EmptyRegion)));
    }
}
