use crate::domain::model::Extent;
use crate::utils::error::{ResolverError, Result};

/// Points sampled per extent edge when projecting an extent.
pub const EXTENT_STOPS: usize = 8;

/// Registry bbox to `[west, south, east, north]`.
///
/// Latitudes are taken as min/max of components 0 and 2, so both
/// `[south, west, north, east]` and `[north, west, south, east]` orderings read the same.
pub fn world_extent(bbox: [f64; 4]) -> Extent {
    let [lat_a, west, lat_b, east] = bbox;
    Extent::new(west, lat_a.min(lat_b), east, lat_a.max(lat_b))
}

pub fn crosses_antimeridian(extent: &Extent) -> bool {
    extent.min_x() > extent.max_x()
}

/// Moves the east edge past 180° when the extent wraps the dateline.
///
/// This only keeps the extent from inverting; it is not a dateline split.
pub fn widen_antimeridian(extent: Extent) -> Extent {
    if crosses_antimeridian(&extent) {
        Extent::new(
            extent.min_x(),
            extent.min_y(),
            extent.max_x() + 360.0,
            extent.max_y(),
        )
    } else {
        extent
    }
}

/// Edge samples of `extent`, `stops` per edge, walking counter-clockwise from the
/// south-west corner along all four edges at once.
pub fn edge_samples(extent: &Extent, stops: usize) -> Vec<(f64, f64)> {
    let stops = stops.max(1);
    let width = extent.width();
    let height = extent.height();
    let mut points = Vec::with_capacity(stops * 4);

    for i in 0..stops {
        let t = i as f64 / stops as f64;
        points.push((extent.min_x() + width * t, extent.min_y()));
        points.push((extent.max_x(), extent.min_y() + height * t));
        points.push((extent.max_x() - width * t, extent.max_y()));
        points.push((extent.min_x(), extent.max_y() - height * t));
    }
    points
}

/// Bounding box of the transformed edge samples.
///
/// Samples the transform rejects or maps to non-finite values are skipped; if none
/// survive the extent has no usable image in the target projection.
pub fn apply_transform<F>(extent: &Extent, transform: F, stops: usize) -> Result<Extent>
where
    F: Fn(f64, f64) -> Result<(f64, f64)>,
{
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut skipped = 0usize;

    for (x, y) in edge_samples(extent, stops) {
        match transform(x, y) {
            Ok((tx, ty)) if tx.is_finite() && ty.is_finite() => {
                min_x = min_x.min(tx);
                min_y = min_y.min(ty);
                max_x = max_x.max(tx);
                max_y = max_y.max(ty);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} extent samples outside the projection domain", skipped);
    }

    let projected = Extent::new(min_x, min_y, max_x, max_y);
    if projected.is_finite() {
        Ok(projected)
    } else {
        Err(ResolverError::ValidationError {
            message: format!("extent {:?} has no finite image in the target projection", extent.0),
        })
    }
}
