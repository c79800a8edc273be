//! Visual center (pole of inaccessibility) of a polygon
//!
//! Iterative quadtree refinement: the bounding box is covered with square
//! cells, each scored by the signed distance from its center to the polygon
//! boundary, and a priority queue repeatedly splits the cell that could
//! still beat the best-known interior point. Terminates once no cell can
//! improve the best distance by more than the requested precision.
//!
//! Unlike the centroid, the result is guaranteed to lie inside the polygon
//! and sits in its visual bulk, which makes it the right anchor for point
//! labels and snapped address markers.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::BoundingRect;
use geo_types::{Coord, LineString, Point, Polygon};
use parcelsnap_core::{Error, Result};

/// Compute the visual center of a polygon, refined until the distance to
/// the boundary is within `precision` (in coordinate units) of optimal.
///
/// A polygon with a zero-extent bounding box yields its minimum corner; an
/// empty polygon is an error.
pub fn visual_center(polygon: &Polygon<f64>, precision: f64) -> Result<Point<f64>> {
    let rect = polygon.bounding_rect().ok_or_else(|| {
        Error::InvalidGeometry("cannot compute the visual center of an empty polygon".to_string())
    })?;
    let min = rect.min();
    let max = rect.max();
    let width = max.x - min.x;
    let height = max.y - min.y;
    let cell_size = width.min(height);
    if cell_size == 0.0 {
        return Ok(Point::new(min.x, min.y));
    }

    let h = cell_size / 2.0;
    let mut queue = BinaryHeap::new();

    // Cover the bounding box with the initial cell grid
    let mut x = min.x;
    while x < max.x {
        let mut y = min.y;
        while y < max.y {
            queue.push(Cell::new(x + h, y + h, h, polygon));
            y += cell_size;
        }
        x += cell_size;
    }

    // Take the better of the centroid and the bbox center as the seed
    let mut best = centroid_cell(polygon)
        .unwrap_or_else(|| Cell::new(min.x + width / 2.0, min.y + height / 2.0, 0.0, polygon));
    let bbox_cell = Cell::new(min.x + width / 2.0, min.y + height / 2.0, 0.0, polygon);
    if bbox_cell.distance > best.distance {
        best = bbox_cell;
    }

    while let Some(cell) = queue.pop() {
        if cell.distance > best.distance {
            best = cell;
        }
        // The cell cannot contain a point meaningfully better than best
        if cell.max - best.distance <= precision {
            continue;
        }
        let h = cell.h / 2.0;
        queue.push(Cell::new(cell.x - h, cell.y - h, h, polygon));
        queue.push(Cell::new(cell.x + h, cell.y - h, h, polygon));
        queue.push(Cell::new(cell.x - h, cell.y + h, h, polygon));
        queue.push(Cell::new(cell.x + h, cell.y + h, h, polygon));
    }

    Ok(Point::new(best.x, best.y))
}

/// A quadtree cell ordered by the best distance it could still contain
#[derive(Debug, Clone, Copy)]
struct Cell {
    x: f64,
    y: f64,
    /// Half the cell side
    h: f64,
    /// Signed distance from the cell center to the polygon boundary
    distance: f64,
    /// Upper bound on the distance of any point within the cell
    max: f64,
}

impl Cell {
    fn new(x: f64, y: f64, h: f64, polygon: &Polygon<f64>) -> Self {
        let distance = point_to_boundary(x, y, polygon);
        Self {
            x,
            y,
            h,
            distance,
            max: distance + h * std::f64::consts::SQRT_2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.max == other.max
    }
}

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.max.partial_cmp(&other.max).unwrap_or(Ordering::Equal)
    }
}

/// Signed distance from a point to the polygon boundary: positive inside,
/// negative outside (even-odd rule over all rings).
fn point_to_boundary(x: f64, y: f64, polygon: &Polygon<f64>) -> f64 {
    let mut inside = false;
    let mut min_dist_sq = f64::INFINITY;

    for ring in rings(polygon) {
        for pair in ring.0.windows(2) {
            let a = pair[0];
            let b = pair[1];
            if (a.y > y) != (b.y > y) && (x < (b.x - a.x) * (y - a.y) / (b.y - a.y) + a.x) {
                inside = !inside;
            }
            min_dist_sq = min_dist_sq.min(segment_dist_sq(x, y, a, b));
        }
    }

    if min_dist_sq == f64::INFINITY {
        return 0.0;
    }
    let sign = if inside { 1.0 } else { -1.0 };
    sign * min_dist_sq.sqrt()
}

/// Area-weighted centroid seed cell
fn centroid_cell(polygon: &Polygon<f64>) -> Option<Cell> {
    let ring = polygon.exterior();
    let coords = &ring.0;
    if coords.is_empty() {
        return None;
    }
    let mut area = 0.0;
    let mut x = 0.0;
    let mut y = 0.0;

    for pair in coords.windows(2) {
        let a = pair[0];
        let b = pair[1];
        let f = a.x * b.y - b.x * a.y;
        x += (a.x + b.x) * f;
        y += (a.y + b.y) * f;
        area += f * 3.0;
    }

    if area == 0.0 {
        Some(Cell::new(coords[0].x, coords[0].y, 0.0, polygon))
    } else {
        Some(Cell::new(x / area, y / area, 0.0, polygon))
    }
}

fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors())
}

/// Squared distance from a point to a segment
fn segment_dist_sq(px: f64, py: f64, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let mut x = a.x;
    let mut y = a.y;
    let dx = b.x - x;
    let dy = b.y - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((px - x) * dx + (py - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.x;
            y = b.y;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    (px - x).powi(2) + (py - y).powi(2)
}
