//! # Viewport Fitter
//!
//! The map rectangle that shows every known point of interest.

use crate::model::Coordinate;
use crate::resolver::ResolvedPoints;
use serde::Serialize;

/// Smallest span (degrees) a fitted region may have in either dimension.
pub const DEFAULT_MIN_SPAN: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingRegion {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingRegion {
    /// A square region of `span` degrees centered on `center`.
    pub fn around(center: Coordinate, span: f64) -> Self {
        let half = span / 2.0;
        Self {
            south: center.lat - half,
            west: center.lng - half,
            north: center.lat + half,
            east: center.lng + half,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn contains(&self, c: Coordinate) -> bool {
        (self.south..=self.north).contains(&c.lat) && (self.west..=self.east).contains(&c.lng)
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    fn extend(&mut self, c: Coordinate) {
        self.south = self.south.min(c.lat);
        self.north = self.north.max(c.lat);
        self.west = self.west.min(c.lng);
        self.east = self.east.max(c.lng);
    }

    /// Widens each dimension narrower than `min_span` symmetrically about its middle.
    fn widen_to(&mut self, min_span: f64) {
        if self.lat_span() < min_span {
            let mid = (self.south + self.north) / 2.0;
            self.south = mid - min_span / 2.0;
            self.north = mid + min_span / 2.0;
        }
        if self.lng_span() < min_span {
            let mid = (self.west + self.east) / 2.0;
            self.west = mid - min_span / 2.0;
            self.east = mid + min_span / 2.0;
        }
    }
}

/// Bounds covering every present point, or `None` when there are none.
///
/// Pure: identical input always yields an identical region.
pub fn compute_bounds(points: &ResolvedPoints, min_span: f64) -> Option<BoundingRegion> {
    let mut present = points.present();
    let first = present.next()?;
    let mut region = BoundingRegion {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    for c in present {
        region.extend(c);
    }
    region.widen_to(min_span);
    Some(region)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub region: BoundingRegion,
    /// `false` when no point was known and `region` is the default.
    pub fitted: bool,
}

/// Per-session viewport state: recomputes only when the resolved points change.
pub struct ViewportFitter {
    min_span: f64,
    default_center: Coordinate,
    last: Option<(ResolvedPoints, Viewport)>,
}

impl ViewportFitter {
    pub fn new(min_span: f64, default_center: Coordinate) -> Self {
        Self {
            min_span,
            default_center,
            last: None,
        }
    }

    pub fn fit(&mut self, points: &ResolvedPoints) -> Viewport {
        if let Some((previous, viewport)) = &self.last {
            if previous == points {
                return *viewport;
            }
        }
        let viewport = match compute_bounds(points, self.min_span) {
            Some(region) => Viewport { region, fitted: true },
            None => Viewport {
                region: BoundingRegion::around(self.default_center, self.min_span),
                fitted: false,
            },
        };
        self.last = Some((points.clone(), viewport));
        viewport
    }
}
