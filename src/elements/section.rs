//! Section properties for beam elements

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};

/// Cross-section symmetric about the vertical axis.
///
/// Heights are measured from the bottom fibre. Every query goes through the
/// width-as-function-of-height description, so stiffness and code checks see
/// the same geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Section {
    /// Solid rectangle
    Rectangle { width: f64, height: f64 },
    /// Piecewise-linear outline given as `(height, width)` points from the
    /// bottom fibre (height 0) upward. Repeating a height gives a step.
    Profile { points: Vec<(f64, f64)> },
}

impl Section {
    /// Create a rectangular section
    pub fn rectangular(width: f64, height: f64) -> Self {
        Section::Rectangle { width, height }
    }

    /// Create a general profile, validating the outline
    pub fn profile(points: Vec<(f64, f64)>) -> BeamResult<Self> {
        if points.len() < 2 {
            return Err(BeamError::InvalidGeometry(
                "a profile needs at least two points".to_string(),
            ));
        }
        if points[0].0 != 0.0 {
            return Err(BeamError::InvalidGeometry(
                "a profile must start at height 0".to_string(),
            ));
        }
        if points.windows(2).any(|w| w[1].0 < w[0].0) {
            return Err(BeamError::InvalidGeometry(
                "profile heights must not decrease".to_string(),
            ));
        }
        if points.iter().any(|&(_, w)| w < 0.0) {
            return Err(BeamError::InvalidGeometry(
                "profile widths must be non-negative".to_string(),
            ));
        }
        let section = Section::Profile { points };
        if section.height() <= 0.0 {
            return Err(BeamError::InvalidGeometry("profile has no height".to_string()));
        }
        Ok(section)
    }

    /// T-section with the flange on top
    pub fn tee(flange_width: f64, flange_thickness: f64, web_width: f64, height: f64) -> BeamResult<Self> {
        let web_top = height - flange_thickness;
        Self::profile(vec![
            (0.0, web_width),
            (web_top, web_width),
            (web_top, flange_width),
            (height, flange_width),
        ])
    }

    /// Total height
    pub fn height(&self) -> f64 {
        match self {
            Section::Rectangle { height, .. } => *height,
            Section::Profile { points } => points.last().map(|p| p.0).unwrap_or(0.0),
        }
    }

    /// Width at a given height from the bottom fibre (0 outside the section)
    pub fn width_at(&self, y: f64) -> f64 {
        if y < 0.0 || y > self.height() {
            return 0.0;
        }
        match self {
            Section::Rectangle { width, .. } => *width,
            Section::Profile { points } => {
                let mut width = points[0].1;
                for w in points.windows(2) {
                    let ((y0, w0), (y1, w1)) = (w[0], w[1]);
                    if y >= y0 && y <= y1 {
                        width = if y1 > y0 {
                            w0 + (w1 - w0) * (y - y0) / (y1 - y0)
                        } else {
                            w1
                        };
                        if y < y1 {
                            break;
                        }
                    }
                }
                width
            }
        }
    }

    /// Width of the bottom fibre
    pub fn bottom_width(&self) -> f64 {
        self.width_at(0.0)
    }

    /// Width of the top fibre
    pub fn top_width(&self) -> f64 {
        self.width_at(self.height())
    }

    /// Minimum width, used as bw in shear checks
    pub fn web_width(&self) -> f64 {
        match self {
            Section::Rectangle { width, .. } => *width,
            Section::Profile { points } => points
                .iter()
                .map(|p| p.1)
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// ∫ w(y)·yⁿ dy between two heights
    fn width_moment(&self, begin: f64, end: f64, n: i32) -> f64 {
        let begin = begin.max(0.0);
        let end = end.min(self.height());
        if end <= begin {
            return 0.0;
        }
        let linear_pieces: Vec<(f64, f64, f64, f64)> = match self {
            Section::Rectangle { width, height } => vec![(0.0, *width, *height, *width)],
            Section::Profile { points } => points
                .windows(2)
                .map(|w| (w[0].0, w[0].1, w[1].0, w[1].1))
                .collect(),
        };

        let mut total = 0.0;
        for (y0, w0, y1, w1) in linear_pieces {
            if y1 <= y0 {
                continue;
            }
            let a = y0.max(begin);
            let b = y1.min(end);
            if b <= a {
                continue;
            }
            // w(y) = c0 + c1·y on this piece
            let c1 = (w1 - w0) / (y1 - y0);
            let c0 = w0 - c1 * y0;
            let p1 = (n + 1) as f64;
            let p2 = (n + 2) as f64;
            total += c0 * (b.powi(n + 1) - a.powi(n + 1)) / p1
                + c1 * (b.powi(n + 2) - a.powi(n + 2)) / p2;
        }
        total
    }

    /// Area between two heights
    pub fn area_between(&self, begin: f64, end: f64) -> f64 {
        self.width_moment(begin, end, 0)
    }

    /// Gross area
    pub fn area(&self) -> f64 {
        self.area_between(0.0, self.height())
    }

    /// Height of the centroid above the bottom fibre
    pub fn centroid(&self) -> f64 {
        let area = self.area();
        if area <= 0.0 {
            return 0.0;
        }
        self.width_moment(0.0, self.height(), 1) / area
    }

    /// Second moment of area about the horizontal centroidal axis
    pub fn inertia(&self) -> f64 {
        match self {
            Section::Rectangle { width, height } => width * height.powi(3) / 12.0,
            Section::Profile { .. } => {
                let yc = self.centroid();
                self.width_moment(0.0, self.height(), 2) - self.area() * yc * yc
            }
        }
    }
}

impl Default for Section {
    fn default() -> Self {
        Self::rectangular(20.0, 50.0)
    }
}
