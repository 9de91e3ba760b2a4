//! Closed scalar interval, used for separating-axis projections

use crate::foundation::math::Vec3;

/// Closed interval `[low, high]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Lower end
    pub low: f32,
    /// Upper end
    pub high: f32,
}

impl Interval {
    /// Create an interval, swapping the ends if needed
    pub fn new(a: f32, b: f32) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// `[center - radius, center + radius]`
    pub fn around(center: f32, radius: f32) -> Self {
        Self::new(center - radius, center + radius)
    }

    /// Extent of `points` along `axis`
    pub fn from_projection(points: &[Vec3], axis: &Vec3) -> Self {
        points.iter().map(|p| p.dot(axis)).fold(
            Self {
                low: f32::INFINITY,
                high: f32::NEG_INFINITY,
            },
            |acc, d| Self {
                low: acc.low.min(d),
                high: acc.high.max(d),
            },
        )
    }

    /// Length of the interval
    pub fn length(&self) -> f32 {
        self.high - self.low
    }

    /// `true` when no value satisfies `low <= x <= high`
    pub fn is_empty(&self) -> bool {
        self.low > self.high
    }

    /// Closed containment
    pub fn contains(&self, value: f32) -> bool {
        self.low <= value && value <= self.high
    }

    /// Closed overlap; intervals sharing an endpoint overlap
    pub fn overlaps(&self, other: &Self) -> bool {
        self.low <= other.high && other.low <= self.high
    }

    /// Shared part, if any
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let low = self.low.max(other.low);
        let high = self.high.min(other.high);
        (low <= high).then_some(Self { low, high })
    }
}
