//! Gradient descriptors
//!
//! A [`Gradient`] is an immutable value describing a multi-stop color fill.
//! The renderer treats gradients as opaque cache keys: equality and hashing
//! are defined over component bit patterns so two descriptors built from the
//! same values always collide.

use smallvec::SmallVec;

use crate::color::Color;

/// Maximum number of stops a gradient may carry. The renderer expands stop
/// lists into fixed-capacity shader arrays of this size.
pub const MAX_STOPS: usize = 256;

/// A gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient axis, 0.0 to 1.0
    pub offset: f32,
    pub color: Color,
}

/// Direction of the gradient axis
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GradientDirection {
    Horizontal,
    Vertical,
    /// Linear gradient along an arbitrary angle (radians)
    Diagonal { angle: f32 },
    Radial,
}

/// An immutable multi-stop gradient descriptor.
///
/// `smoothness` controls the filter kernel applied when sampling the
/// gradient; `use_cache` is a usage hint: transient descriptors (for example
/// programmatically animated gradients) bypass the renderer's bounded cache
/// so a one-shot fill never evicts a resident entry. The hint is not part of
/// the descriptor's identity.
#[derive(Clone, Debug)]
pub struct Gradient {
    stops: SmallVec<[GradientStop; 2]>,
    direction: GradientDirection,
    smoothness: f32,
    use_cache: bool,
}

impl Gradient {
    /// Create a gradient from stops. Stops are sorted by offset; at most
    /// [`MAX_STOPS`] are kept.
    pub fn new(stops: impl IntoIterator<Item = GradientStop>, direction: GradientDirection) -> Self {
        let mut stops: SmallVec<[GradientStop; 2]> = stops.into_iter().take(MAX_STOPS).collect();
        stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        Self {
            stops,
            direction,
            smoothness: 0.0,
            use_cache: true,
        }
    }

    /// Two-stop gradient running left to right
    pub fn horizontal(from: Color, to: Color) -> Self {
        Self::two_stop(from, to, GradientDirection::Horizontal)
    }

    /// Two-stop gradient running top to bottom
    pub fn vertical(from: Color, to: Color) -> Self {
        Self::two_stop(from, to, GradientDirection::Vertical)
    }

    /// Two-stop gradient radiating from the center
    pub fn radial(from: Color, to: Color) -> Self {
        Self::two_stop(from, to, GradientDirection::Radial)
    }

    fn two_stop(from: Color, to: Color, direction: GradientDirection) -> Self {
        Self::new(
            [
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
            direction,
        )
    }

    /// Set the sampling smoothness (0.0 = hard stops)
    pub fn with_smoothness(mut self, smoothness: f32) -> Self {
        self.smoothness = smoothness;
        self
    }

    /// Mark the gradient as transient: the renderer computes its shader data
    /// into a single overflow slot instead of the bounded cache.
    pub fn transient(mut self) -> Self {
        self.use_cache = false;
        self
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn direction(&self) -> GradientDirection {
        self.direction
    }

    pub fn smoothness(&self) -> f32 {
        self.smoothness
    }

    pub fn use_cache(&self) -> bool {
        self.use_cache
    }

    fn direction_bits(&self) -> (u8, u32) {
        match self.direction {
            GradientDirection::Horizontal => (0, 0),
            GradientDirection::Vertical => (1, 0),
            GradientDirection::Diagonal { angle } => (2, angle.to_bits()),
            GradientDirection::Radial => (3, 0),
        }
    }
}

// Identity is bitwise over stops, direction, and smoothness. `use_cache` is
// excluded: it is a usage hint, and a transient descriptor equal to a cached
// one describes the same fill.
impl PartialEq for Gradient {
    fn eq(&self, other: &Self) -> bool {
        self.direction_bits() == other.direction_bits()
            && self.smoothness.to_bits() == other.smoothness.to_bits()
            && self.stops.len() == other.stops.len()
            && self
                .stops
                .iter()
                .zip(other.stops.iter())
                .all(|(a, b)| {
                    a.offset.to_bits() == b.offset.to_bits() && a.color.to_bits() == b.color.to_bits()
                })
    }
}

impl Eq for Gradient {}

impl std::hash::Hash for Gradient {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.direction_bits().hash(state);
        self.smoothness.to_bits().hash(state);
        self.stops.len().hash(state);
        for stop in &self.stops {
            stop.offset.to_bits().hash(state);
            stop.color.to_bits().hash(state);
        }
    }
}
