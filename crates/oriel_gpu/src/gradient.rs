//! Gradient shader data cache
//!
//! Gradient fills sample precomputed data: stop positions and colors
//! expanded into fixed-capacity arrays, plus a gaussian filter kernel
//! derived from the descriptor's smoothness. Synthesizing that data is not
//! free, and UI frames draw from a small theme-driven working set of
//! gradients, so results are cached.
//!
//! The cache is bounded by an insertion-order eviction queue: at capacity,
//! inserting a new descriptor evicts the oldest *inserted* entry. Hits do
//! not refresh queue position; tracking access recency is not worth the
//! bookkeeping for this workload. Transient descriptors (one-shot fills)
//! bypass the queue through a single overflow slot so they never evict a
//! resident entry.

use std::collections::VecDeque;

use oriel_paint::{Color, Gradient, MAX_STOPS};
use rustc_hash::FxHashMap;

/// Side length of the square sampling filter kernel
pub const GRADIENT_FILTER_SIZE: usize = 15;

/// Bound on resident cache entries
pub const GRADIENT_DATA_CACHE_QUEUE_SIZE: usize = 64;

/// Precomputed sampling data for one gradient descriptor.
///
/// Owned exclusively by its cache entry; recomputed only when the
/// descriptor itself differs.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientShaderData {
    stop_count: u32,
    stops: Box<[f32; MAX_STOPS]>,
    stop_colors: Box<[[f32; 4]; MAX_STOPS]>,
    filter: Box<[f32; GRADIENT_FILTER_SIZE * GRADIENT_FILTER_SIZE]>,
}

impl GradientShaderData {
    fn synthesize(gradient: &Gradient) -> Self {
        // unused position slots pad to 1.0 and unused color slots pad with
        // the last stop's color, so out-of-range sampling clamps to the edge
        let mut stops = Box::new([1.0f32; MAX_STOPS]);
        let last_color = gradient
            .stops()
            .last()
            .map(|stop| stop.color)
            .unwrap_or(Color::TRANSPARENT);
        let mut stop_colors = Box::new([last_color.to_array(); MAX_STOPS]);
        let count = gradient.stops().len().min(MAX_STOPS);
        for (i, stop) in gradient.stops().iter().take(count).enumerate() {
            stops[i] = stop.offset;
            stop_colors[i] = stop.color.to_array();
        }
        Self {
            stop_count: count as u32,
            stops,
            stop_colors,
            filter: gaussian_filter(gradient.smoothness() * 10.0),
        }
    }

    pub fn stop_count(&self) -> u32 {
        self.stop_count
    }

    /// Stop positions, padded to [`MAX_STOPS`]
    pub fn stops(&self) -> &[f32; MAX_STOPS] {
        &self.stops
    }

    /// 4-channel stop colors, padded to [`MAX_STOPS`]
    pub fn stop_colors(&self) -> &[[f32; 4]; MAX_STOPS] {
        &self.stop_colors
    }

    /// Row-major square filter kernel, normalized to sum 1
    pub fn filter(&self) -> &[f32; GRADIENT_FILTER_SIZE * GRADIENT_FILTER_SIZE] {
        &self.filter
    }
}

/// Normalized 2D gaussian kernel. A zero sigma degenerates to an identity
/// kernel (single center tap).
fn gaussian_filter(sigma: f32) -> Box<[f32; GRADIENT_FILTER_SIZE * GRADIENT_FILTER_SIZE]> {
    const N: usize = GRADIENT_FILTER_SIZE;
    let mut kernel = Box::new([0.0f32; N * N]);
    if sigma <= f32::EPSILON {
        kernel[(N / 2) * N + N / 2] = 1.0;
        return kernel;
    }
    let center = (N / 2) as f32;
    let mut sum = 0.0f32;
    for y in 0..N {
        for x in 0..N {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let value = (-(dx * dx + dy * dy) / (2.0 * sigma * sigma)).exp();
            kernel[y * N + x] = value;
            sum += value;
        }
    }
    for value in kernel.iter_mut() {
        *value /= sum;
    }
    kernel
}

/// Bounded map from gradient descriptors to their shader data.
pub struct GradientDataCache {
    map: FxHashMap<Gradient, GradientShaderData>,
    /// Insertion-order eviction queue; front = oldest inserted
    queue: VecDeque<Gradient>,
    /// Overflow slot for transient descriptors; overwritten on every use
    uncached: Option<GradientShaderData>,
}

impl GradientDataCache {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            queue: VecDeque::with_capacity(GRADIENT_DATA_CACHE_QUEUE_SIZE),
            uncached: None,
        }
    }

    /// Shader data for `gradient`.
    ///
    /// Cached descriptors hit without recomputation; misses synthesize,
    /// insert and enqueue, evicting the oldest inserted entry first when the
    /// queue is at capacity. Transient descriptors are synthesized into the
    /// overflow slot and never enqueued.
    pub fn data(&mut self, gradient: &Gradient) -> &GradientShaderData {
        if !gradient.use_cache() {
            return self.uncached.insert(GradientShaderData::synthesize(gradient));
        }
        if !self.map.contains_key(gradient) {
            if self.queue.len() >= GRADIENT_DATA_CACHE_QUEUE_SIZE {
                if let Some(oldest) = self.queue.pop_front() {
                    tracing::trace!("evicting oldest gradient cache entry");
                    self.map.remove(&oldest);
                }
            }
            self.queue.push_back(gradient.clone());
            self.map
                .insert(gradient.clone(), GradientShaderData::synthesize(gradient));
        }
        &self.map[gradient]
    }

    pub fn contains(&self, gradient: &Gradient) -> bool {
        self.map.contains_key(gradient)
    }

    /// Number of resident (queued) entries, excluding the overflow slot
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Empty the cache, the queue, and the transient overflow slot
    pub fn clear(&mut self) {
        self.map.clear();
        self.queue.clear();
        self.uncached = None;
    }
}

impl Default for GradientDataCache {
    fn default() -> Self {
        Self::new()
    }
}
