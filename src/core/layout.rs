//! Spatial layout assigner
//!
//! Assigns each renderable item (galaxy or solitary planet) a stable 3D
//! position on a layered spiral. Positions are memoized per index: once an
//! index has a position it never moves, even as the total item count grows,
//! so the view does not jump while live data streams in.

use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

/// Golden angle in radians; staggers consecutive layers so they do not
/// visually align.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// A point in the universe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Distance from the vertical axis.
    pub fn radius(&self) -> f64 {
        (self.x * self.x + self.z * self.z).sqrt()
    }
}

/// Tuning knobs for the spiral placement.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Innermost layer radius.
    pub min_radius: f64,
    /// Outermost layer radius; jittered radii are clamped to this.
    pub max_radius: f64,
    /// Items land within `[-vertical_spread / 2, vertical_spread / 2]` on Y.
    pub vertical_spread: f64,
    /// How many full turns one layer's worth of items sweeps.
    pub spiral_turns: f64,
    /// Radial jitter as a fraction of the radius band.
    pub radius_jitter: f64,
    /// Angular jitter in radians.
    pub angle_jitter: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_radius: 60.0,
            max_radius: 220.0,
            vertical_spread: 40.0,
            spiral_turns: 2.0,
            radius_jitter: 0.08,
            angle_jitter: 0.12,
        }
    }
}

impl LayoutConfig {
    /// Negative jitter and spread knobs are treated as zero; the jitter
    /// ranges below require non-negative half-widths.
    fn sanitized(mut self) -> Self {
        self.vertical_spread = self.vertical_spread.max(0.0);
        self.radius_jitter = self.radius_jitter.max(0.0);
        self.angle_jitter = self.angle_jitter.max(0.0);
        self
    }
}

/// Memoized position assignment.
///
/// Owned by the session (not a module-level singleton) so independent
/// sessions and tests never share placement state. The cache is append-only
/// for the lifetime of the session.
pub struct LayoutCache {
    config: LayoutConfig,
    positions: HashMap<usize, Position>,
    rng: SmallRng,
}

impl LayoutCache {
    /// Cache with jitter seeded from process entropy.
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config: config.sanitized(),
            positions: HashMap::new(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Cache with a fixed jitter seed, for reproducible placement.
    pub fn with_seed(config: LayoutConfig, seed: u64) -> Self {
        Self {
            config: config.sanitized(),
            positions: HashMap::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Position for item `index` out of `total` items.
    ///
    /// Returns the cached position if `index` has one, regardless of how
    /// `total` has changed since. New indices are placed on a layered
    /// spiral with bounded jitter and cached.
    pub fn position_for(&mut self, index: usize, total: usize) -> Position {
        if let Some(&pos) = self.positions.get(&index) {
            return pos;
        }

        let pos = self.place(index, total);
        self.positions.insert(index, pos);
        trace!(
            index,
            total,
            x = pos.x,
            y = pos.y,
            z = pos.z,
            "Position assigned"
        );
        pos
    }

    fn place(&mut self, index: usize, total: usize) -> Position {
        let cfg = &self.config;
        // Keep the math total even for degenerate inputs.
        let total = total.max(index + 1).max(1);

        let layer_size = (total as f64).sqrt().ceil() as usize;
        let layer = index / layer_size;
        let pos_in_layer = index % layer_size;
        let layer_count = total.div_ceil(layer_size).max(layer + 1);

        let band = cfg.max_radius - cfg.min_radius;
        let base_radius = cfg.min_radius + band * (layer as f64 + 1.0) / layer_count as f64;

        // Multi-turn sweep within the layer plus a golden-angle offset per
        // layer keeps adjacent layers from lining up.
        let sweep = pos_in_layer as f64 / layer_size as f64 * TAU * cfg.spiral_turns;
        let angle = sweep
            + layer as f64 * GOLDEN_ANGLE
            + self.rng.gen_range(-cfg.angle_jitter..=cfg.angle_jitter);

        let radius = (base_radius
            + self.rng.gen_range(-cfg.radius_jitter..=cfg.radius_jitter) * band)
            .clamp(cfg.min_radius, cfg.max_radius);

        let half_spread = cfg.vertical_spread / 2.0;
        let y = self.rng.gen_range(-half_spread..=half_spread);

        Position {
            x: radius * angle.cos(),
            y,
            z: radius * angle.sin(),
        }
    }

    /// Number of indices placed so far.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
