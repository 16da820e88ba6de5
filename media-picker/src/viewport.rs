/// Axis-aligned rectangle in grid content coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Shrinks by the given margins; negative margins expand
    pub fn inset_by(&self, dx: f64, dy: f64) -> Rect {
        Rect {
            x: self.x + dx,
            y: self.y + dy,
            width: self.width - 2.0 * dx,
            height: self.height - 2.0 * dy,
        }
    }

    /// Empty rects intersect nothing
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Bands gained and lost between two preheat rects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandDiff {
    pub added: Vec<Rect>,
    pub removed: Vec<Rect>,
}

/// Viewport-driven prefetch window over a vertically scrolling grid.
///
/// The preheat rect is the visible rect expanded by half its height on both
/// ends. Updates are debounced: nothing recomputes until the midpoint has
/// moved more than a third of the viewport height since the last accepted
/// update, so caching work is not churned on every scroll tick.
#[derive(Debug, Clone, Default)]
pub struct PreheatWindow {
    previous: Rect,
}

impl PreheatWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the window to the given visible rect.
    ///
    /// Returns the bands to start and stop caching for, or None while the
    /// movement stays inside the debounce margin.
    pub fn update(&mut self, visible: Rect) -> Option<BandDiff> {
        if visible.is_empty() {
            return None;
        }
        let preheat = visible.inset_by(0.0, -0.5 * visible.height);
        let delta = (preheat.mid_y() - self.previous.mid_y()).abs();
        if delta <= visible.height / 3.0 {
            return None;
        }
        let diff = diff_bands(self.previous, preheat);
        self.previous = preheat;
        Some(diff)
    }

    /// Forgets the previous window so stale geometry is never replayed
    /// against a reordered data source
    pub fn reset(&mut self) {
        self.previous = Rect::ZERO;
    }
}

/// Computes the vertical set-difference between two preheat rects.
///
/// Intersecting rects produce up to two added and two removed bands from
/// the four edge comparisons; disjoint rects swap wholesale. Empty bands
/// are dropped.
pub fn diff_bands(old: Rect, new: Rect) -> BandDiff {
    let mut diff = BandDiff::default();
    if old.intersects(&new) {
        if new.max_y() > old.max_y() {
            diff.added.push(band(&new, old.max_y(), new.max_y()));
        }
        if old.min_y() > new.min_y() {
            diff.added.push(band(&new, new.min_y(), old.min_y()));
        }
        if new.max_y() < old.max_y() {
            diff.removed.push(band(&new, new.max_y(), old.max_y()));
        }
        if old.min_y() < new.min_y() {
            diff.removed.push(band(&new, old.min_y(), new.min_y()));
        }
    } else {
        if !new.is_empty() {
            diff.added.push(new);
        }
        if !old.is_empty() {
            diff.removed.push(old);
        }
    }
    diff
}

fn band(reference: &Rect, top: f64, bottom: f64) -> Rect {
    Rect::new(reference.x, top, reference.width, bottom - top)
}
