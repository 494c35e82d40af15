//! Store configuration.

/// Storage key the whole state blob is written under.
pub const DEFAULT_STORAGE_KEY: &str = "course-storage";
/// Smallest zoom the canvas may be set to.
pub const DEFAULT_MIN_CANVAS_SCALE: f64 = 0.5;
/// Largest zoom the canvas may be set to.
pub const DEFAULT_MAX_CANVAS_SCALE: f64 = 3.0;

/// Options applied when constructing a [`crate::CourseStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOptions {
    pub storage_key: String,
    pub min_canvas_scale: f64,
    pub max_canvas_scale: f64,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            min_canvas_scale: DEFAULT_MIN_CANVAS_SCALE,
            max_canvas_scale: DEFAULT_MAX_CANVAS_SCALE,
        }
    }
}

impl StoreOptions {
    /// Clamps `scale` into the configured zoom range.
    ///
    /// Returns `None` for non-finite input.
    pub fn clamp_scale(&self, scale: f64) -> Option<f64> {
        if !scale.is_finite() {
            return None;
        }
        let (low, high) = if self.min_canvas_scale <= self.max_canvas_scale {
            (self.min_canvas_scale, self.max_canvas_scale)
        } else {
            (self.max_canvas_scale, self.min_canvas_scale)
        };
        Some(scale.clamp(low, high))
    }
}
