use crate::foundation::error::{TesseraError, TesseraResult};

/// Fixed output dimensions shared by every raster in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CanvasSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl CanvasSize {
    /// Default square canvas edge.
    pub const DEFAULT_EDGE: u32 = 512;

    /// Build a canvas size, rejecting zero-area dimensions.
    pub fn new(width: u32, height: u32) -> TesseraResult<Self> {
        if width == 0 || height == 0 {
            return Err(TesseraError::validation(
                "canvas width and height must be > 0",
            ));
        }
        Ok(Self { width, height })
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize) * (self.height as usize) * 4
    }

    /// Parse a `WIDTHxHEIGHT` string (for example `512x512`).
    pub fn parse(s: &str) -> TesseraResult<Self> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| TesseraError::validation(format!("invalid canvas size '{s}'")))?;
        let width = w
            .trim()
            .parse::<u32>()
            .map_err(|e| TesseraError::validation(format!("invalid canvas width '{w}': {e}")))?;
        let height = h
            .trim()
            .parse::<u32>()
            .map_err(|e| TesseraError::validation(format!("invalid canvas height '{h}': {e}")))?;
        Self::new(width, height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_EDGE,
            height: Self::DEFAULT_EDGE,
        }
    }
}

/// Completed/total counter for a long-running operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    /// Units of work finished so far.
    pub completed: usize,
    /// Units of work requested.
    pub total: usize,
}

impl Progress {
    /// Build a progress value.
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// Completion percentage in `[0, 100]`. An empty run counts as complete.
    pub fn percent(self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        let ratio = self.completed.min(self.total) as f64 / self.total as f64;
        ratio * 100.0
    }

    /// Map this progress onto the `[start, end]` percentage segment.
    pub fn percent_in(self, start: f64, end: f64) -> f64 {
        start + (end - start) * (self.percent() / 100.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
