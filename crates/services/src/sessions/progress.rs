/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionProgress {
    /// 1-based position of the active block, 0 when nothing is loaded.
    pub position: usize,
    pub total: usize,
    pub fraction: f64,
    pub is_last: bool,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Progress as a whole percentage for progress bars.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.fraction.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}
