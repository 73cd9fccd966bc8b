/// Length heuristic that decides whether OCR output is worth keeping.
///
/// Text is accepted when its trimmed character count is strictly greater than
/// `min_length`, so a minimum of 0 only turns away blank results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityGate {
    min_length: usize,
}

impl QualityGate {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn accepts(&self, text: &str) -> bool {
        text.trim().chars().count() > self.min_length
    }
}
