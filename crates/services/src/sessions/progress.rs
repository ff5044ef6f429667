/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub position: usize,
    pub remaining_seconds: u32,
    pub is_complete: bool,
}
