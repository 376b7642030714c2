#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the device to drop these uploads. Never empty.
    CancelUploads { ids: Vec<String> },
}
