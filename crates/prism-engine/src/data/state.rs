use core::fmt;

/// Observable state of one representation type within a data object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ReprState {
    /// No instance exists.
    Absent,
    /// Instance exists and matches the current content.
    Valid,
    /// Instance exists but predates the last write.
    Stale,
}

impl fmt::Display for ReprState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReprState::Absent => "absent",
            ReprState::Valid => "valid",
            ReprState::Stale => "stale",
        })
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(super) enum Validity {
    Valid,
    Stale,
}

/// Conversion work performed by one data object.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ConversionStats {
    /// Destinations allocated by a converter.
    pub created: u64,
    /// Stale destinations refreshed in place.
    pub updated: u64,
    /// Chain stages skipped because their destination was already valid.
    pub skipped: u64,
}

impl ConversionStats {
    /// Creates plus updates.
    #[inline]
    pub fn conversions(&self) -> u64 {
        self.created + self.updated
    }
}
