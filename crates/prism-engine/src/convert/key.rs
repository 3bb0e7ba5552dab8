use core::cmp::Ordering;

/// Policy for choosing between several packages that reach the same
/// destination from the same source type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum TieBreak {
    /// First registered package wins.
    #[default]
    RegistrationOrder,
    /// Shortest package wins; registration order breaks remaining ties.
    FewestHops,
}

/// Stable ranking key for registered packages.
///
/// Ordering rules:
/// 1) `hops`: ascending, only under [`TieBreak::FewestHops`]
/// 2) `order`: ascending (registration order)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PathKey {
    /// Number of elementary conversions in the package.
    pub hops: usize,
    /// Registration index, unique per registry.
    pub order: u32,
}

impl PathKey {
    #[inline]
    pub const fn new(hops: usize, order: u32) -> Self {
        Self { hops, order }
    }

    #[inline]
    pub fn cmp_under(&self, other: &Self, policy: TieBreak) -> Ordering {
        match policy {
            TieBreak::RegistrationOrder => self.order.cmp(&other.order),
            TieBreak::FewestHops => match self.hops.cmp(&other.hops) {
                Ordering::Equal => self.order.cmp(&other.order),
                o => o,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_ignores_length() {
        let long_first = PathKey::new(3, 0);
        let short_later = PathKey::new(2, 1);
        assert_eq!(
            long_first.cmp_under(&short_later, TieBreak::RegistrationOrder),
            Ordering::Less
        );
    }

    #[test]
    fn fewest_hops_prefers_short_then_order() {
        let long_first = PathKey::new(3, 0);
        let short_later = PathKey::new(2, 1);
        let short_latest = PathKey::new(2, 2);
        assert_eq!(long_first.cmp_under(&short_later, TieBreak::FewestHops), Ordering::Greater);
        assert_eq!(short_later.cmp_under(&short_latest, TieBreak::FewestHops), Ordering::Less);
    }
}
