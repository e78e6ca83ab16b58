//! Planet size classes.

use serde::{Deserialize, Serialize};

/// Five ordered planet tiers.
///
/// Each tier fixes the size value used to scale extraction, the number of
/// structure slots, and the base population capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeClass {
    Tiny,
    Small,
    Standard,
    Big,
    Colossal,
}

impl SizeClass {
    /// All classes, smallest first.
    pub const ALL: [SizeClass; 5] = [
        SizeClass::Tiny,
        SizeClass::Small,
        SizeClass::Standard,
        SizeClass::Big,
        SizeClass::Colossal,
    ];

    /// The largest class.
    pub const LARGEST: SizeClass = SizeClass::Colossal;

    /// Numeric size value.
    pub fn value(self) -> f64 {
        match self {
            SizeClass::Tiny => 3.0,
            SizeClass::Small => 4.5,
            SizeClass::Standard => 6.0,
            SizeClass::Big => 7.5,
            SizeClass::Colossal => 9.0,
        }
    }

    /// Total structure size a planet of this class can hold.
    pub fn structure_limit(self) -> u32 {
        match self {
            SizeClass::Tiny => 2,
            SizeClass::Small => 3,
            SizeClass::Standard => 4,
            SizeClass::Big => 5,
            SizeClass::Colossal => 6,
        }
    }

    /// Base population capacity.
    pub fn population_capacity(self) -> u32 {
        match self {
            SizeClass::Tiny => 5,
            SizeClass::Small => 10,
            SizeClass::Standard => 20,
            SizeClass::Big => 40,
            SizeClass::Colossal => 80,
        }
    }

    /// Extraction scale relative to the largest class, in `(0, 1]`.
    pub fn extraction_scale(self) -> f64 {
        self.value() / Self::LARGEST.value()
    }

    /// Class for a tier index, clamping anything past the end to the largest.
    pub fn from_index(index: usize) -> SizeClass {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_are_ordered_by_value_and_slots() {
        for pair in SizeClass::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].value() < pair[1].value());
            assert!(pair[0].structure_limit() < pair[1].structure_limit());
        }
    }

    #[test]
    fn test_extraction_scale() {
        assert!((SizeClass::Standard.extraction_scale() - 6.0 / 9.0).abs() < 1e-12);
        assert_eq!(SizeClass::Colossal.extraction_scale(), 1.0);
    }

    #[test]
    fn test_from_index_clamps() {
        assert_eq!(SizeClass::from_index(0), SizeClass::Tiny);
        assert_eq!(SizeClass::from_index(4), SizeClass::Colossal);
        assert_eq!(SizeClass::from_index(17), SizeClass::Colossal);
    }
}
