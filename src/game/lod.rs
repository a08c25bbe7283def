use serde::{Deserialize, Serialize};

/// Discrete detail tier chosen by distance from the viewer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DetailLevel {
    #[default]
    High,
    Medium,
    Low,
}

/// Distance cut-offs between detail tiers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LodThresholds {
    /// Below this distance objects render at `High`.
    pub high: f32,
    /// Below this distance (and at or above `high`) objects render at `Medium`.
    pub medium: f32,
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self { high: 20.0, medium: 40.0 }
    }
}

impl LodThresholds {
    pub fn new(high: f32, medium: f32) -> Self {
        Self { high, medium }
    }

    pub fn level_for(&self, distance: f32) -> DetailLevel {
        if distance < self.high {
            DetailLevel::High
        } else if distance < self.medium {
            DetailLevel::Medium
        } else {
            DetailLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries_are_exclusive() {
        let lod = LodThresholds::new(10.0, 30.0);
        assert_eq!(lod.level_for(0.0), DetailLevel::High);
        assert_eq!(lod.level_for(9.99), DetailLevel::High);
        assert_eq!(lod.level_for(10.0), DetailLevel::Medium);
        assert_eq!(lod.level_for(29.9), DetailLevel::Medium);
        assert_eq!(lod.level_for(30.0), DetailLevel::Low);
        assert_eq!(lod.level_for(1.0e6), DetailLevel::Low);
    }

    #[test]
    fn test_levels_order_by_detail() {
        assert!(DetailLevel::High < DetailLevel::Medium);
        assert!(DetailLevel::Medium < DetailLevel::Low);
        assert_eq!(DetailLevel::default(), DetailLevel::High);
    }
}
