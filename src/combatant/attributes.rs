//! Primary attributes on the fixed-sum simplex

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};

/// Speed + damage + protection always sums to this
pub const TOTAL_ATTRIBUTE_POINTS: u32 = 50;

/// Floor for each primary attribute
pub const MIN_ATTRIBUTE: u32 = 5;

/// Largest value a single attribute can be drawn at (total minus three floors)
pub const MAX_ATTRIBUTE: u32 = TOTAL_ATTRIBUTE_POINTS - MIN_ATTRIBUTE * 3;

/// The three primary attributes
///
/// Only constructible through [`Attributes::new`], so a value of this type
/// always satisfies the sum and floor invariants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Attributes {
    speed: u32,
    damage: u32,
    protection: u32,
}

/// Names of the three primary attributes, used for sampling order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Speed,
    Damage,
    Protection,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Speed, Attribute::Damage, Attribute::Protection];

    pub fn index(self) -> usize {
        match self {
            Attribute::Speed => 0,
            Attribute::Damage => 1,
            Attribute::Protection => 2,
        }
    }
}

impl Attributes {
    /// Validate and build an attribute triple
    pub fn new(speed: u32, damage: u32, protection: u32) -> Result<Self> {
        let invalid = |reason| ArenaError::InvalidAttributes {
            speed,
            damage,
            protection,
            reason,
        };

        let total = speed
            .checked_add(damage)
            .and_then(|t| t.checked_add(protection))
            .ok_or_else(|| invalid("attribute total overflows"))?;

        if total != TOTAL_ATTRIBUTE_POINTS {
            return Err(invalid("speed + damage + protection must equal 50"));
        }

        if speed < MIN_ATTRIBUTE || damage < MIN_ATTRIBUTE || protection < MIN_ATTRIBUTE {
            return Err(invalid("speed, damage and protection must be at least 5"));
        }

        Ok(Self {
            speed,
            damage,
            protection,
        })
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    pub fn damage(&self) -> u32 {
        self.damage
    }

    pub fn protection(&self) -> u32 {
        self.protection
    }

    pub fn get(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Speed => self.speed,
            Attribute::Damage => self.damage,
            Attribute::Protection => self.protection,
        }
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            speed: u32,
            damage: u32,
            protection: u32,
        }

        let raw = Raw::deserialize(deserializer)?;
        Attributes::new(raw.speed, raw.damage, raw.protection).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_attributes() {
        let attrs = Attributes::new(10, 20, 20).unwrap();
        assert_eq!(attrs.speed(), 10);
        assert_eq!(attrs.get(Attribute::Damage), 20);
        assert_eq!(attrs.get(Attribute::Protection), 20);
    }

    #[test]
    fn test_wrong_total_rejected() {
        let err = Attributes::new(10, 10, 10).unwrap_err();
        assert!(matches!(err, ArenaError::InvalidAttributes { .. }));
    }

    #[test]
    fn test_below_floor_rejected() {
        assert!(Attributes::new(4, 41, 5).is_err());
        assert!(Attributes::new(5, 45, 0).is_err());
        assert!(Attributes::new(5, 40, 5).is_ok());
    }

    #[test]
    fn test_overflow_rejected() {
        assert!(Attributes::new(u32::MAX, 1, 49).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Attributes =
            serde_json::from_str(r#"{"speed":5,"damage":40,"protection":5}"#).unwrap();
        assert_eq!(ok.damage(), 40);

        let bad: std::result::Result<Attributes, _> =
            serde_json::from_str(r#"{"speed":5,"damage":5,"protection":5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_max_attribute_constant() {
        assert_eq!(MAX_ATTRIBUTE, 35);
    }
}
