//! Two-bit collision layers
//!
//! Every tile and every entity lives on a layer. White and Black are the two
//! bits; Both is their union and Neither is empty. Two layers block each other
//! iff they share a bit.

use serde::{Deserialize, Serialize};

/// Collision layer flag set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CollisionLayer {
    #[default]
    Neither = 0,
    White = 1,
    Black = 2,
    /// White | Black
    Both = 3,
}

impl CollisionLayer {
    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(CollisionLayer::Neither),
            1 => Some(CollisionLayer::White),
            2 => Some(CollisionLayer::Black),
            3 => Some(CollisionLayer::Both),
            _ => None,
        }
    }

    /// Whether the two layers share a bit
    #[inline]
    pub fn collides(self, other: CollisionLayer) -> bool {
        self.bits() & other.bits() != 0
    }

    /// Swap White and Black; Both and Neither are unchanged
    pub fn invert(self) -> Self {
        match self {
            CollisionLayer::White => CollisionLayer::Black,
            CollisionLayer::Black => CollisionLayer::White,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionLayer::Neither => "Neither",
            CollisionLayer::White => "White",
            CollisionLayer::Black => "Black",
            CollisionLayer::Both => "Both",
        }
    }
}

impl std::fmt::Display for CollisionLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<u8> for CollisionLayer {
    type Error = String;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or_else(|| format!("invalid collision layer {bits}"))
    }
}

impl From<CollisionLayer> for u8 {
    fn from(layer: CollisionLayer) -> u8 {
        layer.bits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CollisionLayer::*;

    #[test]
    fn test_collision_table() {
        assert!(White.collides(White));
        assert!(Black.collides(Black));
        assert!(!White.collides(Black));
        assert!(Both.collides(White));
        assert!(Both.collides(Black));
        for layer in [Neither, White, Black, Both] {
            assert!(!Neither.collides(layer));
            assert!(!layer.collides(Neither));
        }
    }

    #[test]
    fn test_invert() {
        assert_eq!(White.invert(), Black);
        assert_eq!(Black.invert(), White);
        assert_eq!(Both.invert(), Both);
        assert_eq!(Neither.invert(), Neither);
    }

    #[test]
    fn test_display() {
        assert_eq!(White.to_string(), "White");
        assert_eq!(format!("{}", Both.invert()), "Both");
    }

    #[test]
    fn test_serde_as_number() {
        assert_eq!(serde_json::to_string(&Black).unwrap(), "2");
        assert_eq!(serde_json::from_str::<CollisionLayer>("3").unwrap(), Both);
        assert!(serde_json::from_str::<CollisionLayer>("4").is_err());
    }
}
