//! Widget position configuration and per-axis anchoring

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Which screen edge an axis is measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Offset counts from the left/top edge
    Near,
    /// Offset counts back from the right/bottom edge
    Far,
}

impl Anchor {
    fn from_offset(offset: i32) -> Self {
        if offset < 0 {
            Anchor::Far
        } else {
            Anchor::Near
        }
    }

    /// Resolve one axis of the top-left corner
    fn resolve(self, offset: i32, screen: u32, size: u32) -> i32 {
        match self {
            Anchor::Near => offset,
            Anchor::Far => {
                let pos = screen as i64 - (offset as i64).abs() - size as i64;
                pos.clamp(i32::MIN as i64, i32::MAX as i64) as i32
            }
        }
    }
}

/// Configured offset of the clock on the screen
///
/// The sign of each component picks the anchor for that axis once, when the
/// placement is built: `20,-20` keeps the text 20 pixels from the left edge
/// and 20 pixels above the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    x: i32,
    y: i32,
    anchor_x: Anchor,
    anchor_y: Anchor,
}

impl Placement {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            anchor_x: Anchor::from_offset(x),
            anchor_y: Anchor::from_offset(y),
        }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn anchor_x(&self) -> Anchor {
        self.anchor_x
    }

    pub fn anchor_y(&self) -> Anchor {
        self.anchor_y
    }

    /// Top-left corner for a box of `size` on a screen of `screen` pixels
    ///
    /// # Examples
    ///
    /// ```
    /// use overlay_clock::Placement;
    ///
    /// let placement = Placement::new(20, -20);
    /// assert_eq!(placement.origin((1920, 1080), (100, 14)), (20, 1046));
    /// ```
    pub fn origin(&self, screen: (u32, u32), size: (u32, u32)) -> (i32, i32) {
        (
            self.anchor_x.resolve(self.x, screen.0, size.0),
            self.anchor_y.resolve(self.y, screen.1, size.1),
        )
    }
}

impl FromStr for Placement {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            ConfigError::InvalidValue(format!(
                "Invalid position '{}', expected X,Y (for example 20,-20)",
                s
            ))
        };

        let (x, y) = s.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
        let y = y.trim().parse::<i32>().map_err(|_| invalid())?;

        Ok(Placement::new(x, y))
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::new(20, 20)
    }
}

// Serialize as "X,Y" string
impl Serialize for Placement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

// Deserialize from "X,Y" string
impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Placement::from_str(&s).map_err(serde::de::Error::custom)
    }
}
