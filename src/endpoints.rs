//! The two most recent point selections.

use crate::geo::GeoPoint;
use std::collections::VecDeque;

const CAPACITY: usize = 2;

/// Odd selections are drawn red, even ones blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerColor {
    Red,
    Blue,
}

impl MarkerColor {
    pub fn for_ordinal(ordinal: u64) -> Self {
        if ordinal % 2 == 1 {
            MarkerColor::Red
        } else {
            MarkerColor::Blue
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            MarkerColor::Red => "#ff3b30",
            MarkerColor::Blue => "#007aff",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    pub point: GeoPoint,
    /// 1-based count of selections made so far, including this one.
    pub ordinal: u64,
    pub color: MarkerColor,
}

/// FIFO of at most two selections; a third evicts the oldest.
#[derive(Debug, Default, Clone)]
pub struct RouteEndpoints {
    selections: VecDeque<Selection>,
    count: u64,
}

impl RouteEndpoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a selection and returns the one it evicted, if any.
    pub fn select(&mut self, point: GeoPoint) -> Option<Selection> {
        let evicted = if self.selections.len() >= CAPACITY {
            self.selections.pop_front()
        } else {
            None
        };

        self.count += 1;
        self.selections.push_back(Selection {
            point,
            ordinal: self.count,
            color: MarkerColor::for_ordinal(self.count),
        });
        evicted
    }

    /// Both endpoints, oldest first, once two are live.
    pub fn pair(&self) -> Option<(GeoPoint, GeoPoint)> {
        match (self.selections.front(), self.selections.get(1)) {
            (Some(a), Some(b)) => Some((a.point, b.point)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn total_selections(&self) -> u64 {
        self.count
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selection> {
        self.selections.iter()
    }

    /// Drops live selections. The running count is kept so colours keep alternating.
    pub fn clear(&mut self) {
        self.selections.clear();
    }
}
