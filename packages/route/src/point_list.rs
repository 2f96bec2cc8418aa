//! The ordered, editable itinerary of the professional planner.
//!
//! Roles are purely positional: the first entry is the origin, the last
//! the destination, everything in between a stop. One entry at a time is
//! "active" and is the target of move, edit and delete.

use route_planner_geocoder::address;
use route_planner_route_models::{MIN_ADDRESS_LEN, RouteEntry};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Entries needed before a route can be generated.
pub const MIN_ROUTE_POINTS: usize = 2;

/// Direction for [`RoutePointList::move_active`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// Towards the origin.
    Up,
    /// Towards the destination.
    Down,
}

/// Positional role of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PointRole {
    /// First entry.
    Origin,
    /// Interior entry.
    Stop,
    /// Last entry.
    Destination,
}

/// A rejected point list operation. The list is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointListError {
    /// The address was blank.
    #[error("Address is empty")]
    Empty,

    /// The address was shorter than [`MIN_ADDRESS_LEN`].
    #[error("Address must have at least {min} characters (got {len})")]
    TooShort {
        /// Length of the rejected address.
        len: usize,
        /// Required minimum.
        min: usize,
    },

    /// The list is empty, so there is nothing to edit.
    #[error("No point is selected")]
    NoActivePoint,
}

/// Ordered route entries plus the active index.
///
/// Invariant: `active` is `None` exactly when the list is empty, and is
/// otherwise within `0..len`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePointList {
    entries: Vec<RouteEntry>,
    active_index: Option<usize>,
}

impl RoutePointList {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            active_index: None,
        }
    }

    /// Number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when there are no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in travel order.
    #[must_use]
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Index of the active entry.
    #[must_use]
    pub const fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// The active entry.
    #[must_use]
    pub fn active(&self) -> Option<&RouteEntry> {
        self.entries.get(self.active_index?)
    }

    /// First entry.
    #[must_use]
    pub fn origin(&self) -> Option<&RouteEntry> {
        self.entries.first()
    }

    /// Last entry, once there are at least two.
    #[must_use]
    pub fn destination(&self) -> Option<&RouteEntry> {
        if self.entries.len() < MIN_ROUTE_POINTS {
            return None;
        }
        self.entries.last()
    }

    /// Interior entries.
    #[must_use]
    pub fn stops(&self) -> &[RouteEntry] {
        match self.entries.len() {
            0..=2 => &[],
            len => &self.entries[1..len - 1],
        }
    }

    /// Role of the entry at `index`.
    #[must_use]
    pub const fn role_of(&self, index: usize) -> Option<PointRole> {
        let len = self.entries.len();
        if index >= len {
            None
        } else if index == 0 {
            Some(PointRole::Origin)
        } else if index == len - 1 {
            Some(PointRole::Destination)
        } else {
            Some(PointRole::Stop)
        }
    }

    /// Returns `true` once the list has an origin and a destination.
    #[must_use]
    pub const fn can_route(&self) -> bool {
        self.entries.len() >= MIN_ROUTE_POINTS
    }

    /// Appends free text and makes it active.
    ///
    /// # Errors
    ///
    /// Returns [`PointListError`] if the trimmed text is blank or shorter
    /// than [`MIN_ADDRESS_LEN`].
    pub fn add(&mut self, value: &str) -> Result<(), PointListError> {
        self.add_entry(RouteEntry::text(value.trim()))
    }

    /// Appends an entry (e.g. a selected suggestion) and makes it active.
    ///
    /// # Errors
    ///
    /// Returns [`PointListError`] if the entry's address is blank or
    /// shorter than [`MIN_ADDRESS_LEN`].
    pub fn add_entry(&mut self, entry: RouteEntry) -> Result<(), PointListError> {
        validate(&entry)?;
        self.entries.push(entry);
        self.active_index = Some(self.entries.len() - 1);
        self.revalidate();
        Ok(())
    }

    /// Makes the entry at `index` active, clamping into range.
    pub fn select(&mut self, index: usize) {
        self.active_index = Some(index);
        self.revalidate();
    }

    /// Swaps the active entry with its neighbour in `direction`; the
    /// active index follows the moved entry.
    ///
    /// Returns `false` (and changes nothing) at the boundary.
    pub fn move_active(&mut self, direction: Direction) -> bool {
        let Some(index) = self.active_index else {
            return false;
        };

        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < self.entries.len()),
        };

        let Some(target) = target else {
            return false;
        };

        self.entries.swap(index, target);
        self.active_index = Some(target);
        self.revalidate();
        true
    }

    /// Replaces the active entry with free text, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`PointListError`] if the text is too short or the list is
    /// empty.
    pub fn edit_active(&mut self, value: &str) -> Result<(), PointListError> {
        self.edit_active_entry(RouteEntry::text(value.trim()))
    }

    /// Replaces the active entry, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`PointListError`] if the entry is too short or the list is
    /// empty.
    pub fn edit_active_entry(&mut self, entry: RouteEntry) -> Result<(), PointListError> {
        validate(&entry)?;
        let slot = self
            .active_index
            .and_then(|i| self.entries.get_mut(i))
            .ok_or(PointListError::NoActivePoint)?;
        *slot = entry;
        self.revalidate();
        Ok(())
    }

    /// Removes the active entry and returns it; `None` when the list is
    /// empty.
    pub fn delete_active(&mut self) -> Option<RouteEntry> {
        let index = self.active_index.filter(|&i| i < self.entries.len())?;
        let removed = self.entries.remove(index);
        self.revalidate();
        Some(removed)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.active_index = None;
        self.revalidate();
    }

    /// Clamps the active index into bounds.
    fn revalidate(&mut self) {
        self.active_index = match self.entries.len() {
            0 => None,
            len => Some(self.active_index.unwrap_or(len - 1).min(len - 1)),
        };
    }
}

fn validate(entry: &RouteEntry) -> Result<(), PointListError> {
    let label = address::normalize(&entry.input).ok_or(PointListError::Empty)?;
    let len = label.chars().count();
    if len < MIN_ADDRESS_LEN {
        return Err(PointListError::TooShort {
            len,
            min: MIN_ADDRESS_LEN,
        });
    }
    Ok(())
}
