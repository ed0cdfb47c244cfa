//! Pointer event value types.
//!
//! An [`EventRecord`] is what travels through the ring buffer: a screen
//! position plus an [`EventKind`].  Records are `Copy` and are moved into and
//! out of the buffer by value, so no reference to a buffer slot ever escapes
//! a drain cycle.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The five pointer event kinds the relay forwards.
///
/// Anything else the OS hook reports (wheel, middle button, X buttons) is
/// filtered out before it reaches the buffer.
///
/// The serde representation matches [`EventKind::name`], so a serialized
/// `EventKind::LeftDown` is the JSON string `"left-down"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Left button pressed.
    LeftDown,
    /// Left button released.
    LeftUp,
    /// Right button pressed.
    RightDown,
    /// Right button released.
    RightUp,
    /// Cursor moved.
    Move,
}

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; 5] = [
        EventKind::LeftDown,
        EventKind::LeftUp,
        EventKind::RightDown,
        EventKind::RightUp,
        EventKind::Move,
    ];

    /// Returns the stable semantic name delivered to the host sink.
    ///
    /// These strings are part of the public host contract and must never change.
    pub const fn name(self) -> &'static str {
        match self {
            EventKind::LeftDown => "left-down",
            EventKind::LeftUp => "left-up",
            EventKind::RightDown => "right-down",
            EventKind::RightUp => "right-up",
            EventKind::Move => "move",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single pointer event captured by the OS hook.
///
/// Coordinates are passed through untouched; the relay performs no
/// coordinate transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Horizontal screen coordinate.
    pub x: i32,
    /// Vertical screen coordinate.
    pub y: i32,
    /// What happened at `(x, y)`.
    pub kind: EventKind,
}

impl EventRecord {
    /// Creates a new record.
    pub const fn new(x: i32, y: i32, kind: EventKind) -> Self {
        Self { x, y, kind }
    }

    /// Shorthand for `self.kind.name()`.
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_names_are_stable() {
        assert_eq!(EventKind::LeftDown.name(), "left-down");
        assert_eq!(EventKind::LeftUp.name(), "left-up");
        assert_eq!(EventKind::RightDown.name(), "right-down");
        assert_eq!(EventKind::RightUp.name(), "right-up");
        assert_eq!(EventKind::Move.name(), "move");
    }

    #[test]
    fn test_event_kind_names_are_unique() {
        // Arrange
        let mut names: Vec<&str> = EventKind::ALL.iter().map(|k| k.name()).collect();

        // Act
        names.sort_unstable();
        names.dedup();

        // Assert
        assert_eq!(names.len(), EventKind::ALL.len());
    }

    #[test]
    fn test_serialized_kind_matches_semantic_name() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).expect("serialize");
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn test_display_matches_semantic_name() {
        assert_eq!(EventKind::RightDown.to_string(), "right-down");
    }

    #[test]
    fn test_serde_representation_matches_semantic_name() {
        // Arrange
        let record = EventRecord::new(10, 20, EventKind::LeftDown);

        // Act
        let json = serde_json::to_string(&record).expect("serialize");

        // Assert
        assert_eq!(json, r#"{"x":10,"y":20,"kind":"left-down"}"#);
    }

    #[test]
    fn test_event_record_is_copied_by_value() {
        // Arrange
        let original = EventRecord::new(-5, 7, EventKind::Move);

        // Act
        let mut copy = original;
        copy.x = 99;

        // Assert – the original is unaffected
        assert_eq!(original.x, -5);
        assert_eq!(copy.name(), "move");
    }
}
