use std::fmt::{Display, Formatter};

/// Where an event starts in its source.
///
/// Lines and columns count from 1; the offset is in bytes. Events that
/// weren't read from text carry [`Location::default`], which is `1:1` at
/// offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    /// Line, starting at 1.
    pub line: u32,
    /// Column in characters, starting at 1.
    pub column: u32,
    /// Byte offset, starting at 0.
    pub offset: usize,
}

impl Location {
    /// Create a location.
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Location {
            line,
            column,
            offset,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::new(1, 1, 0)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Turns byte offsets into line and column positions.
///
/// Offsets must be requested in ascending order, which is how a reader moves
/// through its input; that keeps the scan linear over the whole document.
#[derive(Debug, Clone)]
pub(crate) struct LocationTracker<'a> {
    text: &'a str,
    last: Location,
}

impl<'a> LocationTracker<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        LocationTracker {
            text,
            last: Location::default(),
        }
    }

    pub(crate) fn locate(&mut self, offset: usize) -> Location {
        if offset < self.last.offset {
            self.last = Location::default();
        }
        let mut location = self.last;
        for c in self.text[location.offset..offset].chars() {
            if c == '\n' {
                location.line += 1;
                location.column = 1;
            } else {
                location.column += 1;
            }
        }
        location.offset = offset;
        self.last = location;
        location
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate() {
        let mut tracker = LocationTracker::new("<a>\n  <b/>\n</a>");
        assert_eq!(tracker.locate(0), Location::new(1, 1, 0));
        assert_eq!(tracker.locate(6), Location::new(2, 3, 6));
        assert_eq!(tracker.locate(11), Location::new(3, 1, 11));
        // going back rescans from the start
        assert_eq!(tracker.locate(3), Location::new(1, 4, 3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Location::new(3, 7, 40).to_string(), "3:7");
    }
}
