/// Next DA height to scan.
///
/// Only ever moves forward. Owned by a single sequencer, which persists it
/// through the index before advancing it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct HeightCursor {
    next: u64,
}

impl HeightCursor {
    pub fn new(next: u64) -> Self {
        Self { next }
    }

    /// Resumes from a persisted cursor, or from `start_height` on a fresh
    /// index.
    pub fn restore(stored: Option<u64>, start_height: u64) -> Self {
        Self::new(stored.unwrap_or(start_height))
    }

    pub fn next(&self) -> u64 {
        self.next
    }

    /// Moves past `height`. Heights at or behind the cursor's past are ignored.
    pub(crate) fn advance_past(&mut self, height: u64) {
        self.next = self.next.max(height + 1);
    }
}
