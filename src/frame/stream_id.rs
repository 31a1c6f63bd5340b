//! Per-connection allocation of requester stream ids.

/// Largest stream id; ids are positive 31-bit integers.
pub const MAX_STREAM_ID: u32 = 0x7FFF_FFFF;

/// Odd stream ids for requester-initiated streams: 1, 3, 5, ...
///
/// After [`MAX_STREAM_ID`] the sequence wraps back to 1. The sequence is
/// owned by whoever writes requests on the connection and is never shared.
///
/// # Examples
///
/// ```
/// use flowprobe::frame::StreamIdSequence;
///
/// let ids: Vec<u32> = StreamIdSequence::new().take(3).collect();
/// assert_eq!(ids, [1, 3, 5]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamIdSequence {
    next: u32,
}

impl StreamIdSequence {
    /// Sequence starting at 1.
    #[must_use]
    pub const fn new() -> Self { Self { next: 1 } }

    /// Sequence whose next id is `first`.
    ///
    /// # Panics
    ///
    /// Panics if `first` is even or greater than [`MAX_STREAM_ID`].
    #[must_use]
    pub const fn starting_at(first: u32) -> Self {
        assert!(
            first % 2 == 1 && first <= MAX_STREAM_ID,
            "requester stream ids are odd 31-bit integers"
        );
        Self { next: first }
    }

    /// Allocate the next stream id.
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = match id.checked_add(2) {
            Some(next) if next <= MAX_STREAM_ID => next,
            _ => 1,
        };
        id
    }
}

impl Default for StreamIdSequence {
    fn default() -> Self { Self::new() }
}

impl Iterator for StreamIdSequence {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> { Some(self.next_id()) }
}
