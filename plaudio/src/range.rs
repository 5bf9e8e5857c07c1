//! Playlist index ranges.

use crate::error::RangeError;
use std::ops::RangeInclusive;

/// Range as requested by the user, before the playlist length is known.
///
/// `None` means "from the first entry" / "through the last entry".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeRequest {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl RangeRequest {
    /// Validate the parts that do not depend on the playlist length.
    pub fn new(start: Option<usize>, end: Option<usize>) -> Result<Self, RangeError> {
        match (start, end) {
            (Some(0), _) => Err(RangeError::StartBelowOne(0)),
            (Some(start), Some(end)) if start > end => Err(RangeError::StartAfterEnd { start, end }),
            (None, Some(0)) => Err(RangeError::StartAfterEnd { start: 1, end: 0 }),
            _ => Ok(Self { start, end }),
        }
    }

    /// Everything.
    pub fn all() -> Self {
        Self::default()
    }
}

/// Resolved 1-based inclusive range. Invariant: `1 <= start <= end <= total`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DownloadRange {
    start: usize,
    end: usize,
}

impl DownloadRange {
    /// Resolve a request against the playlist length.
    ///
    /// An end past the last entry is clamped; a start past it is an error.
    pub fn resolve(request: RangeRequest, total: usize) -> Result<Self, RangeError> {
        let RangeRequest { start, end } = RangeRequest::new(request.start, request.end)?;

        if total == 0 {
            return Err(RangeError::EmptyPlaylist);
        }

        let start = start.unwrap_or(1);
        let end = end.map_or(total, |end| end.min(total));

        if start > total {
            return Err(RangeError::StartBeyondTotal { start, total });
        }

        if start > end {
            return Err(RangeError::StartAfterEnd { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of entries in range.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices().contains(&index)
    }

    pub fn indices(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }
}
