//! Resume filter
//!
//! Skips every record up to and including the one whose key matches the
//! checkpoint, so a restarted run continues right after the last committed
//! document.

use placeload_common::Result;

use crate::source::RawRecord;

/// Suppresses records already committed by a previous run
#[derive(Debug, Clone)]
pub struct ResumeFilter {
    last_key: Option<String>,
    resuming: bool,
    suppressed: u64,
}

impl ResumeFilter {
    /// `last_key` of `None` (or a blank string) admits every record
    pub fn new(last_key: Option<String>) -> Self {
        let last_key = last_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            resuming: last_key.is_none(),
            last_key,
            suppressed: 0,
        }
    }

    /// Decide whether the record with natural key `key` should be processed
    pub fn admit(&mut self, key: &str) -> bool {
        if self.resuming {
            return true;
        }

        if self.last_key.as_deref() == Some(key) {
            self.resuming = true;
        }
        self.suppressed += 1;
        false
    }

    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Records skipped so far (including the checkpoint record itself)
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    /// True once the checkpoint record has been seen, or when there was none
    pub fn is_resuming(&self) -> bool {
        self.resuming
    }

    /// At end of input: a checkpoint was given but never matched
    pub fn is_stale(&self) -> bool {
        !self.resuming
    }

    /// Wrap a record stream; errors pass through untouched
    pub fn apply<I>(self, records: I) -> Resumed<I>
    where
        I: Iterator<Item = Result<RawRecord>>,
    {
        Resumed {
            inner: records,
            filter: self,
        }
    }
}

/// Iterator adapter returned by [`ResumeFilter::apply`]
pub struct Resumed<I> {
    inner: I,
    filter: ResumeFilter,
}

impl<I> Resumed<I> {
    pub fn resume_state(&self) -> &ResumeFilter {
        &self.filter
    }
}

impl<I> Iterator for Resumed<I>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(record) if !self.filter.admit(record.key()) => continue,
                item => return Some(item),
            }
        }
    }
}
