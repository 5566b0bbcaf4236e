//! Prefix capture over single-pass sequences.
//!
//! [`PrefixCapture`] draws the first `n` elements of a source up front so a
//! caller can answer immediately with them, then hands the very same elements
//! back again, followed by the untouched rest of the source, to whoever
//! consumes it as an iterator. The source is pulled exactly once per element.

use std::iter::FusedIterator;
use std::slice;

/// Where the replay sequence currently reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Replaying { next: usize },
    Draining,
}

/// Bounded prefix buffer plus a replay of the whole source.
///
/// Construction blocks on at most `n` productions of the source. Iterating
/// the capture yields the buffered prefix and then the remainder, in source
/// order, without ever asking the source for an element twice.
#[derive(Debug)]
pub struct PrefixCapture<I: Iterator> {
    buffer: Vec<I::Item>,
    remainder: I,
    phase: Phase,
}

impl<I> PrefixCapture<I>
where
    I: Iterator,
{
    /// Eagerly draw up to `n` elements from `source`.
    pub fn new<S>(source: S, n: usize) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        let mut remainder = source.into_iter();
        let mut buffer = Vec::with_capacity(n.min(remainder.size_hint().0));
        while buffer.len() < n {
            match remainder.next() {
                Some(item) => buffer.push(item),
                None => break,
            }
        }

        Self { buffer, remainder, phase: Phase::Replaying { next: 0 } }
    }

    /// Restartable view over the captured prefix.
    ///
    /// Independent of how far the replay sequence has been consumed.
    pub fn first_items(&self) -> slice::Iter<'_, I::Item> {
        self.buffer.iter()
    }

    /// Number of elements captured, `min(n, source length)`.
    pub fn captured(&self) -> usize {
        self.buffer.len()
    }
}

impl<I> PrefixCapture<I>
where
    I: Iterator,
    I::Item: Clone,
{
    /// Split a source into its first `n` elements and the full replay sequence.
    pub fn wrap<S>(source: S, n: usize) -> (Vec<I::Item>, Self)
    where
        S: IntoIterator<IntoIter = I>,
    {
        let capture = Self::new(source, n);
        (capture.buffer.clone(), capture)
    }
}

impl<I> Iterator for PrefixCapture<I>
where
    I: Iterator,
    I::Item: Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if let Phase::Replaying { next } = self.phase {
            if let Some(item) = self.buffer.get(next) {
                self.phase = Phase::Replaying { next: next + 1 };
                return Some(item.clone());
            }
            self.phase = Phase::Draining;
        }
        self.remainder.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let buffered = match self.phase {
            Phase::Replaying { next } => self.buffer.len() - next,
            Phase::Draining => 0,
        };
        let (lo, hi) = self.remainder.size_hint();
        (lo.saturating_add(buffered), hi.and_then(|hi| hi.checked_add(buffered)))
    }
}

impl<I> FusedIterator for PrefixCapture<I>
where
    I: FusedIterator,
    I::Item: Clone,
{
}
