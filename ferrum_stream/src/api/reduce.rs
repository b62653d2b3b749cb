use crate::api::record::{Parsable, Renderable};
use crate::core::context::Context;

/// Reducer transforms one key and the values grouped under it into zero or
/// more emitted records.
///
/// `reduce` is called once per contiguous run of equal keys. The same
/// failure contract as [`Mapper`](crate::api::map::Mapper) applies.
pub trait Reducer {
    type KeyIn: Parsable + PartialEq;
    type ValueIn: Parsable;
    type KeyOut: Renderable;
    type ValueOut: Renderable;

    fn reduce(
        &mut self,
        key: Self::KeyIn,
        values: Values<Self::ValueIn>,
        ctx: &mut Context<'_, Self::KeyOut, Self::ValueOut>,
    );
}

/// Consume-once sequence of the values grouped under one key.
///
/// Backed by a fully materialized list: a whole group has to fit in memory.
#[derive(Debug)]
pub struct Values<V> {
    inner: std::vec::IntoIter<V>,
}

impl<V> Values<V> {
    pub fn new(values: Vec<V>) -> Self {
        Values {
            inner: values.into_iter(),
        }
    }
}

impl<V> Iterator for Values<V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<V> {}

impl<V> From<Vec<V>> for Values<V> {
    fn from(values: Vec<V>) -> Self {
        Values::new(values)
    }
}
