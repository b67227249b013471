use core::fmt;

/// A record that carries a totally-ordered timestamp.
///
/// The merge algorithms in this crate order their output by the key
/// returned from [`timestamp`][Timestamped::timestamp]. The rest of the
/// record is opaque to the merge; sources are trusted to produce their
/// entries in non-decreasing timestamp order.
///
/// Implementations are provided for all primitive integers (the value is
/// its own timestamp) and for `(K, V)` pairs keyed on the first element.
pub trait Timestamped {
    /// The ordering key.
    type Timestamp: Ord;

    /// Returns this record's timestamp.
    fn timestamp(&self) -> Self::Timestamp;
}

macro_rules! impl_timestamped_for_int {
    ($($t:ty)*) => ($(
        impl Timestamped for $t {
            type Timestamp = $t;

            fn timestamp(&self) -> Self::Timestamp {
                *self
            }
        }
    )*)
}

impl_timestamped_for_int! { u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize }

impl<K, V> Timestamped for (K, V)
where
    K: Ord + Clone,
{
    type Timestamp = K;

    fn timestamp(&self) -> Self::Timestamp {
        self.0.clone()
    }
}

/// A timestamped record with an opaque payload.
///
/// A minimal concrete [`Timestamped`] implementation for callers that
/// don't have their own record type.
///
/// # Examples
///
/// ```
/// use sorted_merge::{Entry, Timestamped};
///
/// let entry = Entry::new(12u64, "server started");
/// assert_eq!(entry.timestamp(), 12);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// When the record was produced.
    pub timestamp: K,
    /// The record itself; never inspected by the merge.
    pub payload: V,
}

impl<K, V> Entry<K, V> {
    /// Create a new entry from a timestamp and a payload.
    pub fn new(timestamp: K, payload: V) -> Self {
        Self { timestamp, payload }
    }
}

impl<K, V> Timestamped for Entry<K, V>
where
    K: Ord + Clone,
{
    type Timestamp = K;

    fn timestamp(&self) -> Self::Timestamp {
        self.timestamp.clone()
    }
}

impl<K, V> fmt::Display for Entry<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.timestamp, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_are_keyed_on_the_first_element() {
        let entry = (3u64, "c");
        assert_eq!(entry.timestamp(), 3);
    }

    #[test]
    fn display() {
        let entry = Entry::new(7u32, "hello");
        assert_eq!(entry.to_string(), "7: hello");
    }
}
