//! The output side of a merge.
//!
//! A [`Sink`] receives merged entries in their final emission order,
//! followed by exactly one end-of-stream notification. The drain
//! functions in this module connect a fully-merged sequence to a sink
//! and own the `done()` call, so a sink is only told the stream ended
//! when every entry was actually delivered.

use futures_core::Stream;
use futures_lite::StreamExt;

/// Receives merged entries in order, then an end-of-stream signal.
pub trait Sink<T> {
    /// Called exactly once per entry, in final emission order.
    fn print(&mut self, entry: T);

    /// Called exactly once, strictly after the last [`print`][Sink::print],
    /// when every source has been exhausted.
    fn done(&mut self);
}

/// Drive a merged sequence into a sink.
///
/// Calls [`Sink::print`] once per entry and [`Sink::done`] after the
/// last one.
///
/// # Examples
///
/// ```
/// use sorted_merge::prelude::*;
/// use sorted_merge::sink::{self, Sink};
///
/// struct Stdout;
///
/// impl Sink<u64> for Stdout {
///     fn print(&mut self, entry: u64) {
///         println!("{entry}");
///     }
///     fn done(&mut self) {
///         println!("(end of stream)");
///     }
/// }
///
/// let sources = vec![vec![1u64, 3], vec![2, 4]];
/// sink::drain(sources.merge_sorted(), &mut Stdout);
/// ```
pub fn drain<I, O>(entries: I, sink: &mut O)
where
    I: IntoIterator,
    O: Sink<I::Item>,
{
    for entry in entries {
        sink.print(entry);
    }
    sink.done();
}

/// Drive a merged fallible sequence into a sink.
///
/// Stops at the first error and returns it without calling
/// [`Sink::done`]; entries already emitted stay emitted.
pub fn try_drain<I, T, E, O>(entries: I, sink: &mut O) -> Result<(), E>
where
    I: IntoIterator<Item = Result<T, E>>,
    O: Sink<T>,
{
    for entry in entries {
        sink.print(entry?);
    }
    sink.done();
    Ok(())
}

/// Drive a merged stream into a sink.
///
/// The asynchronous analogue of [`drain`]: awaits each entry, calls
/// [`Sink::print`] for it, and calls [`Sink::done`] once the stream is
/// exhausted. A source that never resolves keeps this future pending
/// forever; bounding fetches is the caller's responsibility.
pub async fn drain_async<S, O>(stream: S, sink: &mut O)
where
    S: Stream,
    O: Sink<S::Item>,
{
    let mut stream = core::pin::pin!(stream);
    while let Some(entry) = stream.next().await {
        sink.print(entry);
    }
    sink.done();
}

/// Drive a merged fallible stream into a sink.
///
/// Stops at the first error and returns it without calling
/// [`Sink::done`].
pub async fn try_drain_async<S, T, E, O>(stream: S, sink: &mut O) -> Result<(), E>
where
    S: Stream<Item = Result<T, E>>,
    O: Sink<T>,
{
    let mut stream = core::pin::pin!(stream);
    while let Some(entry) = stream.next().await {
        sink.print(entry?);
    }
    sink.done();
    Ok(())
}
