//! Internal data structures shared by the merge orchestrators.

mod liveness;
mod pin;
mod queue;
mod wakers;

pub(crate) use liveness::Liveness;
pub(crate) use pin::get_pin_mut_from_vec;
pub(crate) use queue::OrderedQueue;
pub(crate) use wakers::WakerVec;
