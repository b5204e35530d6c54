//! Task scheduling: the shared priority queue workers pull from.

pub mod queue;

pub(crate) use queue::TaskQueue;
