//! Marker traits separating writes from reads
//!
//! Every command and query registered with the mediator implements exactly one
//! of these. Commands mutate the store; queries never do.

/// A request that mutates state
pub trait Command: Send + 'static {}

/// A request that only reads state
pub trait Query: Send + 'static {}

