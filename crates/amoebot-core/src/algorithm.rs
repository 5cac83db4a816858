//! Activation Contract
//!
//! Each concrete algorithm supplies exactly one behavior, `activate`, plus
//! read-only presentation hooks the engine calls between activations. The
//! engine holds algorithms behind this trait and never downcasts except in
//! the explicitly type-asserting neighbor accessor.

use crate::activation::Activation;
use crate::error::Error;
use std::any::Any;

/// Fallible downcast support for algorithm state.
///
/// Blanket-implemented for every `'static` type so concrete algorithms never
/// write the boilerplate themselves.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A per-particle distributed algorithm.
///
/// `activate` is invoked by the scheduler with exclusive access to the
/// system through the [`Activation`] view; no other particle's activation
/// interleaves with it. There is no bound on how many movement or query
/// calls one activation performs. An `Err` return is treated as an
/// unrecoverable fault and halts the scheduler.
///
/// `Send` is required so a system can move onto a dedicated engine thread;
/// activations themselves stay strictly single-threaded.
pub trait Algorithm: AsAny + Send {
    /// Executes one particle activation.
    fn activate(&mut self, view: &mut Activation<'_>) -> Result<(), Error>;

    /// Short stable name used in snapshots and fault reports.
    fn name(&self) -> &'static str;

    /// Color of the ring drawn around the head node, as 0xRRGGBB.
    fn head_color(&self) -> Option<u32> {
        None
    }

    /// Color of the ring drawn around the tail node. Not shown while the
    /// particle is contracted.
    fn tail_color(&self) -> Option<u32> {
        self.head_color()
    }

    /// Label of the port carrying the head marker, if any.
    fn head_mark_label(&self) -> Option<usize> {
        None
    }

    /// Text displayed when this particle is inspected; a dump of the
    /// algorithm-local state at the time of the call.
    fn inspection_text(&self) -> String {
        String::new()
    }
}
