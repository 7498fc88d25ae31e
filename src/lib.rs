//! An unbounded multi-producer, multi-consumer queue with blocking,
//! non-blocking and bounded-wait consumption, and a one-way close.
#![deny(missing_docs)]
#![deny(unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod sync;
