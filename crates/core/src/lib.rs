//! Aggregate-execution substrate.
//!
//! Every device repeatedly evaluates the same [`AggregateProgram`] against
//! its own remembered state and the latest exports of its neighbors.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Device                            │
//! │   memory (CallPath → value)   rng   latest exports       │
//! └───────────────┬──────────────────────────────▲───────────┘
//!                 │ run_round(program, inbox)    │ commit
//!                 ▼                              │
//! ┌──────────────────────────────────────────────┴───────────┐
//! │                     RoundContext                         │
//! │   enter / exit / aligned / branch   → CallPath           │
//! │   remember / update                 → next memory        │
//! │   neighbors                         → exports + Field<T> │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Alignment is explicit: every call site is keyed by its [`CallPath`], and
//! a neighbor's value is visible only at the exact path that produced it.

mod call_path;
mod context;
mod device;
mod error;
mod exports;
mod field;
mod memory;
mod traits;

pub use call_path::{CallPath, Segment};
pub use context::RoundContext;
pub use device::Device;
pub use error::{AlignmentError, RoundError};
pub use exports::{Exports, Inbox, Neighbor};
pub use field::{min_with_default, Field};
pub use memory::{Memory, StateCell};
pub use traits::{program_fn, AggregateProgram};
