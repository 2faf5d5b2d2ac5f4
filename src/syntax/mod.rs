//! Source-level building blocks shared by every later stage: positions,
//! interned names and literal checks.

pub mod entry;
pub mod interner;
pub mod literal;
pub mod position;
pub mod shared_interner;
pub mod symbol;

pub use interner::Interner;
pub use position::{FileId, Location, Position, PositionTracker};
pub use shared_interner::SharedInterner;
pub use symbol::Name;
