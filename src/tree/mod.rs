//! UI Tree
//!
//! The recursive value model for UI state, the dotted path grammar that
//! addresses locations inside it, and the resolver that turns a path into a
//! readable/writable reference.

pub mod hasher;
pub mod path;
pub mod resolver;
pub mod value;

pub use path::{Path, Segment};
pub use resolver::{resolve, resolve_mut, Access, Reference, Slot};
pub use value::{Scalar, TreeMap, TreeValue};
