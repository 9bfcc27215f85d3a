//! RSS/Atom handling: tolerant parsing into raw entries, then extraction into items.

pub mod extract;
pub mod parser;
