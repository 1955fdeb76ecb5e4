//! Cursor-based key enumeration
//!
//! A store scan starts at cursor 0 and is finished when the store hands
//! cursor 0 back. [`ScanState`] keeps those two meanings apart so a finished
//! scan can never be mistaken for a fresh one.

mod enumerator;

pub use enumerator::{KeyEnumerator, ScanState};
