#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cascade resolution and game sessions.
//!
//! [`resolve_cascade`] settles a board after a swap: it repeatedly matches,
//! spawns and fires special tokens, applies gravity and refills until no
//! run remains, recording each round as a batch. [`GameSession`] wraps a
//! level attempt around it, validating moves, spending the move budget and
//! tracking score, collected gems and the terminal outcome.

mod resolver;
mod session;

pub use resolver::{resolve_cascade, MAX_CASCADE_BATCHES};
pub use session::{GameSession, MoveResolution, SessionSnapshot};
