//! Filename Guess Engine — line-oriented IPC shim over a filename guesser.
//!
//! Reads `{id?, path | filename}` JSON lines, asks a [`Guesser`] for media
//! metadata, normalizes the episode fields and writes `{id, result}` or
//! `{id, error}` JSON lines back. Used by the binary for stdin/stdout; the
//! adapter can also be driven with any reader/writer pair.

pub mod config;
pub mod error;
pub mod guesser;
pub mod normalize;
pub mod protocol;
pub mod types;

pub use config::{Backend, Config};
pub use error::{EngineError, GuessError};
pub use guesser::{CommandGuesser, Guesser, HeuristicGuesser};
pub use protocol::{Adapter, RunStats};
pub use types::{GuessOptions, GuessResult, InboundRequest, Response};
