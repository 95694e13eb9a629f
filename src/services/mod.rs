//! External collaborators of the timer
//!
//! Session storage and snapshot persistence, sound playback, and the remote
//! announce service.

pub mod announce;
pub mod audio;
pub mod persistence;
pub mod storage;

// Re-export main types
pub use announce::*;
pub use audio::*;
pub use persistence::*;
pub use storage::*;
