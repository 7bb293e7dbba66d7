//! External transcoder integration and its in-process fallbacks.

pub mod executor;
pub mod ffmpeg;
pub mod gif;

pub use executor::{CommandExecutor, MockCommandExecutor, SystemCommandExecutor};
pub use ffmpeg::Transcoder;
