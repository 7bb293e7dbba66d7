//! Prompt chains: parsing, output naming and orchestration.

pub mod layout;
pub mod orchestrator;
pub mod prompts;

pub use layout::{OutputLayout, RunStamp};
pub use orchestrator::{
    ArtifactSummary, AudioChainOptions, AudioOptions, NarrationOptions, StitchResult,
    StitchedMedia, Studio, VideoChainOptions, VideoSummary,
};
pub use prompts::split_prompts;
