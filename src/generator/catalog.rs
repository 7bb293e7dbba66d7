//! Generator model metadata: quality tiers, voices and audio categories.
//!
//! The model ids name the upstream checkpoints a generator backend is expected
//! to serve. The built-in synth backend ignores them; the command backend
//! passes them to the external program as `{model}`.

use crate::error::{Result, StudioError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality tier of the music model. Larger tiers are slower and better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ModelQuality {
    #[default]
    Small,
    Medium,
    Large,
}

impl ModelQuality {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelQuality::Small => "small",
            ModelQuality::Medium => "medium",
            ModelQuality::Large => "large",
        }
    }

    /// Upstream music model id for this tier.
    pub fn audio_model_id(self) -> &'static str {
        match self {
            ModelQuality::Small => "facebook/musicgen-small",
            ModelQuality::Medium => "facebook/musicgen-medium",
            ModelQuality::Large => "facebook/musicgen-large",
        }
    }
}

impl fmt::Display for ModelQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelQuality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(ModelQuality::Small),
            "medium" => Ok(ModelQuality::Medium),
            "large" => Ok(ModelQuality::Large),
            other => Err(format!(
                "unknown model quality '{other}' (expected small, medium, large)"
            )),
        }
    }
}

/// Text-to-video model id.
pub const VIDEO_MODEL_ID: &str = "THUDM/CogVideoX-2b";

/// Text-to-speech model id.
pub const VOICE_MODEL_ID: &str = "parler-tts/parler-tts-mini-v1.1";

/// A named speaker description for the voice model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoicePreset {
    pub name: &'static str,
    pub description: &'static str,
}

/// Voice presets: plain-English speaker descriptions.
pub const VOICE_PRESETS: &[VoicePreset] = &[
    VoicePreset {
        name: "Female (Professional)",
        description: "A female speaker with a warm, professional voice delivers a clear narration at a moderate pace in a studio-quality recording.",
    },
    VoicePreset {
        name: "Female (Soft)",
        description: "A young woman speaks softly and gently, with a calm and soothing voice, in a quiet studio recording.",
    },
    VoicePreset {
        name: "Female (Energetic)",
        description: "A female speaker with an upbeat, energetic voice delivers an enthusiastic announcement with clear articulation.",
    },
    VoicePreset {
        name: "Male (Deep Narrator)",
        description: "A male speaker with a deep, resonant voice delivers a dramatic narration, speaking slowly and deliberately.",
    },
    VoicePreset {
        name: "Male (Conversational)",
        description: "A young man speaks casually and naturally, with a friendly conversational tone, in a close-mic studio recording.",
    },
    VoicePreset {
        name: "Male (Authoritative)",
        description: "A middle-aged man with a commanding, authoritative voice speaks clearly and confidently in a professional recording.",
    },
    VoicePreset {
        name: "Child (Bright)",
        description: "A child speaks with a bright, cheerful voice, pronouncing words clearly in a studio recording.",
    },
    VoicePreset {
        name: "Voiceover (Cinematic)",
        description: "A voice actor delivers a cinematic voiceover with dramatic pauses and emotional depth, in a high-quality studio recording.",
    },
    VoicePreset {
        name: "Voiceover (Commercial)",
        description: "A friendly, approachable voice delivers an advertising script with enthusiasm and clear diction in a professional studio.",
    },
    VoicePreset {
        name: "Game Character (Hero)",
        description: "A confident male voice actor delivers heroic game dialogue with bold expression and clear enunciation.",
    },
];

/// Name of the voice used when none is requested.
pub const DEFAULT_VOICE: &str = "Female (Professional)";

/// Find a voice by name (case-insensitive).
pub fn get_voice(name: &str) -> Option<&'static VoicePreset> {
    let name = name.trim();
    VOICE_PRESETS
        .iter()
        .find(|v| v.name.eq_ignore_ascii_case(name))
}

/// Find a voice by name or fail with `UnknownVoice`.
pub fn require_voice(name: &str) -> Result<&'static VoicePreset> {
    get_voice(name).ok_or_else(|| StudioError::UnknownVoice {
        name: name.to_string(),
    })
}

/// Get all voice presets.
pub fn list_voices() -> &'static [VoicePreset] {
    VOICE_PRESETS
}

/// The default narration voice.
pub fn default_voice() -> &'static VoicePreset {
    &VOICE_PRESETS[0]
}

/// Kind of single-shot audio, which bounds its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum AudioCategory {
    /// Background music.
    #[default]
    Bgm,
    /// Short sound effect.
    Sfx,
    /// Environmental soundscape.
    Ambient,
}

impl AudioCategory {
    /// Directory name under `audio/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            AudioCategory::Bgm => "bgm",
            AudioCategory::Sfx => "sfx",
            AudioCategory::Ambient => "ambient",
        }
    }

    /// Allowed duration range in whole seconds, inclusive.
    pub fn duration_range(self) -> (u32, u32) {
        match self {
            AudioCategory::Bgm => (10, 30),
            AudioCategory::Sfx => (1, 8),
            AudioCategory::Ambient => (10, 30),
        }
    }

    pub fn default_duration(self) -> u32 {
        match self {
            AudioCategory::Bgm => 15,
            AudioCategory::Sfx => 3,
            AudioCategory::Ambient => 20,
        }
    }

    /// Example prompt shown to users.
    pub fn placeholder(self) -> &'static str {
        match self {
            AudioCategory::Bgm => "epic orchestral trailer music with drums and brass",
            AudioCategory::Sfx => "explosion sound effect, cinematic boom",
            AudioCategory::Ambient => "rain on a tin roof, gentle thunder in the distance",
        }
    }

    /// Clamp `secs` into this category's range, warning when it moves.
    pub fn clamp_duration(self, secs: f32) -> f32 {
        let (min, max) = self.duration_range();
        let clamped = secs.clamp(min as f32, max as f32);
        if clamped != secs {
            tracing::warn!(
                "{} duration {}s outside {}-{}s, using {}s",
                self,
                secs,
                min,
                max,
                clamped
            );
        }
        clamped
    }
}

impl fmt::Display for AudioCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AudioCategory::Bgm => "BGM",
            AudioCategory::Sfx => "SFX",
            AudioCategory::Ambient => "Ambient",
        })
    }
}
