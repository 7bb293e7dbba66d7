//! Output geometry presets and codec-legal dimension resolution.
//!
//! Social-media presets map to fixed frame sizes; the "Custom" preset defers
//! to caller-supplied values. Every resolved size is even because yuv420p
//! chroma subsampling rejects odd widths and heights.

use serde::Serialize;
use std::fmt;

/// Name of the preset that defers to explicit width/height.
pub const CUSTOM: &str = "Custom";

/// A concrete output frame size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Metadata for one output preset.
#[derive(Debug, Clone, PartialEq)]
pub struct PresetInfo {
    /// Display name, also the canonical lookup key.
    pub name: &'static str,
    /// Fixed frame size, `None` for the custom sentinel.
    pub size: Option<(u32, u32)>,
    /// Short names accepted on the command line.
    pub aliases: &'static [&'static str],
}

/// Catalog of output presets.
pub const PRESETS: &[PresetInfo] = &[
    PresetInfo {
        name: "Instagram Reels / TikTok (9:16)",
        size: Some((1080, 1920)),
        aliases: &["reels", "tiktok"],
    },
    PresetInfo {
        name: "Instagram Post (1:1)",
        size: Some((1080, 1080)),
        aliases: &["square", "instagram"],
    },
    PresetInfo {
        name: "YouTube Shorts (9:16)",
        size: Some((1080, 1920)),
        aliases: &["shorts"],
    },
    PresetInfo {
        name: "YouTube / Twitter (16:9)",
        size: Some((1920, 1080)),
        aliases: &["youtube", "twitter", "landscape"],
    },
    PresetInfo {
        name: CUSTOM,
        size: None,
        aliases: &["custom"],
    },
];

/// Find a preset by display name or alias (case-insensitive).
pub fn find_preset(name: &str) -> Option<&'static PresetInfo> {
    let name = name.trim();
    PRESETS.iter().find(|p| {
        p.name.eq_ignore_ascii_case(name) || p.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    })
}

/// Get all presets.
pub fn list_presets() -> &'static [PresetInfo] {
    PRESETS
}

/// Resolve a preset (plus optional custom size) into even output dimensions.
///
/// Returns `None` when no resize is requested: an unknown preset, or
/// "Custom" without two positive values.
pub fn resolve(preset: &str, custom_width: Option<u32>, custom_height: Option<u32>) -> Option<Dimensions> {
    let info = find_preset(preset)?;
    let (width, height) = match info.size {
        Some(size) => size,
        None => match (custom_width, custom_height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => return None,
        },
    };
    Some(Dimensions::new(round_up_even(width), round_up_even(height)))
}

/// Round up by one if odd, so nothing gets cropped. `u32::MAX` has no even
/// successor and rounds down instead.
pub fn round_up_even(value: u32) -> u32 {
    value.checked_add(value % 2).unwrap_or(value - 1)
}
