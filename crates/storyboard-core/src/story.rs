//! Story structure and render setting value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One scene as drafted by the structure call, before any image exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDraft {
    /// Text description used to render the scene's image.
    pub image_prompt: String,
    /// Optional narrative description of what happens in the scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A title candidate in both languages the service writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleData {
    /// English title.
    pub english: String,
    /// Korean title.
    pub korean: String,
}

/// The one-shot output of structure generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResult {
    /// Ordered scene drafts.
    pub scenes: Vec<SceneDraft>,
    /// Title candidates.
    pub titles: Vec<TitleData>,
    /// Prompt for a matching music track.
    pub music_prompt: String,
    /// Song lyrics.
    pub lyrics: String,
    /// Korean variant of the lyrics.
    pub lyrics_korean: String,
}

/// Returned when a render setting string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownSetting {
    /// Which setting was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal, { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Returns the wire string for this value.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownSetting;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownSetting { kind: $kind, value: other.to_owned() }),
                }
            }
        }
    };
}

wire_enum!(
    /// Image generation model.
    ImageModel, "image model", {
        /// Fast default model.
        NanoBanana => "nano-banana",
        /// Higher fidelity model.
        NanoBananaPro => "nano-banana-pro",
    }
);

wire_enum!(
    /// Output aspect ratio.
    AspectRatio, "aspect ratio", {
        /// Square.
        Square => "1:1",
        /// Portrait 3:4.
        Portrait => "3:4",
        /// Landscape 4:3.
        Landscape => "4:3",
        /// Tall 9:16.
        Tall => "9:16",
        /// Wide 16:9.
        Wide => "16:9",
    }
);

wire_enum!(
    /// Output resolution tier.
    ImageResolution, "resolution", {
        /// 1K.
        OneK => "1K",
        /// 2K.
        TwoK => "2K",
        /// 4K.
        FourK => "4K",
    }
);

/// Settings read by every render task at launch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Model used for the image call.
    pub model: ImageModel,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Requested resolution.
    pub resolution: ImageResolution,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            model: ImageModel::NanoBanana,
            aspect_ratio: AspectRatio::Wide,
            resolution: ImageResolution::OneK,
        }
    }
}
