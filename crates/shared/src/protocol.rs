use serde::{Deserialize, Serialize};

use crate::domain::{OutputFormat, Platform, SubmissionParameters};

pub const GENERATE_PATH: &str = "/api/generate";

/// JSON body posted to the generation endpoint. Field order is part of the
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub text: String,
    pub margin: i64,
    pub gif: bool,
    #[serde(rename = "loop")]
    pub loop_animation: bool,
    #[serde(rename = "frameDelay")]
    pub frame_delay_ms: i64,
    pub hdr: bool,
    #[serde(rename = "hdrConfirmed")]
    pub hdr_confirmed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
}

impl GenerateRequest {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_gif_flag(self.gif)
    }
}

impl From<&SubmissionParameters> for GenerateRequest {
    fn from(params: &SubmissionParameters) -> Self {
        Self {
            text: params.text.clone(),
            margin: params.margin,
            gif: params.gif,
            loop_animation: params.loop_animation,
            frame_delay_ms: params.frame_delay_ms,
            hdr: params.hdr,
            hdr_confirmed: params.hdr_confirmed,
            platform: params.platform,
        }
    }
}
