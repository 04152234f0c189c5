//! Single update function for the generator form.

use shared::domain::{Platform, SubmissionParameters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Text(String),
    Margin(i64),
    Gif(bool),
    Loop(bool),
    FrameDelay(i64),
    Hdr(bool),
    HdrConfirmed(bool),
    Platform(Platform),
}

impl FieldUpdate {
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Margin(_) => "margin",
            Self::Gif(_) => "gif",
            Self::Loop(_) => "loop",
            Self::FrameDelay(_) => "frameDelay",
            Self::Hdr(_) => "hdr",
            Self::HdrConfirmed(_) => "hdrConfirmed",
            Self::Platform(_) => "platform",
        }
    }
}

/// Produces the next form record. Any write to `hdr` clears the confirmation,
/// so a confirmed state is never carried into a fresh HDR request.
pub fn apply_field_update(
    current: &SubmissionParameters,
    update: FieldUpdate,
) -> SubmissionParameters {
    let mut next = current.clone();
    match update {
        FieldUpdate::Text(text) => next.text = text,
        FieldUpdate::Margin(margin) => next.margin = margin,
        FieldUpdate::Gif(gif) => next.gif = gif,
        FieldUpdate::Loop(loop_animation) => next.loop_animation = loop_animation,
        FieldUpdate::FrameDelay(frame_delay_ms) => next.frame_delay_ms = frame_delay_ms,
        FieldUpdate::Hdr(hdr) => {
            next.hdr = hdr;
            next.hdr_confirmed = false;
        }
        FieldUpdate::HdrConfirmed(confirmed) => next.hdr_confirmed = confirmed,
        FieldUpdate::Platform(platform) => next.platform = Some(platform),
    }
    next
}
