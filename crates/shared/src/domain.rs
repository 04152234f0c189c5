use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Wolt,
    Deliveroo,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Wolt, Platform::Deliveroo];

    pub fn label(self) -> &'static str {
        match self {
            Self::Wolt => "Wolt",
            Self::Deliveroo => "Deliveroo",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Gif,
}

impl OutputFormat {
    pub fn from_gif_flag(gif: bool) -> Self {
        if gif {
            Self::Gif
        } else {
            Self::Png
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Everything the user has entered into the generator form.
///
/// Values are never mutated in place by the UI; each edit produces a fresh
/// record (see the desktop controller's reducer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionParameters {
    pub text: String,
    pub margin: i64,
    pub gif: bool,
    pub loop_animation: bool,
    pub frame_delay_ms: i64,
    pub hdr: bool,
    pub hdr_confirmed: bool,
    pub platform: Option<Platform>,
}

impl Default for SubmissionParameters {
    fn default() -> Self {
        Self {
            text: String::new(),
            margin: 0,
            gif: false,
            loop_animation: true,
            frame_delay_ms: 100,
            hdr: false,
            hdr_confirmed: false,
            platform: None,
        }
    }
}

impl SubmissionParameters {
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_gif_flag(self.gif)
    }

    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn hdr_blocked(&self) -> bool {
        self.hdr && !self.hdr_confirmed
    }
}

/// Suggested file name for a generated image: line breaks become hyphens and
/// the extension follows the requested format.
pub fn download_file_name(text: &str, format: OutputFormat) -> String {
    let stem = text.replace("\r\n", "\n").replace('\n', "-");
    format!("{stem}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_generator_form() {
        let params = SubmissionParameters::default();
        assert_eq!(params.margin, 0);
        assert!(params.loop_animation);
        assert_eq!(params.frame_delay_ms, 100);
        assert!(!params.hdr_confirmed);
        assert_eq!(params.platform, None);
        assert_eq!(params.output_format(), OutputFormat::Png);
    }

    #[test]
    fn download_name_joins_lines_with_hyphens() {
        assert_eq!(download_file_name("hi", OutputFormat::Png), "hi.png");
        assert_eq!(download_file_name("a\nb", OutputFormat::Gif), "a-b.gif");
        assert_eq!(download_file_name("a\r\nb\nc", OutputFormat::Png), "a-b-c.png");
    }

    #[test]
    fn hdr_is_blocked_only_until_confirmed() {
        let mut params = SubmissionParameters {
            hdr: true,
            ..SubmissionParameters::default()
        };
        assert!(params.hdr_blocked());
        params.hdr_confirmed = true;
        assert!(!params.hdr_blocked());
    }
}
