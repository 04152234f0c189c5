use anyhow::Context;
use clap::Parser;
use url::Url;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Parser, Debug, Default)]
#[command(name = "emoji-maker", about = "Desktop form for the emoji generation service")]
pub struct Args {
    /// Base URL of the generation service.
    #[arg(long, env = "EMOJI_MAKER_SERVER_URL")]
    pub server_url: Option<String>,
    /// Page location the form is opened at; its query string drives feature
    /// flags. Defaults to the server URL.
    #[arg(long, env = "EMOJI_MAKER_LOCATION")]
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
    pub location: Url,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl StartupConfig {
    pub fn from_args(args: Args) -> anyhow::Result<Self> {
        let server_url =
            non_empty(args.server_url).unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Url::parse(&server_url)
            .with_context(|| format!("invalid server url '{server_url}'"))?;

        let raw_location = non_empty(args.location).unwrap_or_else(|| server_url.clone());
        let location = Url::parse(&raw_location)
            .with_context(|| format!("invalid location '{raw_location}'"))?;

        Ok(Self {
            server_url,
            location,
        })
    }
}
