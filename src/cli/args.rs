//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, DownloadMode};

/// Social media link resolver CLI.
#[derive(Parser, Debug)]
#[command(
    name = "mediagrab",
    version,
    about = "Resolve social media post links into direct media URLs",
    long_about = "Resolve a TikTok, Instagram, Facebook, YouTube, or Twitter/X post link into \
                  direct downloadable media URLs.\n\n\
                  Several upstream services are tried in order until one answers."
)]
pub struct Args {
    /// Post link to resolve.
    #[arg(required_unless_present_any = ["init_config", "list_providers"])]
    pub url: Option<String>,

    /// What to extract from the post.
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Shorthand for `--mode audio`.
    #[arg(long, conflicts_with = "mode")]
    pub audio: bool,

    /// Preferred video quality (e.g. 720, 1080, max).
    #[arg(short, long)]
    pub quality: Option<String>,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "MEDIAGRAB_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Total request timeout in seconds.
    #[arg(short, long, env = "MEDIAGRAB_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Remove a provider from the chain. Can be repeated.
    #[arg(long = "disable", value_name = "PROVIDER")]
    pub disable: Vec<String>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Print per-provider diagnostics after resolving.
    #[arg(long)]
    pub trace_providers: bool,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    pub init_config: bool,

    /// List the providers in chain order and exit.
    #[arg(long)]
    pub list_providers: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI download mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Video when the post has one.
    Auto,
    /// Audio track only.
    Audio,
}

impl From<ModeArg> for DownloadMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Auto => DownloadMode::Auto,
            ModeArg::Audio => DownloadMode::Audio,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.request.mode = mode.into();
        }

        if self.audio {
            config.request.mode = DownloadMode::Audio;
        }

        if let Some(quality) = &self.quality {
            config.request.quality = quality.clone();
        }

        if let Some(user_agent) = &self.user_agent {
            config.http.user_agent = user_agent.clone();
        }

        if let Some(timeout) = self.timeout {
            config.http.timeout_seconds = timeout;
        }

        for name in &self.disable {
            let already = config
                .providers
                .disabled
                .iter()
                .any(|d| d.eq_ignore_ascii_case(name));
            if !already {
                config.providers.disabled.push(name.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("mediagrab").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_url_required_unless_utility_flag() {
        assert!(Args::try_parse_from(["mediagrab"]).is_err());
        assert!(Args::try_parse_from(["mediagrab", "--list-providers"]).is_ok());
        assert!(Args::try_parse_from(["mediagrab", "--init-config"]).is_ok());
    }

    #[test]
    fn test_merge_overrides_config() {
        let args = parse(&[
            "https://www.tiktok.com/@u/video/1",
            "--audio",
            "--quality",
            "1080",
            "--disable",
            "tikwm",
            "--disable",
            "cobalt",
        ]);
        let mut config = Config::default();
        config.providers.disabled = vec!["TikWM".into()];

        args.merge_into_config(&mut config);

        assert_eq!(config.request.mode, DownloadMode::Audio);
        assert_eq!(config.request.quality, "1080");
        assert_eq!(config.providers.disabled, vec!["TikWM", "cobalt"]);
    }

    #[test]
    fn test_merge_leaves_unset_values() {
        let args = parse(&["https://youtu.be/abc", "--mode", "auto"]);
        let mut config = Config::default();
        let before = config.http.timeout_seconds;

        args.merge_into_config(&mut config);

        assert_eq!(config.request.mode, DownloadMode::Auto);
        assert_eq!(config.http.timeout_seconds, before);
    }

    #[test]
    fn test_audio_conflicts_with_mode() {
        assert!(Args::try_parse_from(["mediagrab", "https://youtu.be/abc", "--audio", "--mode", "auto"]).is_err());
    }
}
