//! Runtime configuration shared by the demos.
//!
//! Values come from the environment so the same binaries can be pointed at
//! a different display sink (e.g. `autovideosink` outside Wayland) or a
//! different media file without recompiling.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the video sink factory.
pub const VIDEO_SINK_ENV: &str = "PARALLAX_GST_VIDEO_SINK";

/// Environment variable overriding the default media file.
pub const VIDEO_FILE_ENV: &str = "PARALLAX_GST_VIDEO_FILE";

/// Default display sink.
pub const DEFAULT_VIDEO_SINK: &str = "waylandsink";

/// Default file played by the seek demo.
pub const DEFAULT_VIDEO_FILE: &str = "/tmp/video.mp4";

/// Configuration for pipeline helpers and demos.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Factory name of the element used to display video.
    pub video_sink: String,
    /// Media file used by file based demos.
    pub video_file: PathBuf,
    /// Timeout for per-element state queries.
    pub state_timeout: gst::ClockTime,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            video_sink: DEFAULT_VIDEO_SINK.to_string(),
            video_file: PathBuf::from(DEFAULT_VIDEO_FILE),
            state_timeout: gst::ClockTime::from_useconds(100),
        }
    }
}

impl Config {
    /// Build a configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    ///
    /// Missing or empty values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(sink) = lookup(VIDEO_SINK_ENV).filter(|v| !v.trim().is_empty()) {
            config.video_sink = sink.trim().to_string();
        }
        if let Some(file) = lookup(VIDEO_FILE_ENV).filter(|v| !v.trim().is_empty()) {
            config.video_file = PathBuf::from(file);
        }
        config
    }

    /// Set the video sink factory.
    pub fn with_video_sink(mut self, sink: impl Into<String>) -> Self {
        self.video_sink = sink.into();
        self
    }

    /// Set the media file.
    pub fn with_video_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.video_file = file.into();
        self
    }

    /// Set the state query timeout.
    pub fn with_state_timeout(mut self, timeout: gst::ClockTime) -> Self {
        self.state_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.video_sink, "waylandsink");
        assert_eq!(config.video_file, PathBuf::from("/tmp/video.mp4"));
        assert_eq!(config.state_timeout.nseconds(), 100_000);
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            (VIDEO_SINK_ENV, "autovideosink"),
            (VIDEO_FILE_ENV, "/data/clip.mp4"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.video_sink, "autovideosink");
        assert_eq!(config.video_file, PathBuf::from("/data/clip.mp4"));
    }

    #[test]
    fn test_empty_values_keep_defaults() {
        let config = Config::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_builder_setters() {
        let config = Config::default()
            .with_video_sink("fakesink")
            .with_video_file("a.mp4");
        assert_eq!(config.video_sink, "fakesink");
        assert_eq!(config.video_file, PathBuf::from("a.mp4"));
    }
}
