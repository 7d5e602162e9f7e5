//! Transcoding options passed through to the relay worker

/// Transcoding parameters for a relay
///
/// The registry never interprets these; they are handed to the worker as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayOptions {
    /// Output frame rate (`-r`)
    pub frame_rate: u32,

    /// Video quality scale, lower is better (`-q:v`)
    pub quality: u32,

    /// Emit periodic encoding progress on stderr (`-stats`)
    pub stats: bool,

    /// Additional flag/value pairs appended after the standard ones
    ///
    /// An empty value emits the flag alone.
    pub extra_args: Vec<(String, String)>,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            quality: 3,
            stats: true,
            extra_args: Vec::new(),
        }
    }
}

impl RelayOptions {
    /// Set the output frame rate
    pub fn frame_rate(mut self, fps: u32) -> Self {
        self.frame_rate = fps;
        self
    }

    /// Set the video quality scale
    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Disable the `-stats` flag
    pub fn without_stats(mut self) -> Self {
        self.stats = false;
        self
    }

    /// Append an extra flag
    pub fn arg(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_args.push((flag.into(), value.into()));
        self
    }

    /// Render as ffmpeg output arguments
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(5 + self.extra_args.len() * 2);

        if self.stats {
            args.push("-stats".to_string());
        }
        args.push("-r".to_string());
        args.push(self.frame_rate.to_string());
        args.push("-q:v".to_string());
        args.push(self.quality.to_string());

        for (flag, value) in &self.extra_args {
            args.push(flag.clone());
            if !value.is_empty() {
                args.push(value.clone());
            }
        }

        args
    }
}
