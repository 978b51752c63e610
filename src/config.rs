use serde::{Deserialize, Serialize};

use crate::error::DecoderError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// 压缩流格式，目前只支持 "aac"
    pub stream_format: String,
    /// Sample rate the engine is opened with (Hz)
    pub sample_rate: u32,
    /// Channel count the engine is opened with
    pub channels: u32,
    /// Decoded frames the engine may hold before `send` reports a full buffer
    #[serde(default = "default_max_pending_frames")]
    pub max_pending_frames: usize,
}

fn default_max_pending_frames() -> usize {
    env!("DECODER_MAX_PENDING_FRAMES").parse().unwrap_or(8)
}

impl DecoderConfig {
    /// 从编译时设置的环境变量创建配置
    /// 所有参数都在编译时从 config.toml 中读取
    pub fn new() -> Result<Self, &'static str> {
        Ok(Self {
            stream_format: env!("DECODER_STREAM_FORMAT").to_string(),
            sample_rate: env!("DECODER_SAMPLE_RATE").parse()
                .map_err(|_| "Failed to parse DECODER_SAMPLE_RATE")?,
            channels: env!("DECODER_CHANNELS").parse()
                .map_err(|_| "Failed to parse DECODER_CHANNELS")?,
            max_pending_frames: env!("DECODER_MAX_PENDING_FRAMES").parse()
                .map_err(|_| "Failed to parse DECODER_MAX_PENDING_FRAMES")?,
        })
    }

    /// Same defaults with a different stream shape.
    pub fn with_stream(sample_rate: u32, channels: u32) -> Self {
        Self {
            sample_rate,
            channels,
            ..Self::default()
        }
    }

    /// Check the preconditions `AacDecoder::open` relies on.
    pub fn validate(&self) -> Result<(), DecoderError> {
        if self.sample_rate == 0 {
            return Err(DecoderError::Configuration(
                "sample rate must be greater than zero".into(),
            ));
        }
        if self.channels == 0 {
            return Err(DecoderError::Configuration(
                "channel count must be at least 1".into(),
            ));
        }
        if self.max_pending_frames == 0 {
            return Err(DecoderError::Configuration(
                "max_pending_frames must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        // config.toml 在构建时已被解析，这里只会在手工改坏环境变量时回退
        Self::new().unwrap_or(Self {
            stream_format: "aac".to_string(),
            sample_rate: 48000,
            channels: 2,
            max_pending_frames: 8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_defaults_match_config_toml() {
        let config = DecoderConfig::new().unwrap();
        assert_eq!(config.stream_format, "aac");
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 2);
        assert_eq!(config.max_pending_frames, 8);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_rate_and_channels() {
        let mut config = DecoderConfig::with_stream(0, 2);
        assert!(matches!(config.validate(), Err(DecoderError::Configuration(_))));

        config.sample_rate = 44100;
        config.channels = 0;
        assert!(matches!(config.validate(), Err(DecoderError::Configuration(_))));

        config.channels = 1;
        config.max_pending_frames = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialize_fills_missing_queue_depth() {
        let config: DecoderConfig = serde_json::from_str(
            r#"{"stream_format":"aac","sample_rate":44100,"channels":1}"#,
        )
        .unwrap();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.channels, 1);
        assert_eq!(config.max_pending_frames, 8);
    }
}
