//! Generic stream decoder trait for playback loops.

use anyhow::Result;

use super::decoder::AacDecoder;
use crate::config::DecoderConfig;

/// A trait for audio stream decoders that convert compressed audio data
/// into interleaved i16 PCM samples ready for an output sink.
///
/// One call consumes one access unit and returns every frame it produced,
/// which may be none while the decoder is still buffering.
pub trait StreamDecoder: Send {
    /// Decode compressed audio bytes into interleaved i16 PCM samples.
    fn decode(&mut self, data: &[u8]) -> Result<Vec<i16>>;
}

/// Factory function: create a decoder based on the configured stream format.
pub fn create_decoder(config: &DecoderConfig) -> Result<Box<dyn StreamDecoder>> {
    match config.stream_format.as_str() {
        "aac" => {
            let decoder = AacDecoder::from_config(config)?;
            Ok(Box::new(decoder))
        }
        other => anyhow::bail!("Unsupported stream format: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_rejects_unknown_formats() {
        let config = DecoderConfig {
            stream_format: "opus".to_string(),
            ..DecoderConfig::default()
        };
        let err = create_decoder(&config).err().unwrap();
        assert!(err.to_string().contains("opus"));
    }

    #[test]
    fn factory_builds_aac() {
        assert!(create_decoder(&DecoderConfig::default()).is_ok());
    }
}
