//! Stateful streaming AAC decoder.
//!
//! Compressed access units are pushed with [`AacDecoder::send`]; decoded
//! frames are pulled with [`AacDecoder::receive`] as interleaved signed 16-bit
//! PCM. "No frame yet" is reported as `Ok(false)`, never as an error.
//!
//! ```no_run
//! use aac_stream_decoder::{AacDecoder, DecoderSize};
//!
//! let mut decoder = AacDecoder::open(48000, 2)?;
//! let unit: &[u8] = &[/* one AAC access unit */];
//! if decoder.send(unit) {
//!     let mut pcm = vec![0i16; 2 * 1024];
//!     let mut size = DecoderSize::default();
//!     while decoder.receive(Some(&mut pcm[..]), Some(&mut size))? {
//!         // hand pcm[..2 * size.samples as usize] to the sink
//!     }
//! }
//! # Ok::<(), aac_stream_decoder::DecoderError>(())
//! ```

pub mod audio;
pub mod config;
pub mod error;

pub use audio::{AacDecoder, DecoderQuery, DecoderSize, StreamDecoder};
pub use config::DecoderConfig;
pub use error::DecoderError;
