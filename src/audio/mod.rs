//! audio - Streaming AAC decoding
//!
//! Wraps an opaque AAC decode engine in a push/pull context: compressed
//! access units go in through `send`, interleaved s16 PCM comes out of
//! `receive`. Symphonia provides the default engine.

pub mod adts;
pub mod asc;
pub mod convert;
mod decoder;
pub mod engine;
pub mod packet;
mod symphonia_engine;
pub mod stream_decoder;

pub use decoder::{AacDecoder, DecoderQuery, DecoderSize};
pub use engine::{
    DecodeEngine, DecodedFrame, EngineError, FrameSamples, SampleFormat,
    INPUT_BUFFER_PADDING_SIZE,
};
pub use packet::PaddedPacket;
pub use stream_decoder::{create_decoder, StreamDecoder};
pub use symphonia_engine::SymphoniaAacEngine;
