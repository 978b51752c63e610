//! Planar f32 → interleaved s16 sample conversion.

/// Convert one float sample to s16: scale by 2^15, round half to even, clamp.
///
/// NaN maps to 0.
#[inline]
pub fn f32_to_s16(sample: f32) -> i16 {
    // `as` saturates and sends NaN to 0; the clamp keeps the intent explicit
    (sample * 32768.0)
        .round_ties_even()
        .clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

/// Interleave planar float channels into `out` as signed 16-bit PCM.
///
/// The channel count is `planes.len()` and every plane must hold at least
/// `samples` values. Writes `planes.len() * samples` values:
/// `ch0[0], ch1[0], …, ch0[1], ch1[1], …`.
///
/// Returns the number of i16 values written.
pub fn f32_planar_to_s16<P: AsRef<[f32]>>(planes: &[P], samples: usize, out: &mut [i16]) -> usize {
    let channels = planes.len();
    let total = channels * samples;
    debug_assert!(out.len() >= total);

    for (ch, plane) in planes.iter().enumerate() {
        let plane = &plane.as_ref()[..samples];
        for (i, &s) in plane.iter().enumerate() {
            out[i * channels + ch] = f32_to_s16(s);
        }
    }
    total
}

/// Serialize interleaved s16 samples as little-endian bytes.
pub fn s16_to_le_bytes(samples: &[i16], out: &mut [u8]) {
    for (chunk, s) in out.chunks_exact_mut(2).zip(samples) {
        chunk.copy_from_slice(&s.to_le_bytes());
    }
}
