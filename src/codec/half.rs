/// Decode an IEEE-754 binary16 code to `f32`.
///
/// - exponent 0: subnormal, `sign * 2^-14 * (fraction / 1024)`
/// - exponent 0x1F: ±infinity when the fraction is 0, NaN otherwise
/// - otherwise: `sign * 2^(exp - 15) * (1 + fraction / 1024)`
#[inline]
pub fn f16_to_f32(code: u16) -> f32 {
    let sign = if code & 0x8000 != 0 { -1.0f32 } else { 1.0 };
    let exponent = ((code >> 10) & 0x1F) as i32;
    let fraction = (code & 0x03FF) as f32;

    match exponent {
        0 => sign * 2f32.powi(-14) * (fraction / 1024.0),
        0x1F => {
            if fraction == 0.0 {
                sign * f32::INFINITY
            } else {
                f32::NAN
            }
        }
        _ => sign * 2f32.powi(exponent - 15) * (1.0 + fraction / 1024.0),
    }
}

/// Decode little-endian binary16 codes from raw bytes.
/// A trailing odd byte is ignored.
pub fn decode_f16_le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f16_to_f32(u16::from_le_bytes([pair[0], pair[1]])))
        .collect()
}
