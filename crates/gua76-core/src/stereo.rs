//! Mid/Side stereo transform.
//!
//! ```text
//! encode: M = (L + R) / 2    S = (L − R) / 2
//! decode: L = M + S          R = M − S
//! ```
//!
//! The pair are exact inverses in infinite precision; in `f32` the
//! round trip is off by at most a few ULPs of the larger input.

/// Encodes a left/right pair into mid/side.
#[inline]
pub fn encode_mid_side(left: f32, right: f32) -> (f32, f32) {
    ((left + right) * 0.5, (left - right) * 0.5)
}

/// Decodes a mid/side pair back into left/right.
#[inline]
pub fn decode_mid_side(mid: f32, side: f32) -> (f32, f32) {
    (mid + side, mid - side)
}

/// Encodes two channel buffers in place (left → mid, right → side).
pub fn encode_mid_side_block(left: &mut [f32], right: &mut [f32]) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        (*l, *r) = encode_mid_side(*l, *r);
    }
}

/// Decodes two channel buffers in place (mid → left, side → right).
pub fn decode_mid_side_block(mid: &mut [f32], side: &mut [f32]) {
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        (*m, *s) = decode_mid_side(*m, *s);
    }
}
