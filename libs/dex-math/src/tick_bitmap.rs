//! Packed record of initialized ticks.
//!
//! Ticks are divided by the tick spacing (rounding toward negative infinity)
//! and stored one bit per compressed tick in 128-bit words.

/// Bits per bitmap word
pub const WORD_BITS: i32 = 128;

/// Compressed index of a tick, floored for negative ticks
pub fn compress(tick: i32, tick_spacing: i32) -> i32 {
    tick.div_euclid(tick_spacing)
}

/// Word index and bit index of a compressed tick
pub fn position(compressed: i32) -> (i32, u32) {
    (
        compressed.div_euclid(WORD_BITS),
        compressed.rem_euclid(WORD_BITS) as u32,
    )
}

/// Next initialized tick in the same word as `tick`, searching left
/// (`lte`, inclusive) or right (exclusive).
///
/// When no bit is set the word boundary is returned with `false`, so callers
/// advance at most one word per call. `word_at` loads a word by index.
pub fn next_initialized_tick_within_one_word<E>(
    word_at: impl FnOnce(i32) -> Result<u128, E>,
    tick: i32,
    tick_spacing: i32,
    lte: bool,
) -> Result<(i32, bool), E> {
    let compressed = compress(tick, tick_spacing);

    if lte {
        let (word_pos, bit_pos) = position(compressed);
        // Bits at or below bit_pos
        let mask = u128::MAX >> (127 - bit_pos);
        let masked = word_at(word_pos)? & mask;

        let next = if masked != 0 {
            let msb = 127 - masked.leading_zeros();
            compressed - (bit_pos - msb) as i32
        } else {
            compressed - bit_pos as i32
        };
        Ok((next * tick_spacing, masked != 0))
    } else {
        let (word_pos, bit_pos) = position(compressed + 1);
        // Bits at or above bit_pos
        let mask = u128::MAX << bit_pos;
        let masked = word_at(word_pos)? & mask;

        let next = if masked != 0 {
            let lsb = masked.trailing_zeros();
            compressed + 1 + (lsb - bit_pos) as i32
        } else {
            compressed + 1 + (127 - bit_pos) as i32
        };
        Ok((next * tick_spacing, masked != 0))
    }
}
