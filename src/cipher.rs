//! Music block unscrambler.
//!
//! The music field of a song is obfuscated in 50-character blocks. Inside a
//! block, positions `0..5` are swapped with `45..50` and `10..24` with
//! `26..40` (`i <-> 49 - i`). The permutation is its own inverse, so the same
//! routine scrambles and unscrambles. A trailing part of 51 characters or
//! fewer is stored in the clear.
//!
//! After the blocks are put back, three literal aliases are expanded:
//! `Kcl` -> `"| x"`, `LZ` -> `" |"`, `XyQ` -> three spaces.

use log::debug;

/// Size of one obfuscated block.
pub const BLOCK_LEN: usize = 50;

/// A remainder up to this length is never scrambled.
const CLEAR_TAIL_LEN: usize = 51;

const SUBSTITUTIONS: [(&str, &str); 3] = [("Kcl", "| x"), ("LZ", " |"), ("XyQ", "   ")];

/// Apply the block permutation in place. `block` must hold exactly [`BLOCK_LEN`] characters.
pub fn permute_block(block: &mut [char]) {
    debug_assert_eq!(block.len(), BLOCK_LEN);
    for i in (0..5).chain(10..24) {
        block.swap(i, BLOCK_LEN - 1 - i);
    }
}

/// Undo the block permutation, leaving the literal aliases untouched.
pub fn unpermute(ciphered: &str) -> String {
    let mut chars: Vec<char> = ciphered.chars().collect();
    let mut start = 0;
    let mut blocks = 0;
    while chars.len() - start > CLEAR_TAIL_LEN {
        permute_block(&mut chars[start..start + BLOCK_LEN]);
        start += BLOCK_LEN;
        blocks += 1;
    }
    debug!(
        "unscrambled {} block(s), {} clear character(s)",
        blocks,
        chars.len() - start
    );
    chars.into_iter().collect()
}

/// Expand the `Kcl`, `LZ` and `XyQ` aliases, in that order.
pub fn expand_aliases(music: &str) -> String {
    SUBSTITUTIONS
        .iter()
        .fold(music.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Turn a ciphered music block into the plain music string.
pub fn unscramble(ciphered: &str) -> String {
    expand_aliases(&unpermute(ciphered))
}
