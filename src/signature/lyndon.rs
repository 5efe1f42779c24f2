//! Lyndon word enumeration for log-signature compression.
//!
//! A Lyndon word is strictly smaller than all of its proper rotations. The
//! coefficients of the tensor logarithm at Lyndon words form a minimal
//! linear compression of the log-signature, which is the representation
//! used throughout the [`crate::signature`] module.

/// Generates every Lyndon word of length 1..=`max_len` over the alphabet
/// `0..channels`, in lexicographic order (Duval's algorithm).
pub fn lyndon_words(channels: usize, max_len: usize) -> Vec<Vec<usize>> {
    assert!(channels >= 1, "alphabet must contain at least one letter");
    assert!(max_len >= 1, "maximum word length must be positive");

    let mut words = Vec::new();
    let mut current = vec![0usize];
    loop {
        words.push(current.clone());

        // Extend periodically to max_len, then trim trailing maximal
        // letters and increment the last remaining one.
        let period = current.len();
        let mut next: Vec<usize> = (0..max_len).map(|i| current[i % period]).collect();
        while next.last() == Some(&(channels - 1)) {
            next.pop();
        }
        match next.last_mut() {
            Some(last) => *last += 1,
            None => break,
        }
        current = next;
    }
    words
}

/// Number of compressed log-signature channels for a path with `channels`
/// coordinates truncated at `depth`.
pub fn logsignature_channels(channels: usize, depth: usize) -> usize {
    lyndon_words(channels, depth).len()
}

/// Row-major position of a word inside the degree-`len(word)` tensor level.
pub fn tensor_index(word: &[usize], channels: usize) -> usize {
    word.iter().fold(0, |acc, &letter| {
        debug_assert!(letter < channels);
        acc * channels + letter
    })
}
