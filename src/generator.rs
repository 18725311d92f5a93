//! Filler data generation for chunk files.
//!
//! Content is opaque alphanumeric noise: random enough to defeat trivial
//! compression or deduplication, never real or sensitive data.

use rand::Rng;
use rand::distr::Alphanumeric;

/// Produce `len` bytes of random alphanumeric filler.
pub fn generate(len: usize) -> Vec<u8> {
    let rng = rand::rng();
    rng.sample_iter(Alphanumeric).take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::generate;

    #[test]
    fn generates_requested_length() {
        assert_eq!(generate(0).len(), 0);
        assert_eq!(generate(1).len(), 1);
        assert_eq!(generate(4096).len(), 4096);
    }

    #[test]
    fn output_is_alphanumeric() {
        let data = generate(1024);
        assert!(data.iter().all(|b| b.is_ascii_alphanumeric()));
    }
}
