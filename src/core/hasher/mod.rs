//! # Hasher Module
//!
//! Computes perceptual fingerprints for decoded images.
//!
//! ## How It Works
//! 1. Resize the image to a small grid (8x8)
//! 2. Convert to grayscale
//! 3. Compute a gradient hash from pixel relationships
//! 4. Compare fingerprints using Hamming distance
//!
//! The same pixel content always yields the same fingerprint, so two
//! fetches of an identical image classify identically regardless of which
//! worker handled them.

use crate::error::HashError;
use image::DynamicImage;
use image_hasher::{HashAlg, HasherConfig};
use serde::{Deserialize, Serialize};

/// A fixed-width perceptual fingerprint.
///
/// Only these raw bytes outlive classification; the decoded image they
/// were computed from is dropped as soon as hashing finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
}

impl Fingerprint {
    /// Create a fingerprint from raw hash bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }

    /// Hamming distance: the number of bits that differ.
    ///
    /// Symmetric, non-negative; lower means more similar.
    pub fn distance(&self, other: &Self) -> u32 {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Get the fingerprint as a hexadecimal string
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Get the raw hash bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Perceptual hasher wrapping the `image_hasher` gradient hash.
///
/// Cheap to construct; the engine builds one per worker thread.
pub struct FingerprintHasher {
    hasher: image_hasher::Hasher,
}

impl FingerprintHasher {
    pub fn new() -> Self {
        let hasher = HasherConfig::new()
            .hash_size(8, 8)
            .hash_alg(HashAlg::Gradient)
            .to_hasher();
        Self { hasher }
    }

    /// Compute the fingerprint of a decoded image.
    ///
    /// Fails on zero-dimension images; the failure is distinguishable from
    /// a download failure in logs and run stats.
    pub fn hash(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(HashError::EmptyImage { width, height });
        }

        let hash = self.hasher.hash_image(image);
        Ok(Fingerprint::from_bytes(hash.as_bytes()))
    }
}

impl Default for FingerprintHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};

    fn solid_image(r: u8, g: u8, b: u8) -> DynamicImage {
        let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([r, g, b]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn identical_images_produce_identical_fingerprints() {
        let hasher = FingerprintHasher::new();
        let image = solid_image(128, 128, 128);

        let a = hasher.hash(&image).unwrap();
        let b = hasher.hash(&image).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.distance(&b), 0);
    }

    #[test]
    fn similar_images_produce_close_fingerprints() {
        let hasher = FingerprintHasher::new();

        let a = hasher.hash(&solid_image(128, 128, 128)).unwrap();
        let b = hasher.hash(&solid_image(133, 133, 133)).unwrap();

        assert!(a.distance(&b) < 10);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let print = Fingerprint::from_bytes(&[0xFF, 0x00, 0xAA, 0x55]);
        assert_eq!(print.distance(&print), 0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Fingerprint::from_bytes(&[0xFF, 0x00]);
        let b = Fingerprint::from_bytes(&[0x00, 0xFF]);
        assert_eq!(a.distance(&b), b.distance(&a));
    }

    #[test]
    fn distance_counts_differing_bits() {
        let a = Fingerprint::from_bytes(&[0b1111_1111]);
        let b = Fingerprint::from_bytes(&[0b0000_0000]);
        assert_eq!(a.distance(&b), 8);
    }

    #[test]
    fn to_hex_produces_correct_string() {
        let print = Fingerprint::from_bytes(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(print.to_hex(), "deadbeef");
    }

    #[test]
    fn zero_dimension_image_fails() {
        let hasher = FingerprintHasher::new();
        let empty = DynamicImage::ImageRgb8(ImageBuffer::new(0, 0));

        let error = hasher.hash(&empty).unwrap_err();
        assert!(matches!(error, HashError::EmptyImage { .. }));
    }
}
