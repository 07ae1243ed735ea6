//! # LSB Steganography Implementation
//!
//! Hides an arbitrary serializable payload in the least significant bit of the
//! red channel of every pixel, and reads it back.
//!
//! ## Algorithm
//!
//! ### Encoding Process
//! 1. Serialize the payload with MessagePack. The encoding is self-delimiting,
//!    so no separate length prefix is written.
//! 2. Expand the bytes into bits, most significant bit first.
//! 3. Pad with zero bits until there is exactly one bit per pixel.
//! 4. Walk the pixels in row-major order and replace the LSB of each red value
//!    with the next bit: `red = (red & 0xFE) | bit`.
//! 5. Green and blue are copied unchanged; the output is always RGB.
//!
//! ### Decoding Process
//! 1. Collect `red & 1` for every pixel in row-major order.
//! 2. Pack every 8 bits into a byte (MSB first).
//! 3. Deserialize one MessagePack value from the front of the byte stream. The
//!    zero padding after it is never read.
//!
//! ### Capacity
//! One bit per pixel: a 64x64 image holds 512 bytes of serialized payload.
//!
//! The result has to be kept in a lossless format (PNG). Any lossy
//! re-compression rewrites the low bits and makes the payload unreadable. This
//! is an encoding, not encryption: anyone who knows the layout can read it.

use image::{DynamicImage, RgbImage};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::iter;

use crate::error::{ImagingError, Result};

/// Number of payload bits an image can hold.
pub fn capacity_bits(image: &DynamicImage) -> usize {
    image.width() as usize * image.height() as usize
}

/// Hide `payload` in the red-channel LSBs of `image`.
///
/// The input image is not modified; a new RGB buffer is returned.
///
/// # Errors
/// - [`ImagingError::Capacity`] if the serialized payload has more bits than
///   the image has pixels. Nothing is written in that case.
/// - [`ImagingError::EncodeImage`] if the payload cannot be serialized
///
/// # Example
/// ```ignore
/// let carrier = image::open("photo.png")?;
/// let hidden = encode(&"username:alice", &carrier)?;
/// hidden.save("hidden.png")?;
/// ```
pub fn encode<T>(payload: &T, image: &DynamicImage) -> Result<RgbImage>
where
    T: Serialize + ?Sized,
{
    // Step 1: Serialize the payload
    let data_to_embed = rmp_serde::to_vec(payload)
        .map_err(|e| ImagingError::EncodeImage(format!("payload serialization failed: {}", e)))?;

    // Step 2: Check capacity before touching any pixel
    let available_bits = capacity_bits(image);
    let required_bits = data_to_embed.len() * 8;

    if required_bits > available_bits {
        return Err(ImagingError::Capacity {
            required: required_bits,
            available: available_bits,
        });
    }

    let mut img = image.to_rgb8();

    // Step 3: Bits MSB first, then zeros for the rest of the pixels
    let bits = data_to_embed
        .iter()
        .flat_map(|byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .chain(iter::repeat(0));

    // Step 4: Overwrite the red LSB; pixels_mut() walks row by row
    for (pixel, bit) in img.pixels_mut().zip(bits) {
        pixel[0] = (pixel[0] & 0xFE) | (bit & 0x01);
    }

    Ok(img)
}

/// Read back a payload hidden with [`encode`].
///
/// # Errors
/// - [`ImagingError::Decode`] if the leading bytes are not a valid serialized
///   value of type `T` (the image was never encoded, or was re-compressed)
pub fn decode<T>(image: &DynamicImage) -> Result<T>
where
    T: DeserializeOwned,
{
    let hidden_bytes = extract_bytes(image);

    rmp_serde::from_slice(&hidden_bytes).map_err(|e| ImagingError::Decode(e.to_string()))
}

/// Pack the red-channel LSBs of every pixel into bytes, MSB first.
///
/// A trailing partial byte is padded with zero bits on the right.
pub fn extract_bytes(image: &DynamicImage) -> Vec<u8> {
    let img = image.to_rgb8();
    let mut bytes = Vec::with_capacity(capacity_bits(image) / 8 + 1);

    let mut current = 0u8;
    let mut bit_index = 0;

    for pixel in img.pixels() {
        current = (current << 1) | (pixel[0] & 0x01);

        bit_index += 1;
        if bit_index == 8 {
            bytes.push(current);
            current = 0;
            bit_index = 0;
        }
    }

    if bit_index > 0 {
        bytes.push(current << (8 - bit_index));
    }

    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};
    use rand::Rng;
    use serde::Deserialize;

    fn black(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
    }

    fn noisy(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 + y * 13) as u8, (x * 3) as u8, (y * 5) as u8])
        }))
    }

    #[test]
    fn test_hello_round_trip_in_black_image() {
        let encoded = encode("hello", &black(64, 64)).unwrap();
        let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn test_green_and_blue_edits_do_not_change_payload() {
        let mut encoded = encode("hello", &black(64, 64)).unwrap();
        for pixel in encoded.pixels_mut() {
            pixel[1] ^= 0x01;
            pixel[2] = 0xFF;
        }

        let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn test_only_red_lsb_changes() {
        let source = noisy(32, 16);
        let encoded = encode("some hidden text", &source).unwrap();
        let original = source.to_rgb8();

        for (before, after) in original.pixels().zip(encoded.pixels()) {
            assert_eq!(before[0] & 0xFE, after[0] & 0xFE);
            assert_eq!(before[1], after[1]);
            assert_eq!(before[2], after[2]);
        }
    }

    #[test]
    fn test_bits_are_msb_first_and_zero_padded() {
        // "hello" serializes to a5 68 65 6c 6c 6f
        let encoded = encode("hello", &noisy(16, 8)).unwrap();
        let bits: Vec<u8> = encoded.pixels().map(|p| p[0] & 1).collect();

        assert_eq!(&bits[0..8], &[1, 0, 1, 0, 0, 1, 0, 1]);
        assert_eq!(&bits[8..16], &[0, 1, 1, 0, 1, 0, 0, 0]);
        assert!(bits[48..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_exact_capacity_succeeds() {
        // 6 serialized bytes = 48 bits = 8x6 pixels
        let encoded = encode("hello", &black(8, 6)).unwrap();
        let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, "hello");
    }

    #[test]
    fn test_one_bit_over_capacity_fails() {
        match encode("hello", &black(47, 1)) {
            Err(ImagingError::Capacity {
                required,
                available,
            }) => {
                assert_eq!(required, 48);
                assert_eq!(available, 47);
            }
            other => panic!("expected capacity error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_is_idempotent() {
        let encoded = DynamicImage::ImageRgb8(encode("twice", &noisy(20, 20)).unwrap());
        let first: String = decode(&encoded).unwrap();
        let second: String = decode(&encoded).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_structured_payload_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Owner {
            name: String,
            views: u32,
            tags: Vec<String>,
        }

        let payload = Owner {
            name: "alice".to_string(),
            views: 5,
            tags: vec!["a".to_string(), "b".to_string()],
        };

        let encoded = encode(&payload, &noisy(40, 40)).unwrap();
        let decoded: Owner = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_byte_payload_round_trip() {
        let payload: Vec<u8> = (0..=255).collect();
        let encoded = encode(&payload, &noisy(64, 64)).unwrap();
        let decoded: Vec<u8> = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn test_rgba_input_produces_rgb_output() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 40])));
        let encoded = encode("alpha", &rgba).unwrap();
        assert_eq!(encoded.dimensions(), (16, 16));

        let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, "alpha");
    }

    #[test]
    fn test_never_encoded_image_fails_to_decode() {
        let result: Result<String> = decode(&black(64, 64));
        assert!(matches!(result, Err(ImagingError::Decode(_))));
    }

    fn random_text(rng: &mut impl Rng) -> String {
        let len = rng.gen_range(0..40);
        (0..len).map(|_| rng.gen::<char>()).collect()
    }

    fn random_image(rng: &mut impl Rng, width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |_, _| Rgb(rng.gen()))
    }

    #[test]
    fn test_random_payloads_round_trip_at_exact_capacity() {
        let mut rng = rand::thread_rng();

        for _ in 0..200 {
            let text = random_text(&mut rng);
            let bits = (rmp_serde::to_vec(&text).unwrap().len() * 8) as u32;

            let exact = DynamicImage::ImageRgb8(random_image(&mut rng, bits, 1));
            let encoded = encode(text.as_str(), &exact).unwrap();
            let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
            assert_eq!(decoded, text);

            let short = DynamicImage::ImageRgb8(random_image(&mut rng, bits - 1, 1));
            assert!(matches!(
                encode(text.as_str(), &short),
                Err(ImagingError::Capacity { .. })
            ));
        }
    }

    #[test]
    fn test_edits_above_red_lsb_do_not_change_payload() {
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let text = random_text(&mut rng);
            let carrier = DynamicImage::ImageRgb8(random_image(&mut rng, 48, 48));
            let mut encoded = encode(text.as_str(), &carrier).unwrap();

            // scramble red bits 1-7 and both other channels
            for pixel in encoded.pixels_mut() {
                pixel[0] = (rng.gen::<u8>() & 0xFE) | (pixel[0] & 0x01);
                pixel[1] = rng.gen();
                pixel[2] = rng.gen();
            }

            let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
            assert_eq!(decoded, text);
        }
    }

    #[test]
    fn test_non_ascii_round_trip() {
        let text = "ヘルプ • naïve ✓ 🦀";
        let encoded = encode(text, &noisy(32, 32)).unwrap();
        let decoded: String = decode(&DynamicImage::ImageRgb8(encoded)).unwrap();
        assert_eq!(decoded, text);
    }

    #[test]
    fn test_extract_bytes_pads_partial_byte() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(0, 0, Rgb([1, 0, 0]));
        img.put_pixel(2, 0, Rgb([3, 0, 0]));

        let bytes = extract_bytes(&DynamicImage::ImageRgb8(img));
        assert_eq!(bytes, vec![0b1010_0000]);
    }
}
