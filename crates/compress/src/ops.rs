//! Compression Operations

use crate::Compression;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flate2::{Compression as GzCompression, read::GzDecoder, write::GzEncoder};
use std::io::{Read, Write};
use tracing::instrument;

// Highest gzip level; documents are written once per change and read on
// every subsequent run, so smaller objects win over encode speed.
const GZIP_LEVEL: GzCompression = GzCompression::best();

impl Compression {
    /// Compress a byte slice in memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use dandimeta_compress::Compression;
    ///
    /// let data = br#"{"dandiset_id": "000001"}"#;
    /// let compressed = Compression::Gzip.compress(data).unwrap();
    /// let roundtrip = Compression::Gzip.decompress(&compressed).unwrap();
    /// assert_eq!(roundtrip, data);
    /// ```
    pub fn compress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.compress_into(input, &mut output)?;
        Ok(output)
    }

    /// Decompress a byte slice in memory.
    pub fn decompress(&self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.decompress_into(input, &mut output)?;
        Ok(output)
    }

    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn compress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Gzip => {
                let mut encoder = GzEncoder::new(&mut *output, GZIP_LEVEL);
                encoder.write_all(input).or_raise(|| ErrorKind::Io)?;
                encoder.finish().or_raise(|| ErrorKind::Io)?;
                output.len()
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }

    #[instrument(skip(input, output), fields(
        format = %self,
        input_size = input.len(),
        output_size
    ))]
    pub fn decompress_into(&self, input: &[u8], output: &mut Vec<u8>) -> Result<usize> {
        let size = match self {
            Compression::None => {
                output.extend_from_slice(input);
                input.len()
            },
            Compression::Gzip => {
                let mut decoder = GzDecoder::new(input);
                decoder.read_to_end(output).or_raise(|| ErrorKind::InvalidData)?
            },
        };
        tracing::Span::current().record("output_size", size);
        Ok(size)
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;
    use rstest::rstest;

    #[rstest]
    #[case(Compression::None)]
    #[case(Compression::Gzip)]
    fn test_compress_decompress(#[case] format: Compression) {
        let original = br#"{"dandiset_id": "000001", "nwb_assets": []}"#;
        let compressed = format.compress(original).unwrap();
        let decompressed = format.decompress(&compressed).unwrap();
        assert_eq!(decompressed, original);
    }

    #[test]
    fn test_gzip_produces_magic_bytes() {
        let compressed = Compression::Gzip.compress(b"some document body").unwrap();
        assert_eq!(Compression::from_magic_bytes(&compressed), Compression::Gzip);
    }

    #[test]
    fn test_invalid_compressed_data() {
        let invalid_data = b"This is not gzip data";
        assert!(Compression::Gzip.decompress(invalid_data).is_err());
    }

    #[test]
    fn test_empty_input_roundtrip() {
        let compressed = Compression::Gzip.compress(b"").unwrap();
        assert!(!compressed.is_empty());
        let decompressed = Compression::Gzip.decompress(&compressed).unwrap();
        assert!(decompressed.is_empty());
    }
}
