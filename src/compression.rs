//! Hand-rolled LZ77 + RLE compression for rotated log files
//!
//! Not a general-purpose compressor: a small LZ77 with a 32 KiB window and
//! an RLE fast path for long runs, wrapped in a fixed container header so a
//! rotated `.logc` file can be identified and checksummed without external
//! tooling. `crc32fast` supplies the trailer checksum; everything else is
//! implemented directly against the match-finder described below.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crc32fast::Hasher as Crc32Hasher;

use crate::error::{LoglyError, Result};

const MAGIC: [u8; 4] = *b"LOGC";
const CONTAINER_VERSION: u8 = 1;
const ALGO_LZ77_RLE: u8 = 1;
const WINDOW_SIZE: usize = 32 * 1024;
const MIN_MATCH: usize = 3;
const MAX_MATCH: usize = 258;
const MIN_RUN: usize = 4;
const MAX_RUN: usize = 255;

/// Search-depth tuning for the LZ77 match finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionLevel {
    None,
    Fast,
    Default,
    Best,
}

impl CompressionLevel {
    fn max_chain(self) -> usize {
        match self {
            CompressionLevel::None => 0,
            CompressionLevel::Fast => 8,
            CompressionLevel::Default => 32,
            CompressionLevel::Best => 128,
        }
    }
}

/// Per-token stream: a literal run or a back-reference/RLE run.
enum Token {
    Literal(u8),
    Run { distance: u16, length: u16 },
}

fn key3(data: &[u8], i: usize) -> [u8; 3] {
    [data[i], data[i + 1], data[i + 2]]
}

fn find_match(
    data: &[u8],
    pos: usize,
    chains: &HashMap<[u8; 3], Vec<u32>>,
    max_chain: usize,
) -> Option<(usize, usize)> {
    if pos + MIN_MATCH > data.len() || max_chain == 0 {
        return None;
    }
    let key = key3(data, pos);
    let candidates = chains.get(&key)?;

    let mut best_len = 0usize;
    let mut best_dist = 0usize;

    for &cand in candidates.iter().rev().take(max_chain) {
        let cand = cand as usize;
        if pos <= cand || pos - cand > WINDOW_SIZE {
            continue;
        }
        let max_len = (data.len() - pos).min(MAX_MATCH);
        let mut len = 0;
        while len < max_len && data[cand + len] == data[pos + len] {
            len += 1;
        }
        if len >= MIN_MATCH && len > best_len {
            best_len = len;
            best_dist = pos - cand;
        }
    }

    if best_len >= MIN_MATCH {
        Some((best_dist, best_len))
    } else {
        None
    }
}

fn run_length(data: &[u8], pos: usize) -> usize {
    let byte = data[pos];
    let mut len = 1;
    while pos + len < data.len() && len < MAX_RUN && data[pos + len] == byte {
        len += 1;
    }
    len
}

fn tokenize(data: &[u8], level: CompressionLevel) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chains: HashMap<[u8; 3], Vec<u32>> = HashMap::new();
    let max_chain = level.max_chain();

    let mut i = 0;
    while i < data.len() {
        if i + MIN_RUN <= data.len() {
            let run = run_length(data, i);
            if run >= MIN_RUN {
                tokens.push(Token::Run {
                    distance: 1,
                    length: run as u16,
                });
                for j in i..(i + run).min(data.len().saturating_sub(2)) {
                    if j + 3 <= data.len() {
                        chains.entry(key3(data, j)).or_default().push(j as u32);
                    }
                }
                i += run;
                continue;
            }
        }

        if let Some((dist, len)) = find_match(data, i, &chains, max_chain) {
            tokens.push(Token::Run {
                distance: dist as u16,
                length: len as u16,
            });
            for j in i..(i + len).min(data.len().saturating_sub(2)) {
                if j + 3 <= data.len() {
                    chains.entry(key3(data, j)).or_default().push(j as u32);
                }
            }
            i += len;
        } else {
            if i + 3 <= data.len() {
                chains.entry(key3(data, i)).or_default().push(i as u32);
            }
            tokens.push(Token::Literal(data[i]));
            i += 1;
        }
    }

    tokens
}

/// Encodes tokens into the raw payload byte stream.
///
/// Each token is tagged: `0x00 <byte>` for a literal, `0x01 <dist:u16 LE>
/// <len:u16 LE>` for a run (back-reference or RLE, distance `1` marks RLE).
fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    for token in tokens {
        match token {
            Token::Literal(b) => {
                out.push(0x00);
                out.push(*b);
            }
            Token::Run { distance, length } => {
                out.push(0x01);
                out.extend_from_slice(&distance.to_le_bytes());
                out.extend_from_slice(&length.to_le_bytes());
            }
        }
    }
    out
}

fn decode_tokens(payload: &[u8], original_len: usize) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(original_len);
    let mut i = 0;

    while i < payload.len() {
        match payload[i] {
            0x00 => {
                if i + 1 >= payload.len() {
                    return Err(LoglyError::InvalidOffset);
                }
                out.push(payload[i + 1]);
                i += 2;
            }
            0x01 => {
                if i + 4 >= payload.len() {
                    return Err(LoglyError::InvalidOffset);
                }
                let distance = u16::from_le_bytes([payload[i + 1], payload[i + 2]]) as usize;
                let length = u16::from_le_bytes([payload[i + 3], payload[i + 4]]) as usize;
                i += 5;

                if distance == 0 || distance > out.len() + 1 {
                    return Err(LoglyError::InvalidOffset);
                }
                let start = out.len() - distance;
                for k in 0..length {
                    let byte = out[start + k];
                    out.push(byte);
                }
            }
            _ => return Err(LoglyError::InvalidOffset),
        }
    }

    Ok(out)
}

/// Compresses a byte slice, returning a self-contained container.
pub fn compress(data: &[u8], level: CompressionLevel) -> Vec<u8> {
    let tokens = tokenize(data, level);
    let payload = encode_tokens(&tokens);

    let mut crc = Crc32Hasher::new();
    crc.update(data);
    let checksum = crc.finalize();

    let mut out = Vec::with_capacity(payload.len() + 18);
    out.extend_from_slice(&MAGIC);
    out.push(CONTAINER_VERSION);
    out.push(ALGO_LZ77_RLE);
    out.push(0); // flags, reserved
    out.extend_from_slice(&(data.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);
    out.extend_from_slice(&checksum.to_le_bytes());
    out
}

/// Decompresses a container produced by [`compress`].
pub fn decompress(container: &[u8]) -> Result<Vec<u8>> {
    if container.len() < 4 + 1 + 1 + 1 + 8 + 4 {
        return Err(LoglyError::InvalidMagic);
    }
    if container[0..4] != MAGIC {
        return Err(LoglyError::InvalidMagic);
    }
    let version = container[4];
    let algorithm = container[5];
    if version != CONTAINER_VERSION || algorithm != ALGO_LZ77_RLE {
        return Err(LoglyError::UnsupportedContainer { version, algorithm });
    }

    let original_len = u64::from_le_bytes(container[7..15].try_into().unwrap()) as usize;
    let payload_end = container.len() - 4;
    let payload = &container[15..payload_end];
    let expected_crc = u32::from_le_bytes(container[payload_end..].try_into().unwrap());

    let decoded = decode_tokens(payload, original_len)?;

    let mut crc = Crc32Hasher::new();
    crc.update(&decoded);
    let found_crc = crc.finalize();

    if found_crc != expected_crc {
        return Err(LoglyError::ChecksumMismatch {
            expected: expected_crc,
            found: found_crc,
        });
    }

    Ok(decoded)
}

/// Aggregate compression throughput counters.
#[derive(Default)]
pub struct CompressionStats {
    pub files_compressed: AtomicU64,
    pub bytes_before: AtomicU64,
    pub bytes_after: AtomicU64,
    pub total_compression_time_ns: AtomicU64,
    pub errors: AtomicU64,
}

impl CompressionStats {
    pub fn compression_ratio(&self) -> f64 {
        let before = self.bytes_before.load(Ordering::Relaxed);
        let after = self.bytes_after.load(Ordering::Relaxed);
        if after == 0 {
            0.0
        } else {
            before as f64 / after as f64
        }
    }

    pub fn space_savings(&self) -> f64 {
        let before = self.bytes_before.load(Ordering::Relaxed);
        let after = self.bytes_after.load(Ordering::Relaxed);
        if before == 0 {
            0.0
        } else {
            1.0 - (after as f64 / before as f64)
        }
    }
}

/// Streams a file through [`compress`] in `buffer_size`-chunked reads,
/// writing the result to `dest`, updating `stats` as it goes.
pub fn compress_file(
    source: &Path,
    dest: &Path,
    level: CompressionLevel,
    buffer_size: usize,
    stats: &CompressionStats,
) -> Result<()> {
    let start = std::time::Instant::now();

    let mut reader = BufReader::with_capacity(buffer_size, File::open(source)?);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let compressed = compress(&data, level);

    let mut writer = BufWriter::new(File::create(dest)?);
    writer.write_all(&compressed)?;
    writer.flush()?;

    stats.files_compressed.fetch_add(1, Ordering::Relaxed);
    stats
        .bytes_before
        .fetch_add(data.len() as u64, Ordering::Relaxed);
    stats
        .bytes_after
        .fetch_add(compressed.len() as u64, Ordering::Relaxed);
    stats
        .total_compression_time_ns
        .fetch_add(start.elapsed().as_nanos() as u64, Ordering::Relaxed);

    Ok(())
}

/// Decompresses a container file produced by [`compress_file`].
pub fn decompress_file(source: &Path, dest: &Path, buffer_size: usize) -> Result<()> {
    let mut reader = BufReader::with_capacity(buffer_size, File::open(source)?);
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;

    let decompressed = decompress(&data)?;

    let mut writer = BufWriter::new(File::create(dest)?);
    writer.write_all(&decompressed)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_plain_text() {
        let data = b"the quick brown fox jumps over the lazy dog, the quick brown fox again";
        let compressed = compress(data, CompressionLevel::Default);
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_roundtrip_run_length() {
        let data = vec![b'a'; 10_000];
        let compressed = compress(&data, CompressionLevel::Default);
        assert!(compressed.len() < data.len());
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let err = decompress(b"not a container").unwrap_err();
        assert!(matches!(err, LoglyError::InvalidMagic));
    }

    #[test]
    fn test_corrupted_checksum_detected() {
        let data = b"hello hello hello hello world";
        let mut compressed = compress(data, CompressionLevel::Default);
        let last = compressed.len() - 1;
        compressed[last] ^= 0xFF;
        let err = decompress(&compressed).unwrap_err();
        assert!(matches!(err, LoglyError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("app.log");
        let dest = dir.path().join("app.log.logc");
        let restored = dir.path().join("app.log.restored");

        std::fs::write(&source, b"line one\nline two\nline one\nline two\n").unwrap();

        let stats = CompressionStats::default();
        compress_file(&source, &dest, CompressionLevel::Default, 4096, &stats).unwrap();
        decompress_file(&dest, &restored, 4096).unwrap();

        let original = std::fs::read(&source).unwrap();
        let roundtrip = std::fs::read(&restored).unwrap();
        assert_eq!(original, roundtrip);
        assert_eq!(stats.files_compressed.load(Ordering::Relaxed), 1);
    }
}
