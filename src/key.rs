//! Stable short keys for report rows.

/// Derives a stable short key from a unit's human-readable name.
///
/// CRC-32 of the UTF-8 bytes, rendered as unpadded lowercase hex. The key is
/// a pure function of the name: deterministic across runs and processes.
/// Collisions are tolerated by consumers; only determinism and a reasonable
/// spread matter.
pub fn derive_key(name: &str) -> String {
    format!("{:x}", crc32fast::hash(name.as_bytes()))
}
