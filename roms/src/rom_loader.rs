//! ROM loading and validation for the Galaga PCB (spec.md §6).
//!
//! Supports loading ROM files from pre-extracted MAME ROM directories
//! or programmatic byte slices (for testing). ROM files can include
//! CRC32 checksums for validation, with an option to skip validation
//! for modified or development ROMs.

use std::collections::HashMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// CRC-32 (private)
// ---------------------------------------------------------------------------

/// CRC-32 lookup table (reflected polynomial 0xEDB88320).
/// Same algorithm as MAME, ZIP, PNG, and Ethernet.
const CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i;
        let mut j = 0;
        while j < 8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ 0xEDB8_8320;
            } else {
                crc >>= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// Compute the CRC-32 checksum of a byte slice.
fn crc32(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        let index = ((crc ^ byte as u32) & 0xFF) as usize;
        crc = (crc >> 8) ^ CRC32_TABLE[index];
    }
    crc ^ 0xFFFF_FFFF
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors surfaced while assembling a ROM set, following spec.md §7's
/// startup error taxonomy.
#[derive(Debug)]
pub enum RomLoadError {
    /// Underlying I/O error (file not found, permission denied, etc.)
    Io(std::io::Error),

    /// A required ROM file was not found in the set under either its
    /// primary or alternate name.
    RomMissing(String),

    /// ROM file size does not match the expected size.
    RomSizeMismatch {
        file: String,
        expected: usize,
        actual: usize,
    },

    /// CRC32 checksum does not match the expected value.
    RomChecksumMismatch {
        file: String,
        expected: u32,
        actual: u32,
    },

    /// `rom_set` named something other than galaga/galagao/galagamw/galagamk.
    UnknownRomSet(String),
}

impl std::fmt::Display for RomLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::RomMissing(name) => write!(f, "missing ROM file: {name}"),
            Self::RomSizeMismatch {
                file,
                expected,
                actual,
            } => write!(f, "ROM {file}: expected {expected} bytes, got {actual}"),
            Self::RomChecksumMismatch {
                file,
                expected,
                actual,
            } => write!(
                f,
                "ROM {file}: CRC32 expected 0x{expected:08X}, got 0x{actual:08X}"
            ),
            Self::UnknownRomSet(name) => write!(f, "unknown ROM set: {name}"),
        }
    }
}

impl std::error::Error for RomLoadError {}

impl From<std::io::Error> for RomLoadError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// RomSet
// ---------------------------------------------------------------------------

/// A collection of ROM files loaded from disk, a ZIP archive, or
/// provided programmatically.
pub struct RomSet {
    files: HashMap<String, Vec<u8>>,
}

impl RomSet {
    /// Create a RomSet from a directory of extracted ROM files.
    ///
    /// Reads all files in the directory (non-recursive) and stores
    /// them by filename (without path).
    pub fn from_directory(path: &Path) -> Result<Self, RomLoadError> {
        let mut files = HashMap::new();
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            let file_path = entry.path();
            if file_path.is_file() {
                let name = file_path
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
                    .to_string();
                let data = std::fs::read(&file_path)?;
                files.insert(name, data);
            }
        }
        Ok(Self { files })
    }

    /// Create a RomSet from programmatic byte slices (for testing).
    ///
    /// Each entry is a (filename, data) pair.
    pub fn from_slices(entries: &[(&str, &[u8])]) -> Self {
        let mut files = HashMap::new();
        for (name, data) in entries {
            files.insert(name.to_string(), data.to_vec());
        }
        Self { files }
    }

    /// Create a RomSet from owned (name, data) pairs, e.g. extracted
    /// from a ZIP archive.
    pub fn from_entries(entries: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            files: entries.into_iter().collect(),
        }
    }

    /// Get a ROM file's data by name.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(|v| v.as_slice())
    }

    /// Get a ROM file's data by primary name, falling back to an
    /// alternate name if the primary is absent (spec.md §6: "Loading
    /// tries primary then alternate").
    pub fn require_named(
        &self,
        name: &str,
        alt_name: Option<&str>,
    ) -> Result<&[u8], RomLoadError> {
        if let Some(data) = self.get(name) {
            return Ok(data);
        }
        if let Some(alt) = alt_name
            && let Some(data) = self.get(alt)
        {
            return Ok(data);
        }
        Err(RomLoadError::RomMissing(name.to_string()))
    }

    /// List all file names in the set.
    pub fn file_names(&self) -> Vec<&str> {
        self.files.keys().map(|s| s.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// RomEntry / RomRegion
// ---------------------------------------------------------------------------

/// Describes how a single ROM file maps into a memory region.
pub struct RomEntry {
    /// Primary filename in the ROM set.
    pub name: &'static str,
    /// Alternate filename, tried if `name` is absent (different MAME
    /// ROM-set revisions sometimes rename the same physical chip).
    pub alt_name: Option<&'static str>,
    /// Expected size in bytes.
    pub size: usize,
    /// Offset within the target memory region where this ROM is loaded.
    pub offset: usize,
    /// Optional CRC32 checksum. `None` means no checksum is defined
    /// and the file is always accepted. `Some(value)` will be validated
    /// during [`RomRegion::load`].
    pub crc32: Option<u32>,
    /// Human-readable description, surfaced in diagnostics.
    pub description: &'static str,
}

/// Describes the complete ROM mapping for a subsystem (a CPU's code
/// ROM, the tile ROM, the color PROM, ...).
///
/// A region has a total size and a list of ROM entries that fill parts of it.
/// Call [`load`](Self::load) to assemble the region from a [`RomSet`],
/// or [`load_skip_checksums`](Self::load_skip_checksums) to skip CRC32
/// validation.
pub struct RomRegion {
    /// Total size of the memory region in bytes.
    pub size: usize,
    /// Individual ROM file entries.
    pub entries: &'static [RomEntry],
}

impl RomRegion {
    /// Load all ROM files into a contiguous byte array, validating sizes
    /// and CRC32 checksums.
    pub fn load(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        self.load_inner(rom_set, true)
    }

    /// Load all ROM files into a contiguous byte array, validating sizes
    /// only. CRC32 checksums are not checked; a mismatch is merely a
    /// candidate for the caller to log as a warning.
    pub fn load_skip_checksums(&self, rom_set: &RomSet) -> Result<Vec<u8>, RomLoadError> {
        self.load_inner(rom_set, false)
    }

    fn load_inner(
        &self,
        rom_set: &RomSet,
        verify_checksums: bool,
    ) -> Result<Vec<u8>, RomLoadError> {
        let mut region = vec![0u8; self.size];

        for entry in self.entries {
            debug_assert!(
                entry.offset + entry.size <= self.size,
                "RomEntry '{}' exceeds region bounds: offset {} + size {} > region size {}",
                entry.name,
                entry.offset,
                entry.size,
                self.size,
            );

            let data = rom_set.require_named(entry.name, entry.alt_name)?;
            if data.len() != entry.size {
                return Err(RomLoadError::RomSizeMismatch {
                    file: entry.name.to_string(),
                    expected: entry.size,
                    actual: data.len(),
                });
            }

            if verify_checksums && let Some(expected_crc) = entry.crc32 {
                let actual_crc = crc32(data);
                if actual_crc != expected_crc {
                    return Err(RomLoadError::RomChecksumMismatch {
                        file: entry.name.to_string(),
                        expected: expected_crc,
                        actual: actual_crc,
                    });
                }
            }

            region[entry.offset..entry.offset + entry.size].copy_from_slice(data);
        }

        Ok(region)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- CRC32 ---------------------------------------------------------------

    #[test]
    fn crc32_empty() {
        assert_eq!(crc32(&[]), 0x0000_0000);
    }

    #[test]
    fn crc32_canonical_123456789() {
        // Well-known test vector: CRC32("123456789") = 0xCBF43926
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn crc32_deterministic() {
        let data = [0xFF; 256];
        assert_eq!(crc32(&data), crc32(&data));
    }

    // -- RomSet --------------------------------------------------------------

    #[test]
    fn from_slices_creates_romset() {
        let rom_set = RomSet::from_slices(&[
            ("test1.rom", &[0x01, 0x02, 0x03]),
            ("test2.rom", &[0x04, 0x05]),
        ]);
        assert_eq!(rom_set.get("test1.rom"), Some(&[0x01, 0x02, 0x03][..]));
    }

    #[test]
    fn require_named_falls_back_to_alternate() {
        let rom_set = RomSet::from_slices(&[("3200b.1m", &[0xAA; 4])]);
        let data = rom_set.require_named("3200a.1m", Some("3200b.1m")).unwrap();
        assert_eq!(data, &[0xAA; 4]);
    }

    #[test]
    fn require_named_missing_both_returns_error() {
        let rom_set = RomSet::from_slices(&[]);
        let err = rom_set.require_named("a.rom", Some("b.rom")).unwrap_err();
        assert!(matches!(err, RomLoadError::RomMissing(_)));
    }

    // -- RomRegion::load -----------------------------------------------------

    #[test]
    fn load_single_rom_no_checksum() {
        static ENTRIES: [RomEntry; 1] = [RomEntry {
            name: "test.rom",
            alt_name: None,
            size: 4,
            offset: 0,
            crc32: None,
            description: "test",
        }];
        let region = RomRegion {
            size: 4,
            entries: &ENTRIES,
        };
        let rom_set = RomSet::from_slices(&[("test.rom", &[0xDE, 0xAD, 0xBE, 0xEF])]);
        let result = region.load(&rom_set).unwrap();
        assert_eq!(result, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn load_checksum_mismatch() {
        static ENTRIES: [RomEntry; 1] = [RomEntry {
            name: "test.rom",
            alt_name: None,
            size: 4,
            offset: 0,
            crc32: Some(0xDEAD_BEEF),
            description: "test",
        }];
        let region = RomRegion {
            size: 4,
            entries: &ENTRIES,
        };
        let rom_set = RomSet::from_slices(&[("test.rom", &[0x01, 0x02, 0x03, 0x04])]);
        let result = region.load(&rom_set);
        assert!(matches!(result, Err(RomLoadError::RomChecksumMismatch { .. })));
    }

    #[test]
    fn load_skip_checksums_ignores_mismatch() {
        static ENTRIES: [RomEntry; 1] = [RomEntry {
            name: "test.rom",
            alt_name: None,
            size: 4,
            offset: 0,
            crc32: Some(0xDEAD_BEEF),
            description: "test",
        }];
        let region = RomRegion {
            size: 4,
            entries: &ENTRIES,
        };
        let rom_set = RomSet::from_slices(&[("test.rom", &[0x01, 0x02, 0x03, 0x04])]);
        let result = region.load_skip_checksums(&rom_set);
        assert!(result.is_ok());
    }

    #[test]
    fn load_multiple_roms_at_offsets() {
        static ENTRIES: [RomEntry; 3] = [
            RomEntry {
                name: "rom1.bin",
                alt_name: None,
                size: 8,
                offset: 0,
                crc32: None,
                description: "a",
            },
            RomEntry {
                name: "rom2.bin",
                alt_name: None,
                size: 8,
                offset: 8,
                crc32: None,
                description: "b",
            },
            RomEntry {
                name: "rom3.bin",
                alt_name: None,
                size: 8,
                offset: 16,
                crc32: None,
                description: "c",
            },
        ];
        let region = RomRegion {
            size: 24,
            entries: &ENTRIES,
        };
        let rom_set = RomSet::from_slices(&[
            ("rom1.bin", &[0x11; 8]),
            ("rom2.bin", &[0x22; 8]),
            ("rom3.bin", &[0x33; 8]),
        ]);
        let loaded = region.load(&rom_set).unwrap();
        assert_eq!(loaded.len(), 24);
        assert!(loaded[..8].iter().all(|&b| b == 0x11));
        assert!(loaded[8..16].iter().all(|&b| b == 0x22));
        assert!(loaded[16..24].iter().all(|&b| b == 0x33));
    }

    #[test]
    fn load_missing_file_in_region() {
        static ENTRIES: [RomEntry; 1] = [RomEntry {
            name: "rom1.bin",
            alt_name: None,
            size: 8,
            offset: 0,
            crc32: None,
            description: "a",
        }];
        let region = RomRegion {
            size: 8,
            entries: &ENTRIES,
        };
        let rom_set = RomSet::from_slices(&[]);
        let result = region.load(&rom_set);
        assert!(matches!(result, Err(RomLoadError::RomMissing(_))));
    }

    #[test]
    fn from_directory_loads_files() {
        let dir = std::env::temp_dir().join("galaga_rom_loader_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("test.rom"), [0xAA, 0xBB]).unwrap();

        let rom_set = RomSet::from_directory(&dir).unwrap();
        assert_eq!(rom_set.get("test.rom"), Some(&[0xAA, 0xBB][..]));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
