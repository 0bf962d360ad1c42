//! Compound-file binary format constants.

/// Magic bytes at the beginning of every compound file.
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Minimal size of an empty compound file with 512-byte sectors.
pub const MINIMAL_CONTAINER_SIZE: usize = 1536;

/// Size of a directory entry in bytes.
pub const DIRENTRY_SIZE: usize = 128;

/// Number of DIFAT slots stored directly in the header.
pub const HEADER_DIFAT_SLOTS: usize = 109;

// Sector sentinels
/// Denotes a DIFAT sector in a FAT
pub const DIFSECT: u32 = 0xFFFFFFFC;
/// Denotes a FAT sector in a FAT
pub const FATSECT: u32 = 0xFFFFFFFD;
/// End of a sector chain
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE;
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFFFFFF;

// Directory entry sentinels
/// Unallocated directory entry reference
pub const NOSTREAM: u32 = 0xFFFFFFFF;

// Object types in storage
/// Element is a storage object
pub const STGTY_STORAGE: u8 = 1;
/// Element is a stream object
pub const STGTY_STREAM: u8 = 2;
/// Element is a root storage
pub const STGTY_ROOT: u8 = 5;

// Property types used by the summary-information reader
pub const VT_BSTR: u16 = 8;
pub const VT_LPSTR: u16 = 30;
pub const VT_LPWSTR: u16 = 31;
pub const VT_FILETIME: u16 = 64;
