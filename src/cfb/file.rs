//! Compound-file container reader.
//!
//! Binary HWP documents live inside an OLE2 structured-storage container: a
//! 512-byte header, a file allocation table (FAT) mapping each sector to the
//! next one in its chain, a directory of named entries organized as a
//! red-black tree, and a mini-FAT for streams below the cutoff size. This
//! reader parses the whole directory up front into a flat path index and
//! materializes stream bytes on demand. It never decompresses anything.

use std::collections::HashMap;

use super::consts::*;
use crate::error::{Error, Result};

/// One stream's location inside the container.
#[derive(Debug, Clone)]
struct StreamEntry {
    start_sector: u32,
    size: u64,
    in_mini_stream: bool,
}

/// A parsed directory entry (stream or storage).
#[derive(Debug, Clone)]
struct DirEntry {
    name: String,
    entry_type: u8,
    sid_left: u32,
    sid_right: u32,
    sid_child: u32,
    start_sector: u32,
    size: u64,
}

/// An opened compound file.
///
/// Owns the raw container bytes for the lifetime of the parse; all stream
/// reads borrow from or copy out of this buffer.
#[derive(Debug)]
pub struct CompoundFile {
    data: Vec<u8>,
    sector_size: usize,
    mini_sector_size: usize,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    ministream: Vec<u8>,
    index: HashMap<String, StreamEntry>,
}

impl CompoundFile {
    /// Open a compound file from fully resident bytes.
    ///
    /// Validates the header, loads the FAT and mini-FAT, and flattens the
    /// directory tree into a stream-path index. Fails with
    /// [`Error::InvalidContainer`] on signature/header problems and
    /// [`Error::CorruptDirectory`] on inconsistent directory or FAT state.
    pub fn open(data: Vec<u8>) -> Result<Self> {
        if data.len() < MINIMAL_CONTAINER_SIZE {
            return Err(Error::InvalidContainer(format!(
                "container is {} bytes, minimum is {}",
                data.len(),
                MINIMAL_CONTAINER_SIZE
            )));
        }
        if &data[0..8] != MAGIC {
            return Err(Error::InvalidContainer(
                "signature does not match compound file magic".to_string(),
            ));
        }

        let byte_order = read_u16(&data, 0x1C);
        if byte_order != 0xFFFE {
            return Err(Error::InvalidContainer(format!(
                "unexpected byte-order marker 0x{byte_order:04X}"
            )));
        }

        let sector_shift = read_u16(&data, 0x1E);
        if sector_shift != 9 && sector_shift != 12 {
            return Err(Error::InvalidContainer(format!(
                "unsupported sector shift {sector_shift}"
            )));
        }
        let sector_size = 1usize << sector_shift;
        let mini_sector_size = 1usize << read_u16(&data, 0x20);

        let first_dir_sector = read_u32(&data, 0x30);
        let mini_stream_cutoff = read_u32(&data, 0x38);
        let first_minifat_sector = read_u32(&data, 0x3C);
        let num_minifat_sectors = read_u32(&data, 0x40);
        let first_difat_sector = read_u32(&data, 0x44);
        let num_difat_sectors = read_u32(&data, 0x48);

        let mut file = CompoundFile {
            data,
            sector_size,
            mini_sector_size,
            fat: Vec::new(),
            minifat: Vec::new(),
            ministream: Vec::new(),
            index: HashMap::new(),
        };

        file.load_fat(first_difat_sector, num_difat_sectors)?;

        let dir_data = file.read_chain(first_dir_sector)?;
        let entries = parse_directory(&dir_data)?;
        let root = entries
            .first()
            .and_then(|e| e.as_ref())
            .filter(|e| e.entry_type == STGTY_ROOT)
            .ok_or_else(|| Error::CorruptDirectory("missing root entry".to_string()))?
            .clone();

        if num_minifat_sectors > 0 {
            let minifat_data = file.read_chain(first_minifat_sector)?;
            file.minifat = minifat_data
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            let mut ministream = file.read_chain(root.start_sector)?;
            ministream.truncate(root.size as usize);
            file.ministream = ministream;
        }

        file.build_index(&entries, root.sid_child, mini_stream_cutoff)?;

        Ok(file)
    }

    /// Read a stream's bytes by its full path (e.g. `BodyText/Section0`).
    ///
    /// Fails with [`Error::MissingStream`] if the path is not in the index.
    pub fn read_stream(&self, path: &str) -> Result<Vec<u8>> {
        let entry = self
            .index
            .get(path)
            .ok_or_else(|| Error::MissingStream(path.to_string()))?;

        if entry.in_mini_stream {
            self.read_mini_chain(entry.start_sector, entry.size)
        } else {
            let mut data = self.read_chain(entry.start_sector)?;
            data.truncate(entry.size as usize);
            Ok(data)
        }
    }

    /// Check whether a stream exists.
    pub fn exists(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Enumerate all stream paths, sorted.
    pub fn list_streams(&self) -> Vec<String> {
        let mut names: Vec<String> = self.index.keys().cloned().collect();
        names.sort();
        names
    }

    /// Total size of the container in bytes.
    pub fn container_size(&self) -> usize {
        self.data.len()
    }

    /// Load the FAT from the header DIFAT slots plus the DIFAT sector chain.
    fn load_fat(&mut self, first_difat_sector: u32, num_difat_sectors: u32) -> Result<()> {
        let mut fat_sectors = Vec::new();
        for i in 0..HEADER_DIFAT_SLOTS {
            let sector = read_u32(&self.data, 0x4C + i * 4);
            if sector == FREESECT || sector == ENDOFCHAIN {
                break;
            }
            fat_sectors.push(sector);
        }

        let entries_per_difat = self.sector_size / 4 - 1;
        let mut difat_sector = first_difat_sector;
        for _ in 0..num_difat_sectors {
            if difat_sector == ENDOFCHAIN || difat_sector == FREESECT {
                break;
            }
            let sector_data = self.sector(difat_sector)?.to_vec();
            for i in 0..entries_per_difat {
                let sector = u32::from_le_bytes([
                    sector_data[i * 4],
                    sector_data[i * 4 + 1],
                    sector_data[i * 4 + 2],
                    sector_data[i * 4 + 3],
                ]);
                if sector == FREESECT || sector == ENDOFCHAIN {
                    break;
                }
                fat_sectors.push(sector);
            }
            let next = entries_per_difat * 4;
            difat_sector = u32::from_le_bytes([
                sector_data[next],
                sector_data[next + 1],
                sector_data[next + 2],
                sector_data[next + 3],
            ]);
        }

        let entries_per_sector = self.sector_size / 4;
        self.fat.reserve(fat_sectors.len() * entries_per_sector);
        for &sector_id in &fat_sectors {
            let entries: Vec<u32> = self
                .sector(sector_id)?
                .chunks_exact(4)
                .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            self.fat.extend(entries);
        }

        Ok(())
    }

    /// Borrow one sector's bytes, bounds-checked against the container.
    fn sector(&self, sector_id: u32) -> Result<&[u8]> {
        let position = (sector_id as usize + 1) * self.sector_size;
        let end = position + self.sector_size;
        if end > self.data.len() {
            return Err(Error::CorruptDirectory(format!(
                "sector {sector_id} extends to byte {end}, container is {} bytes",
                self.data.len()
            )));
        }
        Ok(&self.data[position..end])
    }

    /// Read a stream by following its FAT chain.
    fn read_chain(&self, start_sector: u32) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN {
            if sector == FREESECT || sector == FATSECT || sector == DIFSECT {
                return Err(Error::CorruptDirectory(format!(
                    "chain references reserved sector 0x{sector:08X}"
                )));
            }
            if sector as usize >= self.fat.len() {
                return Err(Error::CorruptDirectory(format!(
                    "chain references sector {sector} outside the FAT ({} entries)",
                    self.fat.len()
                )));
            }
            if steps > self.fat.len() {
                return Err(Error::CorruptDirectory("FAT chain cycle".to_string()));
            }
            data.extend_from_slice(self.sector(sector)?);
            sector = self.fat[sector as usize];
            steps += 1;
        }

        Ok(data)
    }

    /// Read a small stream by following its mini-FAT chain through the
    /// root entry's mini stream.
    fn read_mini_chain(&self, start_sector: u32, size: u64) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut steps = 0usize;

        while sector != ENDOFCHAIN {
            if sector as usize >= self.minifat.len() {
                return Err(Error::CorruptDirectory(format!(
                    "chain references mini sector {sector} outside the mini-FAT ({} entries)",
                    self.minifat.len()
                )));
            }
            if steps > self.minifat.len() {
                return Err(Error::CorruptDirectory("mini-FAT chain cycle".to_string()));
            }
            let position = sector as usize * self.mini_sector_size;
            let end = position + self.mini_sector_size;
            if end > self.ministream.len() {
                return Err(Error::CorruptDirectory(format!(
                    "mini sector {sector} extends past the mini stream"
                )));
            }
            data.extend_from_slice(&self.ministream[position..end]);
            sector = self.minifat[sector as usize];
            steps += 1;
        }

        data.truncate(size as usize);
        Ok(data)
    }

    /// Flatten the directory red-black tree into a path index.
    fn build_index(
        &mut self,
        entries: &[Option<DirEntry>],
        root_child: u32,
        mini_stream_cutoff: u32,
    ) -> Result<()> {
        let mut visited = vec![false; entries.len()];
        let mut index = HashMap::new();
        self.walk_directory(
            entries,
            root_child,
            "",
            mini_stream_cutoff,
            &mut visited,
            &mut index,
        )?;
        self.index = index;
        Ok(())
    }

    fn walk_directory(
        &self,
        entries: &[Option<DirEntry>],
        sid: u32,
        prefix: &str,
        cutoff: u32,
        visited: &mut [bool],
        index: &mut HashMap<String, StreamEntry>,
    ) -> Result<()> {
        if sid == NOSTREAM {
            return Ok(());
        }
        let i = sid as usize;
        if i >= entries.len() {
            return Err(Error::CorruptDirectory(format!(
                "directory references entry {sid}, table has {}",
                entries.len()
            )));
        }
        if visited[i] {
            return Err(Error::CorruptDirectory(
                "cycle in directory tree".to_string(),
            ));
        }
        visited[i] = true;

        let entry = match &entries[i] {
            Some(e) => e,
            None => return Ok(()),
        };

        self.walk_directory(entries, entry.sid_left, prefix, cutoff, visited, index)?;
        self.walk_directory(entries, entry.sid_right, prefix, cutoff, visited, index)?;

        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{}/{}", prefix, entry.name)
        };

        match entry.entry_type {
            STGTY_STREAM => {
                if entry.size > self.data.len() as u64 {
                    return Err(Error::CorruptDirectory(format!(
                        "stream {} claims {} bytes, container is {}",
                        path,
                        entry.size,
                        self.data.len()
                    )));
                }
                index.insert(
                    path,
                    StreamEntry {
                        start_sector: entry.start_sector,
                        size: entry.size,
                        in_mini_stream: entry.size < cutoff as u64,
                    },
                );
            }
            STGTY_STORAGE => {
                self.walk_directory(entries, entry.sid_child, &path, cutoff, visited, index)?;
            }
            _ => {}
        }

        Ok(())
    }
}

/// Parse the raw directory stream into entries. Unallocated slots become
/// `None`.
fn parse_directory(dir_data: &[u8]) -> Result<Vec<Option<DirEntry>>> {
    if dir_data.len() < DIRENTRY_SIZE {
        return Err(Error::CorruptDirectory(
            "directory stream shorter than one entry".to_string(),
        ));
    }

    let mut entries = Vec::with_capacity(dir_data.len() / DIRENTRY_SIZE);
    for raw in dir_data.chunks_exact(DIRENTRY_SIZE) {
        let entry_type = raw[66];
        if entry_type == 0 {
            entries.push(None);
            continue;
        }

        let name_len = read_u16(raw, 64) as usize;
        if name_len > 64 || name_len % 2 != 0 {
            return Err(Error::CorruptDirectory(format!(
                "directory entry declares name length {name_len}"
            )));
        }
        let name = decode_utf16le(&raw[..name_len.saturating_sub(2)]);

        entries.push(Some(DirEntry {
            name,
            entry_type,
            sid_left: read_u32(raw, 68),
            sid_right: read_u32(raw, 72),
            sid_child: read_u32(raw, 76),
            start_sector: read_u32(raw, 116),
            // 512-byte-sector files only define the low 32 bits of the size
            size: read_u32(raw, 120) as u64,
        }));
    }

    Ok(entries)
}

/// Decode UTF-16LE bytes to a String, dropping trailing NULs.
fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
