//! Shared fixture builders: a minimal compound-file writer and HWP record
//! encoders, so integration tests construct real containers byte by byte.

#![allow(dead_code)]

use std::io::Write;

use flate2::write::DeflateEncoder;
use flate2::Compression;

pub const SECTOR: usize = 512;
pub const ENDOFCHAIN: u32 = 0xFFFFFFFE;
pub const FREESECT: u32 = 0xFFFFFFFF;
pub const FATSECT: u32 = 0xFFFFFFFD;
pub const NOSTREAM: u32 = 0xFFFFFFFF;

/// Raw-deflate bytes the way HWP compresses body streams.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Encode one record header + payload (compact or extended form).
pub fn encode_record(tag_id: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let size = payload.len() as u32;
    if size < 0xFFF {
        let word = (tag_id as u32 & 0x3FF) | ((level as u32 & 0x3FF) << 10) | (size << 20);
        out.extend_from_slice(&word.to_le_bytes());
    } else {
        let word = (tag_id as u32 & 0x3FF) | ((level as u32 & 0x3FF) << 10) | (0xFFFu32 << 20);
        out.extend_from_slice(&word.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

/// UTF-16LE text for a PARA_TEXT payload.
pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// A PARA_HEADER payload referencing a paragraph shape.
pub fn para_header_payload(para_shape_id: u16) -> Vec<u8> {
    let mut payload = vec![0u8; 22];
    payload[8..10].copy_from_slice(&para_shape_id.to_le_bytes());
    payload
}

/// A CHAR_SHAPE record payload: base size in 1/100 pt plus property bits.
pub fn char_shape_payload(base_size: i32, property: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 72];
    payload[42..46].copy_from_slice(&base_size.to_le_bytes());
    payload[46..50].copy_from_slice(&property.to_le_bytes());
    payload
}

/// A PARA_SHAPE record payload from its first property word.
pub fn para_shape_payload(property: u32) -> Vec<u8> {
    let mut payload = vec![0u8; 54];
    payload[0..4].copy_from_slice(&property.to_le_bytes());
    payload
}

/// The 256-byte FileHeader stream.
pub fn file_header(major_version: u8, properties: u32) -> Vec<u8> {
    let mut data = vec![0u8; 256];
    data[..17].copy_from_slice(b"HWP Document File");
    data[32] = 0; // revision
    data[33] = 3; // build
    data[34] = 0; // minor
    data[35] = major_version;
    data[36..40].copy_from_slice(&properties.to_le_bytes());
    data
}

/// Assemble a binary HWP container. Body streams are deflated when the
/// compressed flag is set, matching what the FileHeader declares.
pub fn build_hwp(compressed: bool, doc_info: &[u8], sections: &[Vec<u8>]) -> Vec<u8> {
    let properties = if compressed { 0b1 } else { 0 };
    let mut builder = CfbBuilder::new()
        .stream("FileHeader", &file_header(5, properties))
        .stream(
            "DocInfo",
            &if compressed {
                deflate(doc_info)
            } else {
                doc_info.to_vec()
            },
        );
    for (i, section) in sections.iter().enumerate() {
        let data = if compressed {
            deflate(section)
        } else {
            section.clone()
        };
        builder = builder.stream(&format!("BodyText/Section{i}"), &data);
    }
    builder.build()
}

/// A one-level-deep compound-file writer: 512-byte sectors, FAT streams
/// only (the mini-stream cutoff is written as zero so every stream chains
/// through the main FAT).
pub struct CfbBuilder {
    streams: Vec<(String, Vec<u8>)>,
}

struct Entry {
    name: String,
    entry_type: u8,
    left: u32,
    right: u32,
    child: u32,
    start: u32,
    size: u32,
}

impl CfbBuilder {
    pub fn new() -> Self {
        Self {
            streams: Vec::new(),
        }
    }

    pub fn stream(mut self, path: &str, data: &[u8]) -> Self {
        self.streams.push((path.to_string(), data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        // group paths one storage level deep
        enum Top {
            Stream(usize),
            Storage(String, Vec<usize>),
        }
        let mut tops: Vec<Top> = Vec::new();
        for (i, (path, _)) in self.streams.iter().enumerate() {
            match path.split_once('/') {
                None => tops.push(Top::Stream(i)),
                Some((dir, _)) => {
                    let existing = tops
                        .iter()
                        .position(|t| matches!(t, Top::Storage(name, _) if name == dir));
                    match existing {
                        Some(pos) => {
                            if let Top::Storage(_, children) = &mut tops[pos] {
                                children.push(i);
                            }
                        }
                        None => tops.push(Top::Storage(dir.to_string(), vec![i])),
                    }
                }
            }
        }

        // assign data sectors sequentially per stream
        let mut next_sector = 0u32;
        let mut starts = vec![ENDOFCHAIN; self.streams.len()];
        let mut sector_counts = vec![0u32; self.streams.len()];
        for (i, (_, data)) in self.streams.iter().enumerate() {
            let count = data.len().div_ceil(SECTOR) as u32;
            if count > 0 {
                starts[i] = next_sector;
                sector_counts[i] = count;
                next_sector += count;
            }
        }
        let data_sectors = next_sector;

        // directory entries: root, then tops, then storage children
        let mut entries = vec![Entry {
            name: "Root Entry".to_string(),
            entry_type: 5,
            left: NOSTREAM,
            right: NOSTREAM,
            child: NOSTREAM,
            start: ENDOFCHAIN,
            size: 0,
        }];

        let leaf_name = |i: usize| -> String {
            let path = &self.streams[i].0;
            path.split_once('/').map(|(_, n)| n).unwrap_or(path).to_string()
        };

        let mut top_sids = Vec::new();
        let mut storage_children: Vec<(usize, Vec<usize>)> = Vec::new();
        for top in &tops {
            let sid = entries.len();
            top_sids.push(sid as u32);
            match top {
                Top::Stream(i) => entries.push(Entry {
                    name: leaf_name(*i),
                    entry_type: 2,
                    left: NOSTREAM,
                    right: NOSTREAM,
                    child: NOSTREAM,
                    start: starts[*i],
                    size: self.streams[*i].1.len() as u32,
                }),
                Top::Storage(name, children) => {
                    entries.push(Entry {
                        name: name.clone(),
                        entry_type: 1,
                        left: NOSTREAM,
                        right: NOSTREAM,
                        child: NOSTREAM,
                        start: 0,
                        size: 0,
                    });
                    storage_children.push((sid, children.clone()));
                }
            }
        }
        for (storage_sid, children) in &storage_children {
            let mut child_sids = Vec::new();
            for &i in children {
                let sid = entries.len();
                child_sids.push(sid as u32);
                entries.push(Entry {
                    name: leaf_name(i),
                    entry_type: 2,
                    left: NOSTREAM,
                    right: NOSTREAM,
                    child: NOSTREAM,
                    start: starts[i],
                    size: self.streams[i].1.len() as u32,
                });
            }
            entries[*storage_sid].child = child_sids[0];
            for pair in child_sids.windows(2) {
                entries[pair[0] as usize].right = pair[1];
            }
        }
        if let Some(&first) = top_sids.first() {
            entries[0].child = first;
        }
        for pair in top_sids.windows(2) {
            entries[pair[0] as usize].right = pair[1];
        }

        // serialize the directory, padded to whole sectors
        let mut dir_data = Vec::new();
        for entry in &entries {
            dir_data.extend_from_slice(&serialize_entry(entry));
        }
        while dir_data.len() % SECTOR != 0 {
            dir_data.push(0);
        }
        let dir_sectors = (dir_data.len() / SECTOR) as u32;
        let dir_start = data_sectors;

        // FAT sectors come last; solve for how many are needed
        let entries_per_fat = (SECTOR / 4) as u32;
        let mut fat_sectors = 1u32;
        while (data_sectors + dir_sectors + fat_sectors).div_ceil(entries_per_fat) > fat_sectors {
            fat_sectors += 1;
        }
        let fat_start = data_sectors + dir_sectors;
        let total_sectors = fat_start + fat_sectors;

        // FAT table: stream chains, directory chain, FAT self-marks
        let mut fat = vec![FREESECT; (fat_sectors * entries_per_fat) as usize];
        for (i, &count) in sector_counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let start = starts[i];
            for j in 0..count {
                fat[(start + j) as usize] = if j + 1 == count {
                    ENDOFCHAIN
                } else {
                    start + j + 1
                };
            }
        }
        for j in 0..dir_sectors {
            fat[(dir_start + j) as usize] = if j + 1 == dir_sectors {
                ENDOFCHAIN
            } else {
                dir_start + j + 1
            };
        }
        for j in 0..fat_sectors {
            fat[(fat_start + j) as usize] = FATSECT;
        }

        // header
        let mut header = vec![0u8; SECTOR];
        header[0..8].copy_from_slice(b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1");
        header[0x18..0x1A].copy_from_slice(&0x003Eu16.to_le_bytes()); // minor version
        header[0x1A..0x1C].copy_from_slice(&0x0003u16.to_le_bytes()); // major version
        header[0x1C..0x1E].copy_from_slice(&0xFFFEu16.to_le_bytes()); // byte order
        header[0x1E..0x20].copy_from_slice(&9u16.to_le_bytes()); // sector shift
        header[0x20..0x22].copy_from_slice(&6u16.to_le_bytes()); // mini sector shift
        header[0x2C..0x30].copy_from_slice(&fat_sectors.to_le_bytes());
        header[0x30..0x34].copy_from_slice(&dir_start.to_le_bytes());
        // mini stream cutoff 0: everything chains through the main FAT
        header[0x38..0x3C].copy_from_slice(&0u32.to_le_bytes());
        header[0x3C..0x40].copy_from_slice(&ENDOFCHAIN.to_le_bytes());
        header[0x40..0x44].copy_from_slice(&0u32.to_le_bytes());
        header[0x44..0x48].copy_from_slice(&ENDOFCHAIN.to_le_bytes());
        header[0x48..0x4C].copy_from_slice(&0u32.to_le_bytes());
        for slot in 0..109u32 {
            let offset = 0x4C + slot as usize * 4;
            let value = if slot < fat_sectors {
                fat_start + slot
            } else {
                FREESECT
            };
            header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }

        // assemble: header, stream data, directory, FAT
        let mut out = header;
        for (_, data) in &self.streams {
            out.extend_from_slice(data);
            while out.len() % SECTOR != 0 {
                out.push(0);
            }
        }
        out.extend_from_slice(&dir_data);
        for value in &fat {
            out.extend_from_slice(&value.to_le_bytes());
        }

        assert_eq!(out.len(), SECTOR + total_sectors as usize * SECTOR);
        out
    }
}

impl Default for CfbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_entry(entry: &Entry) -> [u8; 128] {
    let mut raw = [0u8; 128];
    let units: Vec<u16> = entry.name.encode_utf16().collect();
    assert!(units.len() <= 31, "entry name too long for fixture");
    for (i, u) in units.iter().enumerate() {
        raw[i * 2..i * 2 + 2].copy_from_slice(&u.to_le_bytes());
    }
    let name_len = ((units.len() + 1) * 2) as u16;
    raw[64..66].copy_from_slice(&name_len.to_le_bytes());
    raw[66] = entry.entry_type;
    raw[67] = 1; // black
    raw[68..72].copy_from_slice(&entry.left.to_le_bytes());
    raw[72..76].copy_from_slice(&entry.right.to_le_bytes());
    raw[76..80].copy_from_slice(&entry.child.to_le_bytes());
    raw[116..120].copy_from_slice(&entry.start.to_le_bytes());
    raw[120..124].copy_from_slice(&entry.size.to_le_bytes());
    raw
}
