//! Image codec
//!
//! Encoding and decoding of the full engine state.

use bytes::{Buf, BufMut, BytesMut};

use crate::alloc::BlockAllocator;
use crate::config::Config;
use crate::engine::StorageEngine;
use crate::error::{FsError, Result};
use crate::index::{IndexNode, NameIndex};
use crate::table::{FileName, FileTable, NAME_FIELD_LEN};

use super::{ImageHeader, HEADER_SIZE, NONE_MARKER};

/// Trailer size: CRC32 (4)
const TRAILER_SIZE: usize = 4;

/// Encoded size of one index node: Name + Slot (4) + Next (4)
const NODE_SIZE: usize = NAME_FIELD_LEN + 8;

// =============================================================================
// Layout
// =============================================================================

/// Encoded size of one table slot
fn record_size(config: &Config) -> Option<usize> {
    let blocks = config.max_file_blocks.checked_mul(4)?;
    let data = config.max_file_blocks.checked_mul(config.block_size)?;
    (NAME_FIELD_LEN + 8).checked_add(blocks)?.checked_add(data)
}

/// Offset of the node count field
fn node_count_offset(config: &Config) -> Option<usize> {
    let table = config.max_files.checked_mul(record_size(config)?)?;
    let bitmap = config.max_blocks.checked_mul(4)?;
    HEADER_SIZE.checked_add(table)?.checked_add(4)?.checked_add(bitmap)
}

/// Total image size for `config` holding `node_count` index nodes
pub fn image_size(config: &Config, node_count: usize) -> Option<usize> {
    let nodes = node_count.checked_mul(NODE_SIZE)?;
    let buckets = config.hashmap_size.checked_mul(4)?;
    node_count_offset(config)?
        .checked_add(4)?
        .checked_add(nodes)?
        .checked_add(buckets)?
        .checked_add(TRAILER_SIZE)
}

fn none_or(value: Option<u32>) -> u32 {
    value.unwrap_or(NONE_MARKER)
}

fn some_unless_none(raw: u32) -> Option<u32> {
    (raw != NONE_MARKER).then_some(raw)
}

// =============================================================================
// Encoding
// =============================================================================

/// Serialize `engine` into a self-describing image
pub fn encode(engine: &StorageEngine) -> Result<Vec<u8>> {
    let config = engine.config();
    let index = engine.index();
    let capacity = image_size(config, index.allocated()).unwrap_or(0);
    let mut buf = BytesMut::with_capacity(capacity);

    // Header: fixed-width serde struct, so the bincode output is always 34 bytes
    buf.put_slice(&ImageHeader::for_config(config).encode()?);

    // File table, vacant slots included
    for record in engine.table().slots() {
        buf.put_slice(record.name().field());
        buf.put_u32_le(record.size() as u32);
        buf.put_u32_le(record.block_count() as u32);
        for i in 0..config.max_file_blocks {
            buf.put_u32_le(record.blocks().get(i).copied().unwrap_or(0));
        }
        buf.put_slice(record.buffer());
    }
    buf.put_u32_le(engine.file_count() as u32);

    // Bitmap
    let allocator = engine.allocator();
    for block in 0..config.max_blocks {
        buf.put_u32_le(allocator.is_used(block as u32) as u32);
    }

    // Index arena, truncated to the allocated nodes
    buf.put_u32_le(index.allocated() as u32);
    for node in index.nodes() {
        buf.put_slice(node.key.field());
        buf.put_u32_le(none_or(node.slot));
        buf.put_u32_le(none_or(node.next));
    }

    // Bucket heads
    for &head in index.buckets() {
        buf.put_u32_le(none_or(head));
    }

    let crc = crc32fast::hash(&buf);
    buf.put_u32_le(crc);

    Ok(buf.to_vec())
}

// =============================================================================
// Decoding
// =============================================================================

/// Rebuild an engine from an image
///
/// Every length, index and cross-reference is checked; nothing is trusted.
pub fn decode(bytes: &[u8]) -> Result<StorageEngine> {
    // Step 1: Header and geometry
    let header = ImageHeader::decode(bytes)?;
    let config = header.to_config()?;

    let node_offset = node_count_offset(&config)
        .ok_or_else(|| FsError::CorruptImage("geometry overflows".to_string()))?;
    let min_size = image_size(&config, 0)
        .ok_or_else(|| FsError::CorruptImage("geometry overflows".to_string()))?;
    if bytes.len() < min_size {
        return Err(FsError::CorruptImage(format!(
            "image is {} bytes, geometry needs at least {}",
            bytes.len(),
            min_size
        )));
    }

    // Step 2: Exact length for the declared node count, then checksum
    let node_count = (&bytes[node_offset..node_offset + 4]).get_u32_le() as usize;
    if node_count > config.max_index_nodes {
        return Err(FsError::CorruptImage(format!(
            "node count {} exceeds arena capacity {}",
            node_count, config.max_index_nodes
        )));
    }

    let expected = image_size(&config, node_count)
        .ok_or_else(|| FsError::CorruptImage("geometry overflows".to_string()))?;
    if bytes.len() != expected {
        return Err(FsError::CorruptImage(format!(
            "image is {} bytes, expected {} for {} nodes",
            bytes.len(),
            expected,
            node_count
        )));
    }

    let (body, trailer) = bytes.split_at(bytes.len() - TRAILER_SIZE);
    let stored_crc = (&trailer[..]).get_u32_le();
    let actual_crc = crc32fast::hash(body);
    if stored_crc != actual_crc {
        return Err(FsError::CorruptImage(format!(
            "checksum mismatch: stored {:08x}, computed {:08x}",
            stored_crc, actual_crc
        )));
    }

    // Step 3: Sections (lengths are verified, so the Buf reads cannot underflow)
    let mut buf = &body[HEADER_SIZE..];
    let table = decode_table(&mut buf, &config)?;
    let allocator = decode_bitmap(&mut buf, &config)?;

    let _ = buf.get_u32_le(); // node count, already read
    let nodes = decode_nodes(&mut buf, &config, node_count, table.len())?;

    let buckets: Vec<Option<u32>> = (0..config.hashmap_size)
        .map(|_| some_unless_none(buf.get_u32_le()))
        .collect();

    let index = NameIndex::from_parts(buckets, nodes, config.max_index_nodes)?;

    // Step 4: Cross-check everything
    StorageEngine::from_parts(config, allocator, table, index)
}

/// Next name field, `None` if malformed or longer than `max_len`
fn read_name(buf: &mut &[u8], max_len: usize) -> Option<FileName> {
    let mut field = [0u8; NAME_FIELD_LEN];
    buf.copy_to_slice(&mut field);
    FileName::from_field(&field).filter(|name| name.len() <= max_len)
}

fn decode_table(buf: &mut &[u8], config: &Config) -> Result<FileTable> {
    let mut table = FileTable::new(config.max_files, config.max_file_blocks, config.block_size);
    let max_size = config.max_file_size();

    for slot in 0..config.max_files {
        let name = read_name(buf, config.max_name_len)
            .ok_or_else(|| FsError::CorruptImage(format!("slot {} has a malformed name", slot)))?;
        let size = buf.get_u32_le() as usize;
        let block_count = buf.get_u32_le() as usize;

        let mut blocks = Vec::with_capacity(config.max_file_blocks);
        for _ in 0..config.max_file_blocks {
            blocks.push(buf.get_u32_le());
        }

        if size > max_size || block_count > config.max_file_blocks {
            return Err(FsError::CorruptImage(format!(
                "slot {} declares {} bytes in {} blocks",
                slot, size, block_count
            )));
        }

        let record = table
            .slot_mut(slot)
            .ok_or_else(|| FsError::CorruptImage(format!("slot {} out of range", slot)))?;
        record.fill(name, size, &blocks[..block_count]);
        buf.copy_to_slice(record.buffer_mut());
    }

    let active = buf.get_u32_le() as usize;
    if active > config.max_files {
        return Err(FsError::CorruptImage(format!(
            "active file count {} exceeds {} slots",
            active, config.max_files
        )));
    }

    // Inactive slots must be fully vacant
    for (slot, record) in table.slots().iter().enumerate().skip(active) {
        let clean = record.is_vacant()
            && record.size() == 0
            && record.block_count() == 0
            && record.buffer().iter().all(|&b| b == 0);
        if !clean {
            return Err(FsError::CorruptImage(format!(
                "inactive slot {} holds data",
                slot
            )));
        }
    }

    table.set_len(active);
    Ok(table)
}

fn decode_bitmap(buf: &mut &[u8], config: &Config) -> Result<BlockAllocator> {
    let mut allocator = BlockAllocator::new(config.max_blocks);

    for block in 0..config.max_blocks {
        match buf.get_u32_le() {
            0 => {}
            1 => allocator.mark_used(block as u32),
            other => {
                return Err(FsError::CorruptImage(format!(
                    "bitmap entry {} is {}, expected 0 or 1",
                    block, other
                )))
            }
        }
    }

    Ok(allocator)
}

fn decode_nodes(
    buf: &mut &[u8],
    config: &Config,
    count: usize,
    active: usize,
) -> Result<Vec<IndexNode>> {
    let mut nodes = Vec::with_capacity(count);

    for i in 0..count {
        let key = read_name(buf, config.max_name_len)
            .ok_or_else(|| FsError::CorruptImage(format!("node {} has a malformed name", i)))?;
        let slot = some_unless_none(buf.get_u32_le());
        let next = some_unless_none(buf.get_u32_le());

        if let Some(slot) = slot {
            if slot as usize >= active {
                return Err(FsError::CorruptImage(format!(
                    "node {} points at slot {}, only {} active",
                    i, slot, active
                )));
            }
        }

        nodes.push(IndexNode { key, slot, next });
    }

    Ok(nodes)
}
