//! Generic table reader.
//!
//! Owns the table bytes, validates the headers and resolves pooled values.
//! Record fields hold pool offsets counted in 16-bit units from the pool
//! base, while header fields hold byte offsets from the start of the file;
//! the two are never mixed.

use byteorder::{ByteOrder, NativeEndian};
use tracing::{debug, trace, warn};

use super::format::*;
use super::source::{LoadOptions, TableBytes, TableSource};
use crate::util::{Error, Result};

/// Reader over one loaded table.
///
/// All state is fixed at load time, so a reader can be shared between
/// threads without locking.
#[derive(Debug)]
pub struct TableReader {
    source: TableSource,
    kind: TableKind,
    bytes: TableBytes,
    header_pos: usize,
    /// `None` when the source was empty.
    layout: Option<TableLayout>,
}

impl TableReader {
    /// Load a table using options from the environment.
    pub fn open(source: TableSource, kind: TableKind) -> Result<Self> {
        Self::open_opts(source, kind, &LoadOptions::from_env())
    }

    /// Load a table, failing with [`Error::EmptyOrMissing`] if the source has no bytes.
    pub fn open_opts(source: TableSource, kind: TableKind, opts: &LoadOptions) -> Result<Self> {
        let bytes = TableBytes::resolve(&source, opts)?;
        Self::load(source, kind, bytes)
    }

    /// Load a table, turning an empty or missing source into an invalid reader.
    pub fn open_or_invalid(source: TableSource, kind: TableKind, opts: &LoadOptions) -> Result<Self> {
        let bytes = TableBytes::resolve(&source, opts)?;
        if bytes.is_empty() {
            warn!(source = %source, "{} table source is empty or missing", kind.name());
            return Ok(Self::invalid(source, kind));
        }
        Self::load(source, kind, bytes)
    }

    /// Load a table from an in-memory buffer.
    pub fn from_bytes(source: TableSource, kind: TableKind, data: Vec<u8>) -> Result<Self> {
        let bytes = if data.is_empty() {
            TableBytes::Empty
        } else {
            TableBytes::Owned(data)
        };
        Self::load(source, kind, bytes)
    }

    /// A reader with no data; every pool or record access fails with [`Error::InvalidTable`].
    pub fn invalid(source: TableSource, kind: TableKind) -> Self {
        Self {
            source,
            kind,
            bytes: TableBytes::Empty,
            header_pos: 0,
            layout: None,
        }
    }

    fn load(source: TableSource, kind: TableKind, bytes: TableBytes) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::EmptyOrMissing(source.to_string()));
        }

        let header_pos = EndianHeader::parse(&bytes)?.native_offset()? as usize;
        let header = TableHeader::parse(&bytes, header_pos)?;
        let layout = kind.layout(&header);
        layout.validate(bytes.len())?;

        if layout.count > 0 && layout.stride < kind.record_size() {
            warn!(
                source = %source,
                stride = layout.stride,
                expected = kind.record_size(),
                "{} record stride is smaller than the record layout",
                kind.name()
            );
        }

        debug!(
            source = %source,
            size = bytes.len(),
            mapped = bytes.is_mapped(),
            header_pos,
            stride = layout.stride,
            count = layout.count,
            pool_base = layout.pool_base,
            record_base = layout.record_base,
            "loaded {} table",
            kind.name()
        );

        Ok(Self {
            source,
            kind,
            bytes,
            header_pos,
            layout: Some(layout),
        })
    }

    /// True unless the source turned out empty.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.layout.is_some()
    }

    #[inline]
    pub fn source(&self) -> &TableSource {
        &self.source
    }

    #[inline]
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Total table size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check if the table bytes are memory mapped.
    #[inline]
    pub fn is_mapped(&self) -> bool {
        self.bytes.is_mapped()
    }

    /// Byte position of the culture table header selected by the endian header.
    #[inline]
    pub fn header_pos(&self) -> usize {
        self.header_pos
    }

    /// Record geometry, or [`Error::InvalidTable`] for an invalid reader.
    pub fn layout(&self) -> Result<&TableLayout> {
        self.layout.as_ref().ok_or(Error::InvalidTable)
    }

    /// Number of records (zero for an invalid reader).
    pub fn count(&self) -> u32 {
        self.layout.map_or(0, |layout| layout.count)
    }

    // ========================================================================
    // Records
    // ========================================================================

    /// Byte position of the record with 1-based id `id`.
    pub fn record_offset(&self, id: u32) -> Result<usize> {
        let layout = self.layout()?;
        if id == 0 || id > layout.count {
            return Err(Error::IndexOutOfRange { id, count: layout.count });
        }
        // ids are 1-based: record 1 sits at record_base
        Ok((id as usize - 1) * layout.stride + layout.record_base)
    }

    /// Read a u16 field at `field` bytes into record `id`.
    pub fn record_u16(&self, id: u32, field: usize) -> Result<u16> {
        let pos = self.record_offset(id)?;
        read_u16(&self.bytes, pos + field)
    }

    /// Read a u32 field at `field` bytes into record `id`.
    pub fn record_u32(&self, id: u32, field: usize) -> Result<u32> {
        let pos = self.record_offset(id)?;
        read_u32(&self.bytes, pos + field)
    }

    // ========================================================================
    // Pool
    // ========================================================================

    /// Byte position of a pool offset.
    fn pool_pos(&self, offset: u32) -> Result<usize> {
        let layout = self.layout()?;
        let pos = (offset as usize)
            .checked_mul(POOL_UNIT_SIZE)
            .and_then(|rel| rel.checked_add(layout.pool_base))
            .ok_or_else(|| Error::invalid(format!("pool offset {} overflows", offset)))?;
        if pos >= self.bytes.len() {
            return Err(Error::eof(pos, POOL_UNIT_SIZE));
        }
        Ok(pos)
    }

    /// Bytes `pos..pos + len`, or an end-of-table error.
    fn bytes_at(&self, pos: usize, len: usize) -> Result<&[u8]> {
        pos.checked_add(len)
            .and_then(|end| self.bytes.get(pos..end))
            .ok_or_else(|| Error::eof(pos, len))
    }

    /// Read a counted string.
    ///
    /// Layout: `u16` length followed by that many UTF-16 units. The empty
    /// string is stored with length 1 and a single zero unit.
    pub fn read_string(&self, offset: u32) -> Result<String> {
        let pos = self.pool_pos(offset)?;
        let len = read_u16(&self.bytes, pos)? as usize;
        let chars = pos + POOL_UNIT_SIZE;
        if read_u16(&self.bytes, chars)? == 0 {
            return Ok(String::new());
        }

        let raw = self.bytes_at(chars, len * POOL_UNIT_SIZE)?;
        let mut units = vec![0u16; len];
        NativeEndian::read_u16_into(raw, &mut units);
        Ok(String::from_utf16(&units)?)
    }

    /// Read a string array.
    ///
    /// Layout: `u16` count followed by `count` u32 pool offsets of counted
    /// strings. Offset 0 is the empty array.
    pub fn read_string_array(&self, offset: u32) -> Result<Vec<String>> {
        if offset == EMPTY_OFFSET {
            return Ok(Vec::new());
        }

        let pos = self.pool_pos(offset)?;
        let count = read_u16(&self.bytes, pos)? as usize;
        let table = pos + POOL_UNIT_SIZE;
        self.bytes_at(table, count * 4)?;
        trace!(offset, count, "string array");

        (0..count)
            .map(|i| {
                let item = read_u32(&self.bytes, table + i * 4)?;
                self.read_string(item)
            })
            .collect()
    }

    /// Read an array of signed 16-bit arrays, widened to i32.
    ///
    /// Layout: `i16` count followed by `count` u32 pool offsets, each to an
    /// `i16` count and that many `i16` values. Offset 0 is the empty array.
    pub fn read_int_array_array(&self, offset: u32) -> Result<Vec<Vec<i32>>> {
        if offset == EMPTY_OFFSET {
            return Ok(Vec::new());
        }

        let pos = self.pool_pos(offset)?;
        let count = read_i16(&self.bytes, pos)?;
        if count < 0 {
            return Err(Error::invalid(format!(
                "negative array count {} at pool offset {}",
                count, offset
            )));
        }
        let count = count as usize;
        let table = pos + POOL_UNIT_SIZE;
        self.bytes_at(table, count * 4)?;
        trace!(offset, count, "int array array");

        let mut arrays = Vec::with_capacity(count);
        for i in 0..count {
            let inner = read_u32(&self.bytes, table + i * 4)?;
            let inner_pos = self.pool_pos(inner)?;
            let len = read_i16(&self.bytes, inner_pos)?;
            if len < 0 {
                return Err(Error::invalid(format!(
                    "negative array length {} at pool offset {}",
                    len, inner
                )));
            }

            let raw = self.bytes_at(inner_pos + POOL_UNIT_SIZE, len as usize * POOL_UNIT_SIZE)?;
            let mut values = vec![0i16; len as usize];
            NativeEndian::read_i16_into(raw, &mut values);
            arrays.push(values.into_iter().map(i32::from).collect());
        }
        Ok(arrays)
    }

    /// Compare `name` with the pooled string at `offset`, ignoring ASCII case.
    ///
    /// `name` must already be lower case; ASCII `A`-`Z` in the pooled
    /// string are folded to lower case as they are read and nothing else is
    /// folded. Returns the first non-zero UTF-16 unit difference, or the
    /// length difference `name.len() - pooled.len()` in UTF-16 units.
    pub fn compare_ascii_ignore_case(&self, name: &str, offset: u32) -> Result<i32> {
        if name.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(Error::ContractViolation(format!(
                "comparison name {:?} must be lower case",
                name
            )));
        }

        let pos = self.pool_pos(offset)?;
        let len = read_u16(&self.bytes, pos)? as usize;
        let chars = pos + POOL_UNIT_SIZE;
        if read_u16(&self.bytes, chars)? == 0 {
            return Ok(if name.is_empty() { 0 } else { 1 });
        }

        let mut test = 0i32;
        for (i, unit) in name.encode_utf16().take(len).enumerate() {
            let pooled = read_u16(&self.bytes, chars + i * POOL_UNIT_SIZE)?;
            let folded = if (u16::from(b'A')..=u16::from(b'Z')).contains(&pooled) {
                pooled + u16::from(b'a' - b'A')
            } else {
                pooled
            };
            test = i32::from(unit) - i32::from(folded);
            if test != 0 {
                break;
            }
        }

        if test == 0 {
            Ok(name.encode_utf16().count() as i32 - len as i32)
        } else {
            Ok(test)
        }
    }
}
