//! Table format constants and structures.
//!
//! All multi-byte values are stored in the byte order selected by the
//! endian header, which must match the running platform, so every read
//! goes through [`NativeEndian`].

use byteorder::{ByteOrder, NativeEndian};

use crate::util::{Error, Result};

/// Size of the endian header (`beOffset: u32`, `leOffset: u32`).
pub const ENDIAN_HEADER_SIZE: usize = 8;

/// Position of the big-endian table offset in the endian header.
pub const BE_OFFSET_POS: usize = 0;

/// Position of the little-endian table offset in the endian header.
pub const LE_OFFSET_POS: usize = 4;

/// Size of the calendar descriptors at the start of the culture table header.
pub const TABLE_HEADER_SIZE: usize = 16;

/// Header field: byte size of one calendar record.
pub const SIZE_CALENDAR_ITEM_POS: usize = 0;

/// Header field: number of calendar records.
pub const NUM_CALENDAR_ITEMS_POS: usize = 4;

/// Header field: byte offset of the shared data pool.
pub const OFFSET_TO_DATA_POOL_POS: usize = 8;

/// Header field: byte offset of the first calendar record.
pub const OFFSET_TO_CALENDAR_ITEM_DATA_POS: usize = 12;

/// Pool offsets count 16-bit units from the pool base.
pub const POOL_UNIT_SIZE: usize = 2;

/// Pool offset meaning "no array".
pub const EMPTY_OFFSET: u32 = 0;

/// Size of a calendar record as laid out by the table encoder (2-byte packed).
pub const CALENDAR_RECORD_SIZE: usize = 72;

/// Byte order of the running platform, as named in error messages.
#[inline]
pub const fn native_endian_name() -> &'static str {
    if cfg!(target_endian = "big") {
        "big"
    } else {
        "little"
    }
}

// ============================================================================
// Bounds-checked native reads
// ============================================================================

#[inline]
fn span(data: &[u8], pos: usize, len: usize) -> Result<&[u8]> {
    pos.checked_add(len)
        .and_then(|end| data.get(pos..end))
        .ok_or_else(|| Error::eof(pos, len))
}

/// Read a native-endian u16 at byte position `pos`.
#[inline]
pub fn read_u16(data: &[u8], pos: usize) -> Result<u16> {
    Ok(NativeEndian::read_u16(span(data, pos, 2)?))
}

/// Read a native-endian i16 at byte position `pos`.
#[inline]
pub fn read_i16(data: &[u8], pos: usize) -> Result<i16> {
    Ok(NativeEndian::read_i16(span(data, pos, 2)?))
}

/// Read a native-endian u32 at byte position `pos`.
#[inline]
pub fn read_u32(data: &[u8], pos: usize) -> Result<u32> {
    Ok(NativeEndian::read_u32(span(data, pos, 4)?))
}

// ============================================================================
// Headers
// ============================================================================

/// Leading structure selecting the big- or little-endian table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndianHeader {
    pub be_offset: u32,
    pub le_offset: u32,
}

impl EndianHeader {
    /// Parse the endian header from the start of the buffer.
    pub fn parse(data: &[u8]) -> Result<Self> {
        Ok(Self {
            be_offset: read_u32(data, BE_OFFSET_POS)?,
            le_offset: read_u32(data, LE_OFFSET_POS)?,
        })
    }

    /// Byte offset of the culture table header for this platform.
    pub fn native_offset(&self) -> Result<u32> {
        let offset = if cfg!(target_endian = "big") {
            self.be_offset
        } else {
            self.le_offset
        };
        if offset == 0 {
            return Err(Error::WrongEndianness {
                expected: native_endian_name(),
            });
        }
        Ok(offset)
    }
}

/// Calendar descriptors of the culture table header.
///
/// The full header carries further table descriptors after these; they
/// are not read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableHeader {
    pub size_calendar_item: u32,
    pub num_calendar_items: u32,
    pub offset_to_data_pool: u32,
    pub offset_to_calendar_item_data: u32,
}

impl TableHeader {
    /// Parse the header at byte position `pos`.
    pub fn parse(data: &[u8], pos: usize) -> Result<Self> {
        if pos.checked_add(TABLE_HEADER_SIZE).map_or(true, |end| end > data.len()) {
            return Err(Error::eof(pos, TABLE_HEADER_SIZE));
        }
        Ok(Self {
            size_calendar_item: read_u32(data, pos + SIZE_CALENDAR_ITEM_POS)?,
            num_calendar_items: read_u32(data, pos + NUM_CALENDAR_ITEMS_POS)?,
            offset_to_data_pool: read_u32(data, pos + OFFSET_TO_DATA_POOL_POS)?,
            offset_to_calendar_item_data: read_u32(data, pos + OFFSET_TO_CALENDAR_ITEM_DATA_POS)?,
        })
    }
}

// ============================================================================
// Table kinds
// ============================================================================

/// Record geometry derived from the header for one table kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Bytes per record.
    pub stride: usize,
    /// Number of records; valid ids are `1..=count`.
    pub count: u32,
    /// Byte offset of the data pool.
    pub pool_base: usize,
    /// Byte offset of the record with id 1.
    pub record_base: usize,
}

impl TableLayout {
    /// Check that the record array and pool base lie inside a buffer of `len` bytes.
    pub fn validate(&self, len: usize) -> Result<()> {
        if self.count > 0 && self.stride == 0 {
            return Err(Error::invalid(format!(
                "{} records with zero stride",
                self.count
            )));
        }
        let end = (self.count as usize)
            .checked_mul(self.stride)
            .and_then(|size| size.checked_add(self.record_base));
        match end {
            Some(end) if end <= len => {}
            _ => {
                return Err(Error::invalid(format!(
                    "record array ({} x {} bytes at {}) exceeds table size {}",
                    self.count, self.stride, self.record_base, len
                )))
            }
        }
        if self.pool_base > len {
            return Err(Error::invalid(format!(
                "data pool offset {} exceeds table size {}",
                self.pool_base, len
            )));
        }
        Ok(())
    }
}

/// The kinds of record tables a culture data file can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TableKind {
    Calendar,
}

impl TableKind {
    /// Compute stride, count, pool base and record base from the header.
    pub fn layout(self, header: &TableHeader) -> TableLayout {
        match self {
            Self::Calendar => TableLayout {
                stride: header.size_calendar_item as usize,
                count: header.num_calendar_items,
                pool_base: header.offset_to_data_pool as usize,
                record_base: header.offset_to_calendar_item_data as usize,
            },
        }
    }

    /// Minimum record size the kind's field layout expects.
    pub fn record_size(self) -> usize {
        match self {
            Self::Calendar => CALENDAR_RECORD_SIZE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
        }
    }
}

// ============================================================================
// Calendar record fields
// ============================================================================

/// Fields of a calendar record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalendarField {
    CalendarId,
    TwoDigitYearMax,
    ShortDates,
    YearMonths,
    LongDates,
    EraNames,
    EraRanges,
    DayNames,
    AbbrevDayNames,
    MonthNames,
    AbbrevMonthNames,
    CurrentEra,
    FormatFlags,
    Name,
    MonthDay,
    AbbrevEraNames,
    AbbrevEnglishEraNames,
    LeapYearMonthNames,
    SuperShortDayNames,
}

impl CalendarField {
    /// Every field, in record order.
    pub const ALL: [CalendarField; 19] = [
        Self::CalendarId,
        Self::TwoDigitYearMax,
        Self::ShortDates,
        Self::YearMonths,
        Self::LongDates,
        Self::EraNames,
        Self::EraRanges,
        Self::DayNames,
        Self::AbbrevDayNames,
        Self::MonthNames,
        Self::AbbrevMonthNames,
        Self::CurrentEra,
        Self::FormatFlags,
        Self::Name,
        Self::MonthDay,
        Self::AbbrevEraNames,
        Self::AbbrevEnglishEraNames,
        Self::LeapYearMonthNames,
        Self::SuperShortDayNames,
    ];

    /// Byte offset of the field within a record.
    pub const fn offset(self) -> usize {
        match self {
            Self::CalendarId => 0,
            Self::TwoDigitYearMax => 2,
            Self::ShortDates => 4,
            Self::YearMonths => 8,
            Self::LongDates => 12,
            Self::EraNames => 16,
            Self::EraRanges => 20,
            Self::DayNames => 24,
            Self::AbbrevDayNames => 28,
            Self::MonthNames => 32,
            Self::AbbrevMonthNames => 36,
            Self::CurrentEra => 40,
            Self::FormatFlags => 42,
            Self::Name => 44,
            Self::MonthDay => 48,
            Self::AbbrevEraNames => 52,
            Self::AbbrevEnglishEraNames => 56,
            Self::LeapYearMonthNames => 60,
            Self::SuperShortDayNames => 64,
        }
    }

    /// Width of the field in bytes: scalars are u16, pool offsets u32.
    pub const fn width(self) -> usize {
        match self {
            Self::CalendarId | Self::TwoDigitYearMax | Self::CurrentEra | Self::FormatFlags => 2,
            _ => 4,
        }
    }

    /// Field name as written by the table encoder.
    pub const fn name(self) -> &'static str {
        match self {
            Self::CalendarId => "iCalendar",
            Self::TwoDigitYearMax => "iTwoDigitYearMax",
            Self::ShortDates => "saShortDate",
            Self::YearMonths => "saYearMonth",
            Self::LongDates => "saLongDate",
            Self::EraNames => "saEraNames",
            Self::EraRanges => "waaEraRanges",
            Self::DayNames => "saDayNames",
            Self::AbbrevDayNames => "saAbbrevDayNames",
            Self::MonthNames => "saMonthNames",
            Self::AbbrevMonthNames => "saAbbrevMonthNames",
            Self::CurrentEra => "iCurrentEra",
            Self::FormatFlags => "iFormatFlags",
            Self::Name => "sName",
            Self::MonthDay => "sMonthDay",
            Self::AbbrevEraNames => "saAbbrevEraNames",
            Self::AbbrevEnglishEraNames => "saAbbrevEnglishEraNames",
            Self::LeapYearMonthNames => "saLeapYearMonthNames",
            Self::SuperShortDayNames => "saSuperShortDayNames",
        }
    }
}
