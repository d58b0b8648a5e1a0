//! Calendar table: typed accessors over calendar records.
//!
//! Every accessor takes a 1-based calendar id and fails with
//! [`Error::IndexOutOfRange`] outside `1..=num_calendars()`.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace, warn};

use super::format::{CalendarField, TableKind, TableLayout};
use super::reader::TableReader;
use super::source::{builtin_table, register_resource, resource_bytes, LoadOptions, TableSource};
use crate::util::{Error, Result};

/// Resource name of the built-in culture data table.
pub const DEFAULT_TABLE_NAME: &str = "culture.nlp";

/// Environment variable pointing the default table at a file on disk.
pub const DEFAULT_FILE_ENV: &str = "CALTABLE_DEFAULT_FILE";

/// Reader for the calendar records of a culture data table.
#[derive(Debug)]
pub struct CalendarTable {
    reader: TableReader,
}

impl CalendarTable {
    /// Open a custom table with options from the environment.
    ///
    /// An empty or missing source yields a table with `is_valid() == false`.
    pub fn open(source: TableSource) -> Result<Self> {
        Self::open_opts(source, &LoadOptions::from_env())
    }

    /// Open a custom table; an empty or missing source yields an invalid table.
    pub fn open_opts(source: TableSource, opts: &LoadOptions) -> Result<Self> {
        let reader = TableReader::open_or_invalid(source, TableKind::Calendar, opts)?;
        Ok(Self { reader })
    }

    /// Open a table that must exist.
    pub fn open_strict(source: TableSource, opts: &LoadOptions) -> Result<Self> {
        let reader = TableReader::open_opts(source, TableKind::Calendar, opts)?;
        Ok(Self { reader })
    }

    /// Load a table from an in-memory buffer.
    pub fn from_bytes(source: TableSource, data: Vec<u8>) -> Result<Self> {
        let reader = TableReader::from_bytes(source, TableKind::Calendar, data)?;
        Ok(Self { reader })
    }

    /// The process-wide default table, loaded on first use.
    ///
    /// Reads the embedded resource [`DEFAULT_TABLE_NAME`] (falling back to
    /// the table compiled in at build time), or the file named by
    /// `CALTABLE_DEFAULT_FILE`. A failed load is remembered and every
    /// call returns it as [`Error::DefaultTable`]; callers formatting with
    /// default cultures have nothing to fall back to.
    pub fn shared() -> Result<&'static CalendarTable> {
        static DEFAULT: OnceLock<std::result::Result<CalendarTable, Arc<Error>>> = OnceLock::new();
        DEFAULT
            .get_or_init(|| Self::load_default().map_err(Arc::new))
            .as_ref()
            .map_err(|e| Error::DefaultTable(Arc::clone(e)))
    }

    fn load_default() -> Result<Self> {
        let source = match std::env::var_os(DEFAULT_FILE_ENV) {
            Some(path) => TableSource::File(PathBuf::from(path)),
            None => {
                if resource_bytes(DEFAULT_TABLE_NAME).is_none() {
                    if let Some(bytes) = builtin_table() {
                        register_resource(DEFAULT_TABLE_NAME, bytes);
                    }
                }
                TableSource::embedded(DEFAULT_TABLE_NAME)
            }
        };
        debug!(source = %source, "loading default calendar table");
        Self::open_strict(source, &LoadOptions::from_env()).inspect_err(|e| {
            warn!(error = %e, "default calendar table failed to load");
        })
    }

    /// Access the underlying reader.
    #[inline]
    pub fn reader(&self) -> &TableReader {
        &self.reader
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.reader.is_valid()
    }

    #[inline]
    pub fn source(&self) -> &TableSource {
        self.reader.source()
    }

    pub fn layout(&self) -> Result<&TableLayout> {
        self.reader.layout()
    }

    /// Number of calendar records (zero for an invalid table).
    #[inline]
    pub fn num_calendars(&self) -> u32 {
        self.reader.count()
    }

    /// Valid calendar ids, `1..=num_calendars()`.
    pub fn calendar_ids(&self) -> impl Iterator<Item = u32> {
        1..=self.num_calendars()
    }

    // ========================================================================
    // Field resolution
    // ========================================================================

    fn word(&self, id: u32, field: CalendarField) -> Result<u16> {
        self.reader.record_u16(id, field.offset())
    }

    fn pool_offset(&self, id: u32, field: CalendarField) -> Result<u32> {
        self.reader.record_u32(id, field.offset())
    }

    fn strings(&self, id: u32, field: CalendarField) -> Result<Vec<String>> {
        let offset = self.pool_offset(id, field)?;
        trace!(id, field = field.name(), offset, "resolving string array");
        self.reader.read_string_array(offset)
    }

    fn string(&self, id: u32, field: CalendarField) -> Result<String> {
        let offset = self.pool_offset(id, field)?;
        trace!(id, field = field.name(), offset, "resolving string");
        self.reader.read_string(offset)
    }

    // ========================================================================
    // Scalars
    // ========================================================================

    /// Calendar identifier stored in the record.
    pub fn calendar_id(&self, id: u32) -> Result<u16> {
        self.word(id, CalendarField::CalendarId)
    }

    /// Upper bound of the two-digit year window.
    pub fn two_digit_year_max(&self, id: u32) -> Result<u16> {
        self.word(id, CalendarField::TwoDigitYearMax)
    }

    /// Index of the current era.
    pub fn current_era(&self, id: u32) -> Result<i32> {
        self.word(id, CalendarField::CurrentEra).map(i32::from)
    }

    /// Date/time format flag bits.
    pub fn format_flags(&self, id: u32) -> Result<i32> {
        self.word(id, CalendarField::FormatFlags).map(i32::from)
    }

    // ========================================================================
    // Names and patterns
    // ========================================================================

    /// Calendar name.
    pub fn name(&self, id: u32) -> Result<String> {
        self.string(id, CalendarField::Name)
    }

    pub fn day_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::DayNames)
    }

    pub fn abbreviated_day_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::AbbrevDayNames)
    }

    pub fn super_short_day_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::SuperShortDayNames)
    }

    pub fn month_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::MonthNames)
    }

    pub fn abbreviated_month_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::AbbrevMonthNames)
    }

    /// Month names used in leap years (calendars with a leap month).
    pub fn leap_year_month_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::LeapYearMonthNames)
    }

    pub fn short_date_patterns(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::ShortDates)
    }

    pub fn long_date_patterns(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::LongDates)
    }

    pub fn year_month_patterns(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::YearMonths)
    }

    pub fn month_day_pattern(&self, id: u32) -> Result<String> {
        self.string(id, CalendarField::MonthDay)
    }

    // ========================================================================
    // Eras
    // ========================================================================

    /// One integer tuple per era (era value, start year/month/day, offset, ...).
    pub fn era_ranges(&self, id: u32) -> Result<Vec<Vec<i32>>> {
        let offset = self.pool_offset(id, CalendarField::EraRanges)?;
        trace!(id, offset, "resolving era ranges");
        self.reader.read_int_array_array(offset)
    }

    pub fn era_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::EraNames)
    }

    pub fn abbreviated_era_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::AbbrevEraNames)
    }

    pub fn abbreviated_english_era_names(&self, id: u32) -> Result<Vec<String>> {
        self.strings(id, CalendarField::AbbrevEnglishEraNames)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Find the calendar whose name matches `name` (lower case), ignoring ASCII case.
    ///
    /// A record whose name cannot be read is skipped; it never hides the
    /// other calendars.
    pub fn find_by_name(&self, name: &str) -> Result<Option<u32>> {
        for id in self.calendar_ids() {
            let compared = self
                .pool_offset(id, CalendarField::Name)
                .and_then(|offset| self.reader.compare_ascii_ignore_case(name, offset));
            match compared {
                Ok(0) => return Ok(Some(id)),
                Ok(_) => {}
                Err(e @ (Error::UnexpectedEof { .. } | Error::Utf16(_) | Error::InvalidStructure(_))) => {
                    warn!(id, error = %e, "skipping calendar with unreadable name");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Resolve every field of one calendar.
    pub fn record(&self, id: u32) -> Result<CalendarRecord> {
        Ok(CalendarRecord {
            id,
            calendar_id: self.calendar_id(id)?,
            two_digit_year_max: self.two_digit_year_max(id)?,
            current_era: self.current_era(id)?,
            format_flags: self.format_flags(id)?,
            name: self.name(id)?,
            day_names: self.day_names(id)?,
            abbreviated_day_names: self.abbreviated_day_names(id)?,
            super_short_day_names: self.super_short_day_names(id)?,
            month_names: self.month_names(id)?,
            abbreviated_month_names: self.abbreviated_month_names(id)?,
            leap_year_month_names: self.leap_year_month_names(id)?,
            short_date_patterns: self.short_date_patterns(id)?,
            long_date_patterns: self.long_date_patterns(id)?,
            year_month_patterns: self.year_month_patterns(id)?,
            month_day_pattern: self.month_day_pattern(id)?,
            era_ranges: self.era_ranges(id)?,
            era_names: self.era_names(id)?,
            abbreviated_era_names: self.abbreviated_era_names(id)?,
            abbreviated_english_era_names: self.abbreviated_english_era_names(id)?,
        })
    }
}

/// All fields of one calendar record, resolved from the pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarRecord {
    /// 1-based position in the table.
    pub id: u32,
    pub calendar_id: u16,
    pub two_digit_year_max: u16,
    pub current_era: i32,
    pub format_flags: i32,
    pub name: String,
    pub day_names: Vec<String>,
    pub abbreviated_day_names: Vec<String>,
    pub super_short_day_names: Vec<String>,
    pub month_names: Vec<String>,
    pub abbreviated_month_names: Vec<String>,
    pub leap_year_month_names: Vec<String>,
    pub short_date_patterns: Vec<String>,
    pub long_date_patterns: Vec<String>,
    pub year_month_patterns: Vec<String>,
    pub month_day_pattern: String,
    pub era_ranges: Vec<Vec<i32>>,
    pub era_names: Vec<String>,
    pub abbreviated_era_names: Vec<String>,
    pub abbreviated_english_era_names: Vec<String>,
}
