//! Synthetic culture table builder shared by the integration tests.

#![allow(dead_code)]

use caltable::table::{
    CalendarField, CALENDAR_RECORD_SIZE, ENDIAN_HEADER_SIZE, TABLE_HEADER_SIZE,
};

/// Calendar fields for one record; empty slices are written as offset 0.
#[derive(Default, Clone)]
pub struct Calendar<'a> {
    pub calendar_id: u16,
    pub two_digit_year_max: u16,
    pub current_era: u16,
    pub format_flags: u16,
    pub name: &'a str,
    pub short_dates: &'a [&'a str],
    pub year_months: &'a [&'a str],
    pub long_dates: &'a [&'a str],
    pub era_names: &'a [&'a str],
    pub era_ranges: &'a [&'a [i16]],
    pub day_names: &'a [&'a str],
    pub abbrev_day_names: &'a [&'a str],
    pub month_names: &'a [&'a str],
    pub abbrev_month_names: &'a [&'a str],
    pub month_day: &'a str,
    pub abbrev_era_names: &'a [&'a str],
    pub abbrev_english_era_names: &'a [&'a str],
    pub leap_year_month_names: &'a [&'a str],
    pub super_short_day_names: &'a [&'a str],
}

pub const GREGORIAN_DAYS: [&str; 7] = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
pub const GREGORIAN_MONTHS: [&str; 13] = [
    "January", "February", "March", "April", "May", "June", "July",
    "August", "September", "October", "November", "December", "",
];

pub fn gregorian() -> Calendar<'static> {
    Calendar {
        calendar_id: 1,
        two_digit_year_max: 2029,
        current_era: 1,
        format_flags: 0,
        name: "Gregorian",
        short_dates: &["M/d/yyyy", "M/d/yy", "MM/dd/yy"],
        year_months: &["MMMM, yyyy"],
        long_dates: &["dddd, MMMM dd, yyyy", "MMMM dd, yyyy"],
        era_names: &["A.D."],
        era_ranges: &[&[1, 1, 1, 1, 0, 1, 9999]],
        day_names: &GREGORIAN_DAYS,
        abbrev_day_names: &["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        month_names: &GREGORIAN_MONTHS,
        abbrev_month_names: &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec", ""],
        month_day: "MMMM dd",
        abbrev_era_names: &["AD"],
        abbrev_english_era_names: &["AD"],
        leap_year_month_names: &[],
        super_short_day_names: &["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"],
    }
}

pub fn japanese() -> Calendar<'static> {
    Calendar {
        calendar_id: 3,
        two_digit_year_max: 99,
        current_era: 4,
        format_flags: 0x0008,
        name: "Japanese",
        short_dates: &["gg y/M/d"],
        year_months: &["gg y'年'M'月'"],
        long_dates: &["gg y'年'M'月'd'日'"],
        era_names: &["平成", "昭和", "大正", "明治"],
        era_ranges: &[
            &[4, 1989, 1, 8, 1988, 1, 9999],
            &[3, 1926, 12, 25, 1925, 1, 64],
            &[2, 1912, 7, 30, 1911, 1, 15],
            &[1, 1868, 1, 1, 1867, 1, 45],
        ],
        day_names: &["日曜日", "月曜日", "火曜日", "水曜日", "木曜日", "金曜日", "土曜日"],
        abbrev_day_names: &["日", "月", "火", "水", "木", "金", "土"],
        month_names: &GREGORIAN_MONTHS,
        abbrev_month_names: &[],
        month_day: "M'月'd'日'",
        abbrev_era_names: &["平", "昭", "大", "明"],
        abbrev_english_era_names: &["H", "S", "T", "M"],
        leap_year_month_names: &[],
        super_short_day_names: &[],
    }
}

/// Builds a native-endian culture table with calendar records and a pool.
pub struct TableBuilder {
    pool: Vec<u16>,
    records: Vec<[u8; CALENDAR_RECORD_SIZE]>,
    stride: usize,
    header_gap: usize,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self {
            // unit 0: the reserved empty string
            pool: vec![1, 0],
            records: Vec::new(),
            stride: CALENDAR_RECORD_SIZE,
            header_gap: 0,
        }
    }

    /// Override the record stride written to the header.
    pub fn stride(mut self, stride: usize) -> Self {
        self.stride = stride;
        self
    }

    /// Leave `gap` unused bytes between the endian header and the table header.
    pub fn header_gap(mut self, gap: usize) -> Self {
        self.header_gap = gap;
        self
    }

    fn offset(&self) -> u32 {
        self.pool.len() as u32
    }

    fn push_u32(&mut self, value: u32) {
        let b = value.to_ne_bytes();
        self.pool.push(u16::from_ne_bytes([b[0], b[1]]));
        self.pool.push(u16::from_ne_bytes([b[2], b[3]]));
    }

    /// Pool a counted string; the empty string maps to the reserved entry.
    pub fn string(&mut self, s: &str) -> u32 {
        if s.is_empty() {
            return 0;
        }
        let at = self.offset();
        let units: Vec<u16> = s.encode_utf16().collect();
        self.pool.push(units.len() as u16);
        self.pool.extend(units);
        at
    }

    /// Pool a string array; an empty array is offset 0.
    pub fn strings(&mut self, items: &[&str]) -> u32 {
        if items.is_empty() {
            return 0;
        }
        let offsets: Vec<u32> = items.iter().map(|s| self.string(s)).collect();
        let at = self.offset();
        self.pool.push(offsets.len() as u16);
        for offset in offsets {
            self.push_u32(offset);
        }
        at
    }

    /// Pool an array of i16 arrays; an empty array is offset 0.
    pub fn int_arrays(&mut self, arrays: &[&[i16]]) -> u32 {
        if arrays.is_empty() {
            return 0;
        }
        let offsets: Vec<u32> = arrays
            .iter()
            .map(|values| {
                let at = self.offset();
                self.pool.push(values.len() as u16);
                self.pool.extend(values.iter().map(|&v| v as u16));
                at
            })
            .collect();
        let at = self.offset();
        self.pool.push(offsets.len() as u16);
        for offset in offsets {
            self.push_u32(offset);
        }
        at
    }

    /// Append a zeroed record and return its 1-based id.
    pub fn add_record(&mut self) -> u32 {
        self.records.push([0u8; CALENDAR_RECORD_SIZE]);
        self.records.len() as u32
    }

    pub fn set_word(&mut self, id: u32, field: CalendarField, value: u16) {
        let pos = field.offset();
        self.records[id as usize - 1][pos..pos + 2].copy_from_slice(&value.to_ne_bytes());
    }

    pub fn set_offset(&mut self, id: u32, field: CalendarField, value: u32) {
        let pos = field.offset();
        self.records[id as usize - 1][pos..pos + 4].copy_from_slice(&value.to_ne_bytes());
    }

    /// Append a fully populated calendar record and return its id.
    pub fn add_calendar(&mut self, cal: &Calendar<'_>) -> u32 {
        let id = self.add_record();
        self.set_word(id, CalendarField::CalendarId, cal.calendar_id);
        self.set_word(id, CalendarField::TwoDigitYearMax, cal.two_digit_year_max);
        self.set_word(id, CalendarField::CurrentEra, cal.current_era);
        self.set_word(id, CalendarField::FormatFlags, cal.format_flags);

        let fields: [(CalendarField, &[&str]); 12] = [
            (CalendarField::ShortDates, cal.short_dates),
            (CalendarField::YearMonths, cal.year_months),
            (CalendarField::LongDates, cal.long_dates),
            (CalendarField::EraNames, cal.era_names),
            (CalendarField::DayNames, cal.day_names),
            (CalendarField::AbbrevDayNames, cal.abbrev_day_names),
            (CalendarField::MonthNames, cal.month_names),
            (CalendarField::AbbrevMonthNames, cal.abbrev_month_names),
            (CalendarField::AbbrevEraNames, cal.abbrev_era_names),
            (CalendarField::AbbrevEnglishEraNames, cal.abbrev_english_era_names),
            (CalendarField::LeapYearMonthNames, cal.leap_year_month_names),
            (CalendarField::SuperShortDayNames, cal.super_short_day_names),
        ];
        for (field, items) in fields {
            let offset = self.strings(items);
            self.set_offset(id, field, offset);
        }

        let name = self.string(cal.name);
        self.set_offset(id, CalendarField::Name, name);
        let month_day = self.string(cal.month_day);
        self.set_offset(id, CalendarField::MonthDay, month_day);
        let eras = self.int_arrays(cal.era_ranges);
        self.set_offset(id, CalendarField::EraRanges, eras);
        id
    }

    /// Serialize: endian header, table header, records, pool.
    pub fn build(&self) -> Vec<u8> {
        let header_pos = ENDIAN_HEADER_SIZE + self.header_gap;
        let record_pos = header_pos + TABLE_HEADER_SIZE;
        let count = self.records.len();
        let record_area = match count {
            0 => 0,
            n => (n - 1) * self.stride + self.stride.max(CALENDAR_RECORD_SIZE),
        };
        let pool_pos = record_pos + record_area;

        let mut buf = vec![0u8; pool_pos];
        let native = if cfg!(target_endian = "big") { 0 } else { 4 };
        buf[native..native + 4].copy_from_slice(&(header_pos as u32).to_ne_bytes());

        let header = [self.stride as u32, count as u32, pool_pos as u32, record_pos as u32];
        for (i, word) in header.iter().enumerate() {
            let at = header_pos + i * 4;
            buf[at..at + 4].copy_from_slice(&word.to_ne_bytes());
        }

        for (i, record) in self.records.iter().enumerate() {
            let at = record_pos + i * self.stride;
            buf[at..at + CALENDAR_RECORD_SIZE].copy_from_slice(record);
        }

        for unit in &self.pool {
            buf.extend_from_slice(&unit.to_ne_bytes());
        }
        buf
    }
}
