//! caltable CLI - Tool for inspecting culture calendar tables.

use caltable::prelude::*;
use serde_json::{json, Value};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN_NAME: &str = env!("CARGO_BIN_NAME");
const BUILD_STAMP: &str = env!("CALTABLE_BUILD_STAMP");

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut level = "warn";
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => level = "debug",
            "-vv" | "--trace" => level = "trace",
            "-q" | "--quiet" => level = "off",
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(level);

    if filtered_args.is_empty() {
        print_help();
        return;
    }

    let (json_mode, positional) = split_json_flag(&filtered_args);

    let Some(&command) = positional.first() else {
        print_help();
        return;
    };

    let result = match command {
        // Info command - show table summary
        "info" | "i" => {
            let file = require_file(&positional, "info <table.nlp>");
            cmd_info(file)
        }

        // Dump command - resolve calendar fields
        "dump" | "d" => {
            let file = require_file(&positional, "dump <table.nlp> [id] [--json]");
            let id = positional
                .get(2)
                .map(|s| s.parse::<u32>().unwrap_or_else(|_| fail(&format!("invalid calendar id: {}", s))));
            cmd_dump(file, id, json_mode)
        }

        // Find command - look up a calendar by name
        "find" | "f" => {
            let file = require_file(&positional, "find <table.nlp> <name>");
            let Some(name) = positional.get(2) else {
                fail(&format!("missing name argument\nUsage: {} find <table.nlp> <name>", BIN_NAME));
            };
            cmd_find(file, name)
        }

        "version" | "--version" | "-V" => {
            let builtin = if caltable::table::builtin_table().is_some() { "embedded" } else { "none" };
            println!("{} {} (built {}, default table: {})", BIN_NAME, VERSION, BUILD_STAMP, builtin);
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        other => {
            eprintln!("Unknown command: {}", other);
            print_help();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        fail(&e.to_string());
    }
}

fn print_help() {
    println!("{} {} - culture calendar table inspector", BIN_NAME, VERSION);
    println!();
    println!("Usage: {} [-v|-vv|-q] <command> [args]", BIN_NAME);
    println!();
    println!("Commands:");
    println!("  info, i <file>                  Show table header and layout");
    println!("  dump, d <file> [id] [--json]    Show calendar fields (all calendars without id)");
    println!("  find, f <file> <name>           Find a calendar id by name");
    println!("  version                         Show version");
    println!();
    println!("Environment:");
    println!("  RUST_LOG                        Log filter (overrides -v/-q)");
    println!("  CALTABLE_NO_MMAP=1              Read files instead of mapping them");
}

/// Pull `--json`/`-j` out of the arguments; it may appear anywhere.
fn split_json_flag<'a>(args: &[&'a str]) -> (bool, Vec<&'a str>) {
    let json_mode = args.iter().any(|&s| s == "--json" || s == "-j");
    let positional = args.iter().copied().filter(|&s| s != "--json" && s != "-j").collect();
    (json_mode, positional)
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    process::exit(1);
}

fn require_file<'a>(args: &[&'a str], usage: &str) -> &'a str {
    match args.get(1).copied() {
        Some(file) => file,
        None => fail(&format!("missing file argument\nUsage: {} {}", BIN_NAME, usage)),
    }
}

/// Open a table from disk; an empty or missing file is an error here.
fn open(file: &str) -> Result<CalendarTable> {
    CalendarTable::open_strict(TableSource::file(file), &LoadOptions::from_env())
}

fn cmd_info(file: &str) -> Result<()> {
    let table = open(file)?;
    let reader = table.reader();
    let layout = table.layout()?;

    println!("Source:      {}", table.source());
    println!("Size:        {} bytes", reader.len());
    println!("Mapped:      {}", reader.is_mapped());
    println!("Header at:   {}", reader.header_pos());
    println!("Calendars:   {}", layout.count);
    println!("Record size: {} bytes", layout.stride);
    println!("Records at:  {}", layout.record_base);
    println!("Pool at:     {}", layout.pool_base);

    for id in table.calendar_ids() {
        match table.name(id) {
            Ok(name) => println!("  [{}] {}", id, name),
            Err(e) => println!("  [{}] <{}>", id, e),
        }
    }
    Ok(())
}

fn record_json(record: &CalendarRecord) -> Value {
    json!({
        "id": record.id,
        "calendarId": record.calendar_id,
        "twoDigitYearMax": record.two_digit_year_max,
        "currentEra": record.current_era,
        "formatFlags": record.format_flags,
        "name": record.name,
        "dayNames": record.day_names,
        "abbreviatedDayNames": record.abbreviated_day_names,
        "superShortDayNames": record.super_short_day_names,
        "monthNames": record.month_names,
        "abbreviatedMonthNames": record.abbreviated_month_names,
        "leapYearMonthNames": record.leap_year_month_names,
        "shortDatePatterns": record.short_date_patterns,
        "longDatePatterns": record.long_date_patterns,
        "yearMonthPatterns": record.year_month_patterns,
        "monthDayPattern": record.month_day_pattern,
        "eraRanges": record.era_ranges,
        "eraNames": record.era_names,
        "abbreviatedEraNames": record.abbreviated_era_names,
        "abbreviatedEnglishEraNames": record.abbreviated_english_era_names,
    })
}

fn print_record(record: &CalendarRecord) {
    println!("[{}] {} (calendar {})", record.id, record.name, record.calendar_id);
    println!("  Two-digit year max: {}", record.two_digit_year_max);
    println!("  Current era:        {}", record.current_era);
    println!("  Format flags:       0x{:04x}", record.format_flags);
    println!("  Day names:          {:?}", record.day_names);
    println!("  Abbrev day names:   {:?}", record.abbreviated_day_names);
    println!("  Shortest day names: {:?}", record.super_short_day_names);
    println!("  Month names:        {:?}", record.month_names);
    println!("  Abbrev month names: {:?}", record.abbreviated_month_names);
    if !record.leap_year_month_names.is_empty() {
        println!("  Leap month names:   {:?}", record.leap_year_month_names);
    }
    println!("  Short dates:        {:?}", record.short_date_patterns);
    println!("  Long dates:         {:?}", record.long_date_patterns);
    println!("  Year/month:         {:?}", record.year_month_patterns);
    println!("  Month/day:          {:?}", record.month_day_pattern);
    println!("  Era names:          {:?}", record.era_names);
    println!("  Abbrev era names:   {:?}", record.abbreviated_era_names);
    println!("  English eras:       {:?}", record.abbreviated_english_era_names);
    for range in &record.era_ranges {
        println!("  Era range:          {:?}", range);
    }
}

/// Resolve each calendar on its own so one corrupt record does not hide the rest.
fn dump_records(table: &CalendarTable, ids: &[u32]) -> Vec<(u32, Result<CalendarRecord>)> {
    ids.iter().map(|&id| (id, table.record(id))).collect()
}

fn cmd_dump(file: &str, id: Option<u32>, json_mode: bool) -> Result<()> {
    let table = open(file)?;
    let records = match id {
        // A calendar asked for by id has to resolve
        Some(id) => vec![(id, Ok(table.record(id)?))],
        None => dump_records(&table, &table.calendar_ids().collect::<Vec<_>>()),
    };

    if json_mode {
        let out = Value::Array(
            records
                .iter()
                .map(|(id, record)| match record {
                    Ok(record) => record_json(record),
                    Err(e) => json!({ "id": id, "error": e.to_string() }),
                })
                .collect(),
        );
        match serde_json::to_string_pretty(&out) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(&format!("JSON encoding failed: {}", e)),
        }
    } else {
        for (id, record) in &records {
            match record {
                Ok(record) => print_record(record),
                Err(e) => println!("[{}] <{}>", id, e),
            }
        }
    }
    Ok(())
}

fn cmd_find(file: &str, name: &str) -> Result<()> {
    let table = open(file)?;
    match table.find_by_name(&name.to_lowercase())? {
        Some(id) => println!("{}", id),
        None => fail(&format!("no calendar named {:?}", name)),
    }
    Ok(())
}
