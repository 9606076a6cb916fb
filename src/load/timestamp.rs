// src/load/timestamp.rs
use calamine::{Data, DataType};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::FileError;
use crate::load::SheetTable;

/// Date formats accepted in string cells, tried in order.
const DATE_FORMATS: &[&str] = &["%d.%m.%Y", "%Y-%m-%d", "%d.%m.%y", "%d/%m/%Y"];

/// Time formats accepted in string cells, tried in order.
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// Full timestamps accepted when the whole datetime lives in the date cell.
const DATETIME_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Combine the date and time columns of every row into one timestamp.
/// Any row that cannot be combined fails the whole file (the batch skips
/// it and moves on); blank rows were already dropped at load time.
pub fn build_timestamps(table: &SheetTable) -> Result<Vec<NaiveDateTime>, FileError> {
    let mut stamps = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let date_cell = &row[0];
        let time_cell = &row[1];
        let stamp = combine(date_cell, time_cell).ok_or_else(|| FileError::TimestampParse {
            // 1-based spreadsheet row number, counting the header row
            row: i + 2,
            date: date_cell.to_string(),
            time: time_cell.to_string(),
        })?;
        stamps.push(stamp);
    }
    Ok(stamps)
}

fn combine(date: &Data, time: &Data) -> Option<NaiveDateTime> {
    if time.is_empty() {
        // some exports carry one combined timestamp column and leave the
        // time column blank
        return parse_datetime_cell(date);
    }
    Some(NaiveDateTime::new(
        parse_date_cell(date)?,
        parse_time_cell(time)?,
    ))
}

pub fn parse_date_cell(cell: &Data) -> Option<NaiveDate> {
    if let Some(dt) = cell.as_datetime() {
        return Some(dt.date());
    }
    match cell {
        Data::String(s) => parse_date_str(s),
        _ => None,
    }
}

pub fn parse_time_cell(cell: &Data) -> Option<NaiveTime> {
    if let Some(dt) = cell.as_datetime() {
        return Some(dt.time());
    }
    match cell {
        Data::String(s) => parse_time_str(s),
        _ => None,
    }
}

fn parse_datetime_cell(cell: &Data) -> Option<NaiveDateTime> {
    if let Some(dt) = cell.as_datetime() {
        return Some(dt);
    }
    match cell {
        Data::String(s) => {
            let s = s.trim();
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| parse_date_str(s).map(|d| d.and_time(NaiveTime::MIN)))
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_time_str(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}
