//! Parser for the movie dataset CSV.
//!
//! The dataset is a headered CSV. Three of its columns hold serialized lists
//! such as `['United States of America', 'France']`; those are parsed into
//! real `Vec<String>` here, once, so no query ever re-parses them.

use crate::error::{DataLoadError, Result};
use crate::types::MovieRecord;
use rayon::prelude::*;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;
use tracing::warn;

/// One CSV row as it appears on disk.
///
/// Every field is optional: empty cells deserialize to `None` and columns we
/// do not use are ignored by the csv deserializer.
#[derive(Debug, Deserialize)]
struct RawMovieRow {
    title: Option<String>,
    overview: Option<String>,
    genres: Option<String>,
    #[serde(rename = "btc_name")]
    collection: Option<String>,
    original_language: Option<String>,
    countries: Option<String>,
    companies: Option<String>,
    #[serde(rename = "Directors")]
    directors: Option<String>,
    runtime: Option<f64>,
    release_year: Option<f64>,
    budget: Option<f64>,
    revenue: Option<f64>,
    #[serde(rename = "return")]
    return_ratio: Option<f64>,
    popularity: Option<f64>,
}

/// Parse the dataset file at `path`.
pub fn parse_movies_file(path: &Path) -> Result<Vec<MovieRecord>> {
    if !path.exists() {
        return Err(DataLoadError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let file = File::open(path)?;
    parse_movies(file)
}

/// Parse CSV rows from any reader.
///
/// Rows are deserialized sequentially (the CSV format forces that), then
/// converted into `MovieRecord`s in parallel since list parsing dominates.
pub fn parse_movies<R: Read>(reader: R) -> Result<Vec<MovieRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut raw_rows = Vec::new();
    for row in csv_reader.deserialize::<RawMovieRow>() {
        raw_rows.push(row?);
    }

    raw_rows
        .into_par_iter()
        .enumerate()
        // line 1 is the header
        .map(|(idx, raw)| convert_row(raw, idx + 2))
        .collect()
}

fn convert_row(raw: RawMovieRow, line: usize) -> Result<MovieRecord> {
    let list_column = |column: &str, text: &Option<String>| -> Result<Vec<String>> {
        parse_list_literal(text.as_deref().unwrap_or("")).map_err(|e| DataLoadError::ParseError {
            line,
            column: column.to_string(),
            reason: e.to_string(),
        })
    };

    let countries = list_column("countries", &raw.countries)?;
    let companies = list_column("companies", &raw.companies)?;
    let directors = directors_column(raw.directors.as_deref().unwrap_or(""), line);

    Ok(MovieRecord {
        title: raw.title.unwrap_or_default(),
        overview: raw.overview.unwrap_or_default(),
        genres: raw.genres.unwrap_or_default(),
        collection: raw.collection.unwrap_or_default(),
        original_language: raw.original_language.unwrap_or_default(),
        countries,
        countries_raw: raw.countries.unwrap_or_default(),
        companies,
        companies_raw: raw.companies.unwrap_or_default(),
        directors,
        runtime: raw.runtime,
        // years are written as floats when the column has gaps ("1995.0")
        release_year: raw.release_year.map(|y| y as i32),
        budget: raw.budget,
        revenue: raw.revenue,
        return_ratio: raw.return_ratio,
        popularity: raw.popularity,
    })
}

/// Director names of one row.
///
/// Director lookups only ever compare whole names, so a cell that is not a
/// list literal is kept as a single name instead of failing the load.
fn directors_column(text: &str, line: usize) -> Vec<String> {
    match parse_list_literal(text) {
        Ok(names) => names,
        Err(e) => {
            warn!("line {}: Directors cell is not a list, keeping it verbatim: {}", line, e);
            vec![text.trim().to_string()]
        }
    }
}

/// Parse a serialized list of quoted strings.
///
/// Accepts `['a', "b's", 'c\'d']`, a trailing comma, `[]`, and blank text
/// (treated as an empty list). Items use Python string-literal escapes:
/// `\\`, `\'`, `\"`, `\n`, `\r`, `\t`, `\a`, `\b`, `\f`, `\v`, octal `\0`..`\777`,
/// `\xNN`, `\uNNNN` and `\UNNNNNNNN`. An unrecognized escape keeps its backslash.
pub fn parse_list_literal(text: &str) -> Result<Vec<String>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| invalid_list(text, "expected surrounding brackets"))?;

    let mut items = Vec::new();
    let mut chars = inner.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(c) => return Err(invalid_list(text, &format!("unexpected character '{}'", c))),
        };

        let mut item = String::new();
        loop {
            match chars.next() {
                None => return Err(invalid_list(text, "unterminated string")),
                Some('\\') => decode_escape(&mut chars, &mut item)
                    .map_err(|reason| invalid_list(text, reason))?,
                Some(c) if c == quote => break,
                Some(c) => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(c) => return Err(invalid_list(text, &format!("expected ',' but found '{}'", c))),
        }
    }

    Ok(items)
}

/// Decode the escape sequence following a backslash into `item`.
fn decode_escape(chars: &mut Peekable<Chars<'_>>, item: &mut String) -> std::result::Result<(), &'static str> {
    let escaped = match chars.next().ok_or("dangling escape")? {
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'a' => '\u{07}',
        'b' => '\u{08}',
        'f' => '\u{0c}',
        'v' => '\u{0b}',
        c @ ('\\' | '\'' | '"') => c,
        'x' => hex_escape(chars, 2)?,
        'u' => hex_escape(chars, 4)?,
        'U' => hex_escape(chars, 8)?,
        first @ '0'..='7' => {
            let mut code = first.to_digit(8).unwrap_or(0);
            for _ in 0..2 {
                match chars.next_if(|c| c.is_digit(8)) {
                    Some(digit) => code = code * 8 + digit.to_digit(8).unwrap_or(0),
                    None => break,
                }
            }
            char::from_u32(code).ok_or("invalid octal escape")?
        }
        other => {
            item.push('\\');
            other
        }
    };
    item.push(escaped);
    Ok(())
}

/// Read exactly `digits` hex digits and turn them into a character.
fn hex_escape(chars: &mut Peekable<Chars<'_>>, digits: usize) -> std::result::Result<char, &'static str> {
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or("truncated hex escape")?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or("escape is not a valid character")
}

/// Serialize names back into the list form used by the dataset.
///
/// Single quotes are used unless the item itself contains one.
pub fn to_list_literal<S: AsRef<str>>(items: &[S]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|item| {
            let item = item.as_ref().replace('\\', "\\\\");
            if item.contains('\'') && !item.contains('"') {
                format!("\"{}\"", item)
            } else {
                format!("'{}'", item.replace('\'', "\\'"))
            }
        })
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn invalid_list(text: &str, reason: &str) -> DataLoadError {
    DataLoadError::InvalidValue {
        field: "list literal".to_string(),
        value: format!("{} ({})", text, reason),
    }
}
