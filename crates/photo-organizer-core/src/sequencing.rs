//! Date assignment and same-day lettering for unique photos.
//!
//! Photos are spread evenly over an inclusive date range in sequence order.
//! With `n` photos over a span of `d` days (end minus start), photo `i`
//! (0-based, oldest-first) lands `floor(d * i / (n - 1))` days after the start.
//! More photos than days therefore share dates, fewer photos leave gaps, and
//! the last photo always gets the end date. Newest-first is the exact mirror
//! of oldest-first.

use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::fmt;

use crate::config::{Config, DateOrder, NamingFormat};
use crate::discovery::STAGED_PREFIX;
use crate::error::{Error, Result};
use crate::types::PhotoRecord;

/// Input format for user-supplied dates
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Fails when `end` is before `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::Validation(format!(
                "date range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` dates
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.start.format("%b %d, %Y"),
            self.end.format("%b %d, %Y")
        )
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("date range is empty".to_string()));
    }
    NaiveDate::parse_from_str(trimmed, DATE_INPUT_FORMAT).map_err(|e| {
        Error::Validation(format!("invalid date '{}' (expected YYYY-MM-DD): {}", trimmed, e))
    })
}

/// One date per photo, in sequence order
pub fn assign_dates(count: usize, range: &DateRange, order: DateOrder) -> Result<Vec<NaiveDate>> {
    if count == 0 {
        return Err(Error::Validation("there are no photos to sequence".to_string()));
    }

    let span = range.days() - 1;
    let last = (count - 1) as i64;

    let mut dates: Vec<NaiveDate> = (0..count as i64)
        .map(|i| {
            let offset = if last == 0 { 0 } else { span * i / last };
            range.start + chrono::Duration::days(offset)
        })
        .collect();

    if order == DateOrder::NewestFirst {
        dates.reverse();
    }

    Ok(dates)
}

/// Suffix for the `n`-th (0-based) photo of a day: a..z, aa..zz, aaa..
pub fn sequence_letter(n: usize) -> String {
    let mut letters = Vec::new();
    let mut rest = n + 1;
    while rest > 0 {
        rest -= 1;
        letters.push(b'a' + (rest % 26) as u8);
        rest /= 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Assigns dates, letters and final names to the unique photos
pub struct Sequencer {
    format: NamingFormat,
    order: DateOrder,
}

impl Sequencer {
    pub fn new(format: NamingFormat, order: DateOrder) -> Self {
        Self { format, order }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.naming_format, config.date_order)
    }

    /// Date-name photos given in sequence order.
    ///
    /// Nothing is assigned if validation fails.
    pub fn sequence(&self, photos: Vec<PhotoRecord>, range: &DateRange) -> Result<Vec<PhotoRecord>> {
        let dates = assign_dates(photos.len(), range, self.order)?;
        let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();

        let named: Vec<PhotoRecord> = photos
            .into_iter()
            .zip(dates)
            .map(|(mut photo, date)| {
                let counter = per_day.entry(date).or_insert(0);
                let letter = sequence_letter(*counter);
                *counter += 1;

                photo.final_name = Some(format!(
                    "{}{}{}",
                    self.format.format(date),
                    letter,
                    dotted_extension(&photo)
                ));
                photo.assigned_date = Some(date);
                photo.sequence_letter = Some(letter);
                photo
            })
            .collect();

        info!(
            "Sequenced {} photos over {} ({} distinct dates)",
            named.len(),
            range,
            per_day.len()
        );
        Ok(named)
    }

    /// Name photos `photo_NNNN.ext` in sequence order, without dates
    pub fn sequence_undated(&self, photos: Vec<PhotoRecord>) -> Result<Vec<PhotoRecord>> {
        if photos.is_empty() {
            return Err(Error::Validation("there are no photos to sequence".to_string()));
        }

        Ok(photos
            .into_iter()
            .enumerate()
            .map(|(i, mut photo)| {
                photo.final_name = Some(format!(
                    "{}{:04}{}",
                    STAGED_PREFIX,
                    i + 1,
                    dotted_extension(&photo)
                ));
                photo
            })
            .collect())
    }
}

fn dotted_extension(photo: &PhotoRecord) -> String {
    match photo.extension() {
        ext if ext.is_empty() => String::new(),
        ext => format!(".{}", ext),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::organizer::Organizer;
    use std::path::PathBuf;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn photos(names: &[&str]) -> Vec<PhotoRecord> {
        names
            .iter()
            .map(|name| PhotoRecord {
                source_url: None,
                staged_path: PathBuf::from(name),
                content_hash: name.to_string(),
                size: 1,
                dimensions: Some((800, 600)),
                assigned_date: None,
                sequence_letter: None,
                final_name: None,
            })
            .collect()
    }

    #[test]
    fn test_sequence_letters() {
        assert_eq!(sequence_letter(0), "a");
        assert_eq!(sequence_letter(25), "z");
        assert_eq!(sequence_letter(26), "aa");
        assert_eq!(sequence_letter(27), "ab");
        assert_eq!(sequence_letter(51), "az");
        assert_eq!(sequence_letter(52), "ba");
        assert_eq!(sequence_letter(701), "zz");
        assert_eq!(sequence_letter(702), "aaa");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let result = DateRange::parse("2024-02-01", "2024-01-01");
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_bad_dates_are_rejected() {
        assert!(matches!(DateRange::parse("", "2024-01-01"), Err(Error::Validation(_))));
        assert!(matches!(
            DateRange::parse("2024-13-01", "2024-12-01"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_zero_photos_is_rejected() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert!(matches!(
            assign_dates(0, &range, DateOrder::OldestFirst),
            Err(Error::Validation(_))
        ));
        let sequencer = Sequencer::new(NamingFormat::Iso, DateOrder::OldestFirst);
        assert!(sequencer.sequence(Vec::new(), &range).is_err());
        assert!(sequencer.sequence_undated(Vec::new()).is_err());
    }

    #[test]
    fn test_even_spread_covers_both_ends() {
        let range = DateRange::parse("2024-01-01", "2024-01-11").unwrap();
        let dates = assign_dates(6, &range, DateOrder::OldestFirst).unwrap();
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 1),
                date(2024, 1, 3),
                date(2024, 1, 5),
                date(2024, 1, 7),
                date(2024, 1, 9),
                date(2024, 1, 11)
            ]
        );
    }

    #[test]
    fn test_more_photos_than_days_share_dates() {
        let range = DateRange::parse("2024-03-01", "2024-03-02").unwrap();
        let dates = assign_dates(5, &range, DateOrder::OldestFirst).unwrap();
        // floor(1 * i / 4): only the last photo reaches the end date
        assert_eq!(
            dates,
            vec![
                date(2024, 3, 1),
                date(2024, 3, 1),
                date(2024, 3, 1),
                date(2024, 3, 1),
                date(2024, 3, 2)
            ]
        );
    }

    #[test]
    fn test_newest_first_mirrors_oldest_first() {
        let range = DateRange::parse("2023-11-20", "2024-02-03").unwrap();
        for n in 1..40 {
            let oldest = assign_dates(n, &range, DateOrder::OldestFirst).unwrap();
            let newest = assign_dates(n, &range, DateOrder::NewestFirst).unwrap();
            for k in 0..n {
                assert_eq!(oldest[k], newest[n - 1 - k]);
            }
        }
    }

    #[test]
    fn test_single_day_iso_names() {
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        let sequencer = Sequencer::new(NamingFormat::Iso, DateOrder::OldestFirst);
        let named = sequencer
            .sequence(photos(&["photo_0001.jpg", "photo_0002.jpg", "photo_0003.jpg"]), &range)
            .unwrap();

        let names: Vec<_> = named.iter().map(|p| p.final_name.clone().unwrap()).collect();
        assert_eq!(names, vec!["2024-01-01a.jpg", "2024-01-01b.jpg", "2024-01-01c.jpg"]);
    }

    #[test]
    fn test_letters_wrap_to_two_characters_in_names() {
        let range = DateRange::parse("2024-01-01", "2024-01-01").unwrap();
        let names: Vec<String> = (1..=28).map(|i| format!("photo_{:04}.jpg", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();

        let sequencer = Sequencer::new(NamingFormat::TwoDigitYear, DateOrder::OldestFirst);
        let named = sequencer.sequence(photos(&refs), &range).unwrap();

        let final_names: Vec<&str> = named.iter().filter_map(|p| p.final_name.as_deref()).collect();
        assert_eq!(final_names[0], "240101a.jpg");
        assert_eq!(final_names[25], "240101z.jpg");
        assert_eq!(final_names[26], "240101aa.jpg");
        assert_eq!(final_names[27], "240101ab.jpg");
        assert!(Organizer::check_plan(&named).is_ok());
    }

    #[test]
    fn test_letters_are_gap_free_per_date() {
        let range = DateRange::parse("2024-05-01", "2024-05-03").unwrap();
        let names: Vec<String> = (1..=40).map(|i| format!("photo_{:04}.png", i)).collect();
        let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();

        let sequencer = Sequencer::new(NamingFormat::TwoDigitYear, DateOrder::NewestFirst);
        let named = sequencer.sequence(photos(&refs), &range).unwrap();

        let mut by_date: HashMap<NaiveDate, Vec<String>> = HashMap::new();
        for photo in &named {
            by_date
                .entry(photo.assigned_date.unwrap())
                .or_default()
                .push(photo.sequence_letter.clone().unwrap());
        }
        for letters in by_date.values() {
            let expected: Vec<String> = (0..letters.len()).map(sequence_letter).collect();
            assert_eq!(*letters, expected);
        }

        // Newest first: the sequence starts on the last day
        assert_eq!(named[0].final_name.as_deref(), Some("240503a.png"));
        assert_eq!(named[39].assigned_date, Some(date(2024, 5, 1)));
    }

    #[test]
    fn test_undated_names() {
        let sequencer = Sequencer::new(NamingFormat::Iso, DateOrder::OldestFirst);
        let named = sequencer
            .sequence_undated(photos(&["photo_0007.PNG", "photo_0009.jpg"]))
            .unwrap();
        assert_eq!(named[0].final_name.as_deref(), Some("photo_0001.png"));
        assert_eq!(named[1].final_name.as_deref(), Some("photo_0002.jpg"));
        assert_eq!(named[0].assigned_date, None);
    }
}
