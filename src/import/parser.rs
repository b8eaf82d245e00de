// File: ./src/import/parser.rs
// Raw upload -> decoded VEVENTs
use crate::error::ImportError;
use crate::model::RawEvent;
use crate::model::adapter::events_from_calendar;
use icalendar::Calendar;
use std::path::Path;

pub const ICS_EXTENSION: &str = "ics";

pub fn check_extension(filename: &str) -> Result<(), ImportError> {
    match Path::new(filename).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case(ICS_EXTENSION) => Ok(()),
        _ => Err(ImportError::UnsupportedFormat(filename.to_string())),
    }
}

/// Fails before any event is produced; there is no partial result.
pub fn parse_ics(content: &[u8], filename: &str) -> Result<Vec<RawEvent>, ImportError> {
    check_extension(filename)?;
    let text = std::str::from_utf8(content)
        .map_err(|e| ImportError::Decode(format!("{} is not valid UTF-8: {}", filename, e)))?;
    let text = text.trim_start_matches('\u{feff}');
    let calendar: Calendar = text
        .parse()
        .map_err(|e| ImportError::Decode(format!("{}: {}", filename, e)))?;
    Ok(events_from_calendar(&calendar))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ics_files_are_accepted() {
        assert!(check_extension("work.ics").is_ok());
        assert!(check_extension("Work.ICS").is_ok());
        assert!(check_extension("my.work.ics").is_ok());
        assert!(matches!(
            check_extension("work.csv"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            check_extension("work"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_non_utf8_content() {
        let err = parse_ics(&[0xff, 0xfe, 0x00], "cal.ics").unwrap_err();
        assert!(matches!(err, ImportError::Decode(_)));
    }

    #[test]
    fn extension_is_checked_before_decoding() {
        let err = parse_ics(&[0xff], "cal.txt").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }
}
