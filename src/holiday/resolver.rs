use super::types::*;

/// First public holiday, in provider order, that falls on `weekday`.
///
/// Records with an absent name, weekday or public flag never match.
pub fn find_holiday(dataset: &HolidayDataset, weekday: u8) -> Option<&HolidayRecord> {
    dataset.holidays.iter().find(|record| {
        record.name.is_some() && record.weekday == Some(weekday) && record.public == Some(true)
    })
}
