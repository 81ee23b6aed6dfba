//! Date-filtered spreadsheet export of requirements.
//!
//! Filtering and row flattening are pure functions of their inputs; the
//! workbook writer turns rows into `.xlsx` bytes.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::constants::export::SHEET_NAME;
use crate::models::{FlagGroup, RequirementRecord};
use crate::services::requirement_service::RequirementError;

/// Which submission dates an export includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Yesterday,
    All,
    Year(i32),
    Month { year: i32, month: u32 },
    /// No usable criteria were given; every record passes.
    Unfiltered,
}

impl DateFilter {
    /// Interprets the `filterBy`, `year` and `month` query parameters.
    ///
    /// `filterBy` wins when it names a known filter. Otherwise `year` alone
    /// selects a calendar year and `year` with `month` selects a calendar
    /// month. Anything else, including `month` without `year`, passes all.
    pub fn from_query(
        filter_by: Option<&str>,
        year: Option<&str>,
        month: Option<&str>,
    ) -> Result<Self, String> {
        match filter_by {
            Some("Today") => return Ok(Self::Today),
            Some("Yesterday") => return Ok(Self::Yesterday),
            Some("All") => return Ok(Self::All),
            _ => {}
        }

        let year = year.map(str::trim).filter(|s| !s.is_empty());
        let month = month.map(str::trim).filter(|s| !s.is_empty());

        match (year, month) {
            (Some(year), None) => Ok(Self::Year(parse_year(year)?)),
            (Some(year), Some(month)) => Ok(Self::Month {
                year: parse_year(year)?,
                month: parse_month(month)?,
            }),
            (None, _) => Ok(Self::Unfiltered),
        }
    }

    #[must_use]
    pub fn matches(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match *self {
            Self::Today => date == today,
            Self::Yesterday => Some(date) == today.checked_sub_signed(TimeDelta::days(1)),
            Self::All | Self::Unfiltered => true,
            Self::Year(year) => date.year() == year,
            Self::Month { year, month } => date.year() == year && date.month() == month,
        }
    }
}

fn parse_year(value: &str) -> Result<i32, String> {
    value
        .parse::<i32>()
        .ok()
        .filter(|y| (1..=9999).contains(y))
        .ok_or_else(|| format!("Invalid year: {value}"))
}

fn parse_month(value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| format!("Invalid month: {value}. Month must be between 1 and 12"))
}

/// Records whose submission date, in the reporting `offset`, passes `filter`.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [RequirementRecord],
    filter: DateFilter,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<&'a RequirementRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r.submitted_at.with_timezone(&offset).date_naive(), today))
        .collect()
}

struct Column {
    header: &'static str,
    width: f64,
}

const COLUMNS: [Column; 14] = [
    Column { header: "Role", width: 20.0 },
    Column { header: "Name", width: 30.0 },
    Column { header: "Phone", width: 15.0 },
    Column { header: "Email", width: 30.0 },
    Column { header: "Date", width: 20.0 },
    Column { header: "Property Type", width: 20.0 },
    Column { header: "Area Sqft", width: 15.0 },
    Column { header: "Min Budget", width: 15.0 },
    Column { header: "Max Budget", width: 15.0 },
    Column { header: "Sell/Rent", width: 10.0 },
    Column { header: "Condition", width: 30.0 },
    Column { header: "Residential Availability", width: 25.0 },
    Column { header: "Commercial Availability", width: 25.0 },
    Column { header: "Facing", width: 20.0 },
];

#[must_use]
pub fn headers() -> Vec<&'static str> {
    COLUMNS.iter().map(|c| c.header).collect()
}

/// One flattened spreadsheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct RequirementRow {
    pub role: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub date: NaiveDateTime,
    pub property_type: String,
    pub area_sqft: String,
    pub min_budget: f64,
    pub max_budget: f64,
    pub sell_rent: String,
    pub condition: String,
    pub residential_availability: String,
    pub commercial_availability: String,
    pub facing: String,
}

impl RequirementRow {
    pub fn from_record(
        record: &RequirementRecord,
        offset: FixedOffset,
    ) -> Result<Self, RequirementError> {
        let details =
            record
                .property_details
                .as_ref()
                .ok_or(RequirementError::MalformedRecord {
                    id: record.id,
                    field: "RequiredPropertyDetails",
                })?;

        Ok(Self {
            role: record.role.clone(),
            name: record.name.clone(),
            phone: record.phone.clone(),
            email: record.email.clone(),
            date: record.submitted_at.with_timezone(&offset).naive_local(),
            property_type: details.property_type.clone(),
            area_sqft: format!("{} - {}", details.area_sqft.min, details.area_sqft.max),
            min_budget: details.budget.min,
            max_budget: details.budget.max,
            sell_rent: details.sell_or_rent.to_string(),
            condition: record.condition.joined(),
            residential_availability: record.residential_availability.joined(),
            commercial_availability: record.commercial_availability.joined(),
            facing: record.facing.joined(),
        })
    }
}

/// Flattens every record, failing on the first one that cannot be rendered.
pub fn build_rows(
    records: &[&RequirementRecord],
    offset: FixedOffset,
) -> Result<Vec<RequirementRow>, RequirementError> {
    records
        .iter()
        .map(|r| RequirementRow::from_record(r, offset))
        .collect()
}

/// Writes a single-sheet workbook with a bold header row.
pub fn write_workbook(rows: &[RequirementRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, column) in (0u16..).zip(COLUMNS.iter()) {
        worksheet.set_column_width(col, column.width)?;
        worksheet.write_string_with_format(0, col, column.header, &bold)?;
    }

    for (row, r) in (1u32..).zip(rows) {
        worksheet.write_string(row, 0, &r.role)?;
        worksheet.write_string(row, 1, &r.name)?;
        worksheet.write_string(row, 2, &r.phone)?;
        worksheet.write_string(row, 3, &r.email)?;
        worksheet.write_datetime_with_format(row, 4, &r.date, &date_format)?;
        worksheet.write_string(row, 5, &r.property_type)?;
        worksheet.write_string(row, 6, &r.area_sqft)?;
        worksheet.write_number(row, 7, r.min_budget)?;
        worksheet.write_number(row, 8, r.max_budget)?;
        worksheet.write_string(row, 9, &r.sell_rent)?;
        worksheet.write_string(row, 10, &r.condition)?;
        worksheet.write_string(row, 11, &r.residential_availability)?;
        worksheet.write_string(row, 12, &r.commercial_availability)?;
        worksheet.write_string(row, 13, &r.facing)?;
    }

    workbook.save_to_buffer()
}
