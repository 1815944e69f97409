//! Export a derived series to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{DerivedSeries, IndicatorDefinition};
use crate::error::AppError;

const HEADER: [&str; 6] = ["date", "value", "indicator", "source_id", "transform", "last_updated"];

/// Write `series` for `definition` to a CSV file at `path`.
pub fn write_series_csv(path: &Path, definition: &IndicatorDefinition, series: &DerivedSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_series(file, definition, series)
}

/// Write CSV rows to any writer.
pub fn write_series<W: Write>(writer: W, definition: &IndicatorDefinition, series: &DerivedSeries) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let last_updated = series.last_updated.as_deref().unwrap_or("");
    for p in &series.points {
        wtr.write_record([
            p.date.to_string().as_str(),
            format!("{:.6}", p.value).as_str(),
            definition.name,
            definition.source_id,
            definition.transform.label(),
            last_updated,
        ])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::ObservationPoint;
    use crate::registry;

    #[test]
    fn writes_header_and_quoted_names() {
        let def = registry::find("Job Openings, JOLTS (millions)").unwrap();
        let series = DerivedSeries::new(
            vec![ObservationPoint::new(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(), 7.6)],
            Some("2025-02-04".to_string()),
        );

        let mut buf = Vec::new();
        write_series(&mut buf, def, &series).unwrap();
        let text = String::from_utf8(buf).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("date,value,indicator,source_id,transform,last_updated"));
        assert_eq!(
            lines.next(),
            Some("2024-12-01,7.600000,\"Job Openings, JOLTS (millions)\",JTSJOL,level_millions,2025-02-04")
        );
        assert_eq!(lines.next(), None);
    }
}
