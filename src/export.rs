use crate::aggregate::AggregatedSeries;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Writes `label,value` rows with a header line.
pub fn write_series<W: Write>(writer: W, series: &AggregatedSeries) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["label", "value"])?;
    for (label, value) in series.iter() {
        wtr.serialize((label, value))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_series_file(path: &Path, series: &AggregatedSeries) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file: {:?}", path))?;
    write_series(file, series)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_rows_in_series_order() {
        let series = AggregatedSeries {
            labels: vec!["Labor".to_string(), "Torture".to_string()],
            values: vec![2.0, 5.5],
        };
        let mut out = Vec::new();
        write_series(&mut out, &series).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "label,value\nLabor,2.0\nTorture,5.5\n");
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.csv");
        write_series_file(&path, &AggregatedSeries::default()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "label,value\n");
    }
}
