//! Turns a downloaded DWD archive into observed temperature samples.

use crate::dwd::error::IngestError;
use crate::dwd::source::HourlySource;
use crate::time_key::{parse_and_key, TimeKey};
use crate::types::sample::{RawFields, Sample};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::collections::HashSet;
use std::io::{Cursor, Read};
use zip::result::ZipError;
use zip::ZipArchive;

/// One file extracted from an archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveMember {
    pub name: String,
    pub contents: Vec<u8>,
}

/// Accepted samples of one product file plus what was left out.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRecords {
    /// In feed order, without sentinel values or repeated keys.
    pub samples: Vec<Sample>,
    pub skipped_missing: usize,
    pub skipped_duplicates: usize,
}

/// Extracts the single member whose name contains `tag`.
pub fn extract_member(archive: &[u8], tag: &str) -> Result<ArchiveMember, IngestError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))?;
    let mut candidates: Vec<String> = zip
        .file_names()
        .filter(|name| name.contains(tag))
        .map(str::to_string)
        .collect();

    let name = match candidates.len() {
        0 => {
            return Err(IngestError::MemberNotFound {
                tag: tag.to_string(),
            })
        }
        1 => candidates.remove(0),
        _ => {
            candidates.sort();
            return Err(IngestError::AmbiguousMember {
                tag: tag.to_string(),
                candidates,
            });
        }
    };

    let mut file = zip.by_name(&name)?;
    let mut contents = Vec::with_capacity(file.size() as usize);
    file.read_to_end(&mut contents).map_err(ZipError::from)?;
    debug!("Extracted {} ({} bytes)", name, contents.len());
    Ok(ArchiveMember { name, contents })
}

fn column_index(headers: &StringRecord, column: &str, member: &str) -> Result<usize, IngestError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| IngestError::MissingColumn {
            member: member.to_string(),
            column: column.to_string(),
        })
}

/// Parses a `;`-separated product file into observed samples.
///
/// Every field is trimmed and kept as a passthrough column of its sample.
/// Rows whose temperature equals the source's missing sentinel are skipped, as are
/// rows repeating an already accepted timestamp.
pub fn parse_records(member: &ArchiveMember, source: &HourlySource) -> Result<ParsedRecords, IngestError> {
    let csv_error = |source: csv::Error| IngestError::Csv {
        member: member.name.clone(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .has_headers(true)
        .flexible(true)
        .from_reader(member.contents.as_slice());

    let headers = reader.headers().map_err(csv_error)?.clone();
    let timestamp_index = column_index(&headers, &source.timestamp_column, &member.name)?;
    let value_index = column_index(&headers, &source.value_column, &member.name)?;

    let mut seen: HashSet<TimeKey> = HashSet::new();
    let mut parsed = ParsedRecords {
        samples: Vec::new(),
        skipped_missing: 0,
        skipped_duplicates: 0,
    };

    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |index: usize, column: &str| {
            record.get(index).ok_or_else(|| IngestError::MissingField {
                line,
                column: column.to_string(),
            })
        };

        let raw_value = field(value_index, &source.value_column)?;
        let temperature: f64 = raw_value.parse().map_err(|_| IngestError::BadTemperature {
            line,
            value: raw_value.to_string(),
        })?;
        if temperature == source.missing_sentinel {
            parsed.skipped_missing += 1;
            continue;
        }

        let raw_timestamp = field(timestamp_index, &source.timestamp_column)?;
        let time_key = parse_and_key(raw_timestamp, &source.feed_zone)
            .map_err(|source| IngestError::BadTimestamp { line, source })?;
        if !seen.insert(time_key) {
            parsed.skipped_duplicates += 1;
            continue;
        }

        let raw: RawFields = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        parsed.samples.push(Sample::observed(time_key, temperature, raw));
    }

    info!(
        "Parsed {} samples from {} ({} missing, {} duplicate rows skipped)",
        parsed.samples.len(),
        member.name,
        parsed.skipped_missing,
        parsed.skipped_duplicates
    );
    Ok(parsed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::time_key::to_key;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    pub(crate) const PRODUCT_CSV: &str = "\
STATIONS_ID;MESS_DATUM;QN_9;TT_TU;RF_TU;eor
      13777;2024010510;    3;   2.5;  91.0;eor
      13777;2024010511;    3;   3.0;  90.0;eor
      13777;2024010512;    3;-999  ;-999  ;eor
      13777;2024010513;    3;   4.0;  85.0;eor
      13777;2024010513;    3;   9.9;  85.0;eor
";

    pub(crate) fn archive_with(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn dwd_archive() -> Vec<u8> {
        archive_with(&[
            ("Metadaten_Geographie_13777.txt", "Stations_id;Stationshoehe\n"),
            ("produkt_tu_stunde_20230411_20241012_13777.txt", PRODUCT_CSV),
        ])
    }

    fn member(contents: &str) -> ArchiveMember {
        ArchiveMember {
            name: "produkt.txt".to_string(),
            contents: contents.as_bytes().to_vec(),
        }
    }

    #[test]
    fn extracts_the_single_matching_member() -> Result<(), IngestError> {
        let member = extract_member(&dwd_archive(), "produkt_tu_stunde_")?;
        assert_eq!(member.name, "produkt_tu_stunde_20230411_20241012_13777.txt");
        assert_eq!(member.contents, PRODUCT_CSV.as_bytes());
        Ok(())
    }

    #[test]
    fn missing_or_ambiguous_members_are_errors() {
        let archive = archive_with(&[("produkt_a.txt", "x"), ("produkt_b.txt", "y")]);
        assert!(matches!(
            extract_member(&archive, "nothing"),
            Err(IngestError::MemberNotFound { .. })
        ));
        match extract_member(&archive, "produkt_") {
            Err(IngestError::AmbiguousMember { candidates, .. }) => {
                assert_eq!(candidates, vec!["produkt_a.txt", "produkt_b.txt"]);
            }
            other => panic!("expected ambiguous member, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_not_an_archive() {
        assert!(matches!(
            extract_member(b"not a zip file", "produkt"),
            Err(IngestError::Archive(_))
        ));
    }

    #[test]
    fn parses_rows_and_skips_sentinels_and_duplicates() -> Result<(), IngestError> {
        let parsed = parse_records(&member(PRODUCT_CSV), &HourlySource::default())?;
        assert_eq!(parsed.samples.len(), 3);
        assert_eq!(parsed.skipped_missing, 1);
        assert_eq!(parsed.skipped_duplicates, 1);

        let first = &parsed.samples[0];
        let expected_key = to_key(&Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap());
        assert_eq!(first.time_key, expected_key);
        assert_eq!(first.temperature, 2.5);
        assert_eq!(first.field("QN_9"), Some("3"));
        assert_eq!(first.field("MESS_DATUM"), Some("2024010510"));

        // The first of two rows for 13:00 wins.
        assert_eq!(parsed.samples[2].temperature, 4.0);
        Ok(())
    }

    #[test]
    fn missing_columns_are_reported() {
        let result = parse_records(
            &member("STATIONS_ID;MESS_DATUM;RF_TU\n1;2024010510;3\n"),
            &HourlySource::default(),
        );
        assert!(matches!(
            result,
            Err(IngestError::MissingColumn { column, .. }) if column == "TT_TU"
        ));
    }

    #[test]
    fn bad_values_are_reported_with_their_line() {
        let result = parse_records(
            &member("MESS_DATUM;TT_TU\n2024010510;warm\n"),
            &HourlySource::default(),
        );
        assert!(matches!(
            result,
            Err(IngestError::BadTemperature { line: 2, .. })
        ));

        let result = parse_records(
            &member("MESS_DATUM;TT_TU\n2024010510;1.0\n20240105;1.0\n"),
            &HourlySource::default(),
        );
        assert!(matches!(result, Err(IngestError::BadTimestamp { line: 3, .. })));
    }

    #[test]
    fn short_rows_are_reported() {
        let result = parse_records(
            &member("MESS_DATUM;TT_TU\n2024010510\n"),
            &HourlySource::default(),
        );
        assert!(matches!(result, Err(IngestError::MissingField { .. })));
    }
}
