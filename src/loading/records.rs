//! External survey record CSVs: sign installations and speed-limit surveys.
//!
//! Raw forms carry the surveyor's original column names; processed forms
//! are the endpoint-matched CSVs that the apply passes and the export
//! consume. A handful of corrupt rows must not abort a resolution pass, so
//! these loaders skip rows that fail to parse.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use geo::Point;
use log::warn;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::model::SignState;
use crate::{Error, NodeId};

/// Raw sign-installation row, as exported by the sign survey.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSignRecord {
    #[serde(rename = "From_X")]
    pub from_x: f64,
    #[serde(rename = "From_Y")]
    pub from_y: f64,
    #[serde(rename = "To_X")]
    pub to_x: f64,
    #[serde(rename = "To_Y")]
    pub to_y: f64,
    #[serde(rename = "Date_Inst", deserialize_with = "date_inst::deserialize", default)]
    pub date_inst: Option<NaiveDate>,
}

/// Raw speed-limit survey row.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSpeedRecord {
    #[serde(rename = "Start_X")]
    pub start_x: f64,
    #[serde(rename = "Start_Y")]
    pub start_y: f64,
    #[serde(rename = "End_X")]
    pub end_x: f64,
    #[serde(rename = "End_Y")]
    pub end_y: f64,
    #[serde(rename = "sg110714", deserialize_with = "yes_flag::deserialize")]
    pub sign_2014: bool,
    #[serde(rename = "sg120415", deserialize_with = "yes_flag::deserialize")]
    pub sign_2015: bool,
    #[serde(rename = "postvz_sg", deserialize_with = "yes_flag::deserialize")]
    pub sign_post_vz: bool,
    #[serde(rename = "postvz_sl", default)]
    pub posted_limit: u16,
    #[serde(default)]
    pub street: String,
}

/// Endpoint-matched sign-installation record.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct SignRecord {
    #[serde(rename = "id_from", with = "node_ref")]
    pub source: Option<NodeId>,
    #[serde(rename = "id_to", with = "node_ref")]
    pub target: Option<NodeId>,
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
    #[serde(with = "date_inst")]
    pub date_inst: Option<NaiveDate>,
}

impl SignRecord {
    pub fn from_point(&self) -> Point<f64> {
        Point::new(self.from_lon, self.from_lat)
    }

    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.to_lon, self.to_lat)
    }

    /// Sign value this record asserts: an installation date means a sign
    /// went in, a dateless row is an observed absence.
    pub fn asserted_sign(&self) -> SignState {
        if self.date_inst.is_some() {
            SignState::Yes
        } else {
            SignState::No
        }
    }
}

/// Endpoint-matched speed-limit record.
#[derive(Debug, Clone, serde::Serialize, Deserialize)]
pub struct SpeedRecord {
    #[serde(rename = "id_from", with = "node_ref")]
    pub source: Option<NodeId>,
    #[serde(rename = "id_to", with = "node_ref")]
    pub target: Option<NodeId>,
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
    #[serde(rename = "sg110714", with = "yes_flag")]
    pub sign_2014: bool,
    #[serde(rename = "sg120415", with = "yes_flag")]
    pub sign_2015: bool,
    #[serde(rename = "postvz_sg", with = "yes_flag")]
    pub sign_post_vz: bool,
    #[serde(rename = "postvz_sl")]
    pub posted_limit: u16,
    #[serde(default)]
    pub street: String,
}

impl SpeedRecord {
    pub fn from_point(&self) -> Point<f64> {
        Point::new(self.from_lon, self.from_lat)
    }

    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.to_lon, self.to_lat)
    }

    /// Sign observations across the survey snapshots, oldest first.
    pub fn snapshots(&self) -> [bool; 3] {
        [self.sign_2014, self.sign_2015, self.sign_post_vz]
    }

    /// Sign state observed by this record: yes if any snapshot saw a sign.
    pub fn observed_sign(&self) -> SignState {
        if self.snapshots().into_iter().any(|seen| seen) {
            SignState::Yes
        } else {
            SignState::No
        }
    }

    pub fn street_hint(&self) -> Option<&str> {
        if self.street.is_empty() {
            None
        } else {
            Some(&self.street)
        }
    }
}

pub fn load_raw_sign_records(path: &Path) -> Result<Vec<RawSignRecord>, Error> {
    Ok(read_rows(File::open(path)?, "raw sign installation"))
}

pub fn read_raw_sign_records<R: Read>(reader: R) -> Vec<RawSignRecord> {
    read_rows(reader, "raw sign installation")
}

pub fn load_raw_speed_records(path: &Path) -> Result<Vec<RawSpeedRecord>, Error> {
    Ok(read_rows(File::open(path)?, "raw speed limit"))
}

pub fn read_raw_speed_records<R: Read>(reader: R) -> Vec<RawSpeedRecord> {
    read_rows(reader, "raw speed limit")
}

pub fn load_sign_records(path: &Path) -> Result<Vec<SignRecord>, Error> {
    Ok(read_rows(File::open(path)?, "sign installation"))
}

pub fn read_sign_records<R: Read>(reader: R) -> Vec<SignRecord> {
    read_rows(reader, "sign installation")
}

pub fn load_speed_records(path: &Path) -> Result<Vec<SpeedRecord>, Error> {
    Ok(read_rows(File::open(path)?, "speed limit"))
}

pub fn read_speed_records<R: Read>(reader: R) -> Vec<SpeedRecord> {
    read_rows(reader, "speed limit")
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R, what: &str) -> Vec<T> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for row in reader.deserialize() {
        match row {
            Ok(value) => rows.push(value),
            Err(err) => {
                skipped += 1;
                warn!("skipping malformed {what} row: {err}");
            }
        }
    }
    if skipped > 0 {
        warn!("{skipped} malformed {what} rows skipped");
    }
    rows
}

/// Node ids as integers with -1 denoting "unmatched", the convention of the
/// offline geocoding pass.
mod node_ref {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::NodeId;

    pub fn serialize<S: Serializer>(value: &Option<NodeId>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(id) => ser.serialize_i64(id.index() as i64),
            None => ser.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NodeId>, D::Error> {
        let raw = i64::deserialize(de)?;
        if raw < 0 {
            Ok(None)
        } else {
            Ok(Some(NodeId::new(raw as usize)))
        }
    }
}

/// Installation dates as the survey writes them, empty when unknown.
mod date_inst {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%m/%d/%Y";

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, ser: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => ser.serialize_str(&date.format(FORMAT).to_string()),
            None => ser.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        de: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let raw = String::deserialize(de)?;
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

/// Survey booleans are coded as the literal `YES`; anything else is a no.
mod yes_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(if *value { "YES" } else { "NO" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(de)?;
        Ok(raw.trim().eq_ignore_ascii_case("yes"))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn processed_sign_rows_parse_ids_and_dates() {
        let csv = "id_from,id_to,from_lat,from_lon,to_lat,to_lon,date_inst\n\
                   3,7,40.1,-73.1,40.2,-73.2,06/15/2014\n\
                   -1,5,40.3,-73.3,40.4,-73.4,\n";
        let records = read_sign_records(Cursor::new(csv));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source, Some(NodeId::new(3)));
        assert_eq!(records[0].target, Some(NodeId::new(7)));
        assert_eq!(
            records[0].date_inst,
            NaiveDate::from_ymd_opt(2014, 6, 15)
        );
        assert_eq!(records[0].asserted_sign(), SignState::Yes);
        assert_eq!(records[1].source, None);
        assert_eq!(records[1].asserted_sign(), SignState::No);
    }

    #[test]
    fn malformed_record_rows_are_skipped_not_fatal() {
        let csv = "id_from,id_to,from_lat,from_lon,to_lat,to_lon,date_inst\n\
                   3,7,40.1,-73.1,40.2,-73.2,not-a-date\n\
                   4,8,40.1,-73.1,40.2,-73.2,\n";
        let records = read_sign_records(Cursor::new(csv));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, Some(NodeId::new(4)));
    }

    #[test]
    fn speed_rows_decode_yes_flags_and_street_hint() {
        let csv = "id_from,id_to,from_lat,from_lon,to_lat,to_lon,sg110714,sg120415,postvz_sg,postvz_sl,street\n\
                   0,1,40.1,-73.1,40.2,-73.2,NO,YES,YES,25,Broadway\n\
                   2,3,40.1,-73.1,40.2,-73.2,NO,NO,NO,0,\n";
        let records = read_speed_records(Cursor::new(csv));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].snapshots(), [false, true, true]);
        assert_eq!(records[0].observed_sign(), SignState::Yes);
        assert_eq!(records[0].posted_limit, 25);
        assert_eq!(records[0].street_hint(), Some("Broadway"));
        assert_eq!(records[1].observed_sign(), SignState::No);
        assert_eq!(records[1].street_hint(), None);
    }

    #[test]
    fn raw_rows_use_the_survey_column_names() {
        let csv = "From_X,From_Y,To_X,To_Y,Date_Inst\n-73.99,40.71,-73.98,40.72,01/02/2015\n";
        let records = read_raw_sign_records(Cursor::new(csv));
        assert_eq!(records.len(), 1);
        assert!((records[0].from_x + 73.99).abs() < 1e-12);
        assert_eq!(
            records[0].date_inst,
            NaiveDate::from_ymd_opt(2015, 1, 2)
        );
    }
}
