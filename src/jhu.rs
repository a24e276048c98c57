use std::collections::HashSet;
use std::io;
use std::path::Path;

use log::{info, warn};

use serde::{de, Deserialize, Deserializer};

use chrono::{NaiveDate, NaiveDateTime};

use smartstring::alias::{String as SmartString};

use enum_map::enum_map;

use super::error::Result;
use super::names::normalize_country;
use super::progress::{ProgressSink, StepMeter};
use super::{Metric, Sample};


/// Null-filling count reader: empty cells are zero, float spellings are accepted.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
	where D: Deserializer<'de>
{
	let s = String::deserialize(deserializer)?;
	let s = s.trim();
	if s.is_empty() {
		return Ok(0)
	}
	if let Ok(v) = s.parse::<i64>() {
		return Ok(v)
	}
	let v = s.parse::<f64>().map_err(de::Error::custom)?;
	if !v.is_finite() {
		return Err(de::Error::custom("count must be finite"))
	}
	Ok(v.round() as i64)
}

/// Parse the `Last Update` column. The data set changed its timestamp format
/// several times.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
	let s = s.trim();
	if s.is_empty() {
		return None
	}
	if s.contains('/') {
		let date_part = s.split_whitespace().next()?;
		let year_len = date_part.rsplit('/').next()?.len();
		let (with_time, date_only) = if year_len == 2 {
			(["%m/%d/%y %H:%M", "%m/%d/%y %H:%M:%S"], "%m/%d/%y")
		} else {
			(["%m/%d/%Y %H:%M", "%m/%d/%Y %H:%M:%S"], "%m/%d/%Y")
		};
		for fmt in with_time.iter() {
			if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
				return Some(ts)
			}
		}
		return NaiveDate::parse_from_str(s, date_only).ok()?.and_hms_opt(0, 0, 0)
	}
	for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"].iter() {
		if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
			return Some(ts)
		}
	}
	NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0)
}


#[derive(Debug, Clone, Deserialize)]
struct RawReportRow {
	#[serde(rename = "Country/Region", alias = "Country_Region", default)]
	country_region: Option<SmartString>,
	// a few early files carry the country in a differently named column
	#[serde(rename = "Country", default)]
	country: Option<SmartString>,
	#[serde(rename = "Province/State", alias = "Province_State", default)]
	province: Option<SmartString>,
	#[serde(rename = "Last Update", alias = "Last_Update", default)]
	last_update: Option<String>,
	#[serde(rename = "Confirmed", default, deserialize_with = "lenient_count")]
	confirmed: i64,
	#[serde(rename = "Deaths", default, deserialize_with = "lenient_count")]
	deaths: i64,
	#[serde(rename = "Recovered", default, deserialize_with = "lenient_count")]
	recovered: i64,
}


/// One normalized row of a daily report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Report {
	pub country: SmartString,
	pub province: SmartString,
	pub updated: NaiveDateTime,
	pub confirmed: i64,
	pub deaths: i64,
	pub recovered: i64,
}

impl Report {
	pub fn active(&self) -> i64 {
		self.confirmed - self.deaths - self.recovered
	}

	pub fn date(&self) -> NaiveDate {
		self.updated.date()
	}

	pub fn sample(&self) -> Sample {
		enum_map!{
			Metric::Confirmed => self.confirmed,
			Metric::Deaths => self.deaths,
			Metric::Active => self.active(),
		}
	}

	fn from_raw(raw: RawReportRow) -> Option<Self> {
		let updated = parse_timestamp(raw.last_update.as_deref()?)?;
		let country = raw.country_region
			.filter(|c| !c.trim().is_empty())
			.or(raw.country)
			.filter(|c| !c.trim().is_empty())?;
		Some(Self{
			country: normalize_country(&country),
			province: raw.province.map(|p| p.trim().into()).unwrap_or_default(),
			updated,
			confirmed: raw.confirmed,
			deaths: raw.deaths,
			recovered: raw.recovered,
		})
	}
}


/// Rows of a single report. Rows without a usable timestamp or country are
/// dropped; the second element counts them.
pub fn read_report<R: io::Read>(r: R) -> Result<(Vec<Report>, usize)> {
	let mut r = csv::ReaderBuilder::new()
		.flexible(true)
		.from_reader(r);
	let mut result = Vec::new();
	let mut skipped = 0;
	for row in r.deserialize() {
		let raw: RawReportRow = row?;
		match Report::from_raw(raw) {
			Some(rec) => result.push(rec),
			None => skipped += 1,
		}
	}
	Ok((result, skipped))
}


/// All reports from `files` as one deduplicated table, in file order.
pub fn load_reports<P: AsRef<Path>, S: ProgressSink + ?Sized>(
	s: &mut S,
	files: &[P],
) -> Result<Vec<Report>> {
	let mut seen = HashSet::new();
	let mut result = Vec::new();
	let mut duplicates = 0;
	let mut pm = StepMeter::new(s, files.len());
	for (i, path) in files.iter().enumerate() {
		let path = path.as_ref();
		let r = super::ioutil::magic_open(path)?;
		let (rows, skipped) = read_report(r)?;
		if skipped > 0 {
			warn!("{}: skipped {} rows without country or timestamp", path.display(), skipped);
		}
		for rec in rows {
			if !seen.insert(rec.clone()) {
				duplicates += 1;
				continue
			}
			result.push(rec);
		}
		if i % 10 == 9 {
			pm.update(i+1);
		}
	}
	pm.finish();
	info!("loaded {} rows from {} files ({} duplicates dropped)", result.len(), files.len(), duplicates);
	Ok(result)
}
