use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{de, Deserialize, Deserializer, Serialize};

use chrono::NaiveDate;

use enum_map::EnumMap;

use super::error::Result;
use super::Metric;


// pandas-era files store totals as floats
fn lenient_total<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
	where D: Deserializer<'de>
{
	let s: Option<String> = Option::deserialize(deserializer)?;
	let s = match s.as_deref().map(str::trim) {
		None | Some("") | Some("nan") | Some("NaN") => return Ok(None),
		Some(s) => s,
	};
	if let Ok(v) = s.parse::<i64>() {
		return Ok(Some(v))
	}
	let v = s.parse::<f64>().map_err(de::Error::custom)?;
	if !v.is_finite() {
		return Ok(None)
	}
	Ok(Some(v.round() as i64))
}


#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryRow {
	// pandas leaves the index column header empty
	#[serde(alias = "")]
	date: NaiveDate,
	#[serde(rename = "Confirmed", default, deserialize_with = "lenient_total")]
	confirmed: Option<i64>,
	#[serde(rename = "Deaths", default, deserialize_with = "lenient_total")]
	deaths: Option<i64>,
	#[serde(rename = "Active", default, deserialize_with = "lenient_total")]
	active: Option<i64>,
}


/// National total per day and metric, persisted between runs so that frames
/// which were already rendered are not computed again.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
	rows: BTreeMap<NaiveDate, EnumMap<Metric, Option<i64>>>,
}

impl History {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn read<R: io::Read>(r: R) -> Result<Self> {
		let mut result = Self::new();
		let mut r = csv::Reader::from_reader(r);
		for row in r.deserialize() {
			let rec: HistoryRow = row?;
			let entry = result.rows.entry(rec.date).or_default();
			entry[Metric::Confirmed] = rec.confirmed;
			entry[Metric::Deaths] = rec.deaths;
			entry[Metric::Active] = rec.active;
		}
		Ok(result)
	}

	/// A missing file is an empty history.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let f = match fs::File::open(path) {
			Ok(f) => f,
			Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
			Err(other) => return Err(other.into()),
		};
		Self::read(f)
	}

	pub fn write<W: io::Write>(&self, w: W) -> Result<()> {
		let mut w = csv::Writer::from_writer(w);
		for (date, values) in self.rows.iter() {
			w.serialize(HistoryRow{
				date: *date,
				confirmed: values[Metric::Confirmed],
				deaths: values[Metric::Deaths],
				active: values[Metric::Active],
			})?;
		}
		if self.rows.is_empty() {
			w.write_record(&["date", "Confirmed", "Deaths", "Active"])?;
		}
		w.flush()?;
		Ok(())
	}

	/// Write next to `path` and rename over it, so an interrupted run never
	/// leaves a truncated file behind.
	pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
		let path = path.as_ref();
		let mut tmp = path.as_os_str().to_owned();
		tmp.push(".tmp");
		{
			let f = fs::File::create(&tmp)?;
			self.write(io::BufWriter::new(f))?;
		}
		fs::rename(&tmp, path)?;
		Ok(())
	}

	pub fn get(&self, date: NaiveDate, metric: Metric) -> Option<i64> {
		self.rows.get(&date)?[metric]
	}

	pub fn contains(&self, date: NaiveDate, metric: Metric) -> bool {
		self.get(date, metric).is_some()
	}

	pub fn record(&mut self, date: NaiveDate, metric: Metric, total: i64) {
		self.rows.entry(date).or_default()[metric] = Some(total);
	}

	/// Known values of `metric` up to and including `date`, oldest first.
	pub fn series_until(&self, metric: Metric, date: NaiveDate) -> Vec<i64> {
		self.rows.range(..=date).filter_map(|(_, v)| v[metric]).collect()
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}
