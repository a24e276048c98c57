use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use smartstring::alias::{String as SmartString};

use super::jhu::Report;
use super::timeseries::TimeSeries;
use super::{Metric, Sample};


/// (country, province). Province is empty for countries reported as a whole.
pub type RegionKey = (SmartString, SmartString);


fn max_sample(a: Sample, b: Sample) -> Sample {
	let mut result = a;
	for (metric, v) in result.iter_mut() {
		*v = (*v).max(b[metric]);
	}
	result
}

fn sum_samples(a: Option<Sample>, b: Option<Sample>) -> Option<Sample> {
	match (a, b) {
		(Some(a), Some(b)) => {
			let mut result = a;
			for (metric, v) in result.iter_mut() {
				*v += b[metric];
			}
			Some(result)
		},
		(a, b) => a.or(b),
	}
}


/// Per-region, per-day maximum of every metric.
#[derive(Debug, Clone)]
pub struct DailyMaxTable {
	by_region: TimeSeries<RegionKey, Option<Sample>>,
	dates: Vec<NaiveDate>,
}

impl DailyMaxTable {
	pub fn from_reports(reports: &[Report]) -> Self {
		let dates: BTreeSet<NaiveDate> = reports.iter().map(Report::date).collect();
		let dates: Vec<NaiveDate> = dates.into_iter().collect();
		let (start, last) = match (dates.first(), dates.last()) {
			(Some(first), Some(last)) => (*first, *last + chrono::Duration::days(1)),
			_ => {
				let epoch = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN);
				(epoch, epoch)
			},
		};
		let mut by_region = TimeSeries::new(start, last);
		for rec in reports {
			let index = match by_region.date_index(rec.date()) {
				Some(i) => i,
				None => continue,
			};
			let k = (rec.country.clone(), rec.province.clone());
			let slot = &mut by_region.get_or_create(k)[index];
			*slot = Some(match *slot {
				Some(prev) => max_sample(prev, rec.sample()),
				None => rec.sample(),
			});
		}
		Self{by_region, dates}
	}

	/// Every day that has at least one report, ascending.
	pub fn dates(&self) -> &[NaiveDate] {
		&self.dates[..]
	}

	pub fn regions(&self) -> impl Iterator<Item = &RegionKey> {
		self.by_region.keys()
	}

	#[cfg(test)]
	pub fn get(&self, country: &str, province: &str, date: NaiveDate) -> Option<Sample> {
		let index = self.by_region.date_index(date)?;
		self.by_region.get_value(&(country.into(), province.into()), index)?
	}

	/// Latest known value per region as of each day, summed per country.
	pub fn as_of(&self) -> AsOfTable {
		let mut latest = self.by_region.clone();
		latest.carry_forward();
		AsOfTable{
			by_country: latest.rekeyed(|(country, _)| Some(country.clone()), sum_samples),
		}
	}
}


/// Per-country totals built from each region's latest report on or before a
/// given day.
#[derive(Debug, Clone)]
pub struct AsOfTable {
	by_country: TimeSeries<SmartString, Option<Sample>>,
}

impl AsOfTable {
	pub fn country_values(&self, metric: Metric, date: NaiveDate) -> BTreeMap<SmartString, i64> {
		let index = match self.by_country.date_index(date) {
			Some(i) => i,
			None => return BTreeMap::new(),
		};
		self.by_country.column(index)
			.filter_map(|(country, v)| Some((country.clone(), v?[metric])))
			.collect()
	}

	pub fn total(&self, metric: Metric, date: NaiveDate) -> i64 {
		self.country_values(metric, date).values().sum()
	}
}
