use std::collections::HashMap;
use std::hash::Hash;

use chrono::NaiveDate;


pub trait TimeSeriesKey: Hash + Eq + Clone + std::fmt::Debug {}
impl<T: Hash + Eq + Clone + std::fmt::Debug> TimeSeriesKey for T {}


/// Dense per-day series for a set of keys. Day 0 is `start`; `last` passed to
/// `new` is exclusive.
#[derive(Debug, Clone)]
pub struct TimeSeries<T: Hash + Eq, V: Copy> {
	start: NaiveDate,
	keys: HashMap<T, usize>,
	time_series: Vec<Vec<V>>,
	len: usize,
}

impl<T: Hash + Eq, V: Copy> TimeSeries<T, V> {
	pub fn new(start: NaiveDate, last: NaiveDate) -> Self {
		let len = (last - start).num_days().max(0) as usize;
		Self{
			start,
			len,
			keys: HashMap::new(),
			time_series: Vec::new(),
		}
	}

	#[inline(always)]
	pub fn date_index(&self, other: NaiveDate) -> Option<usize> {
		let days = (other - self.start).num_days();
		if days < 0 || days as usize >= self.len {
			return None
		}
		return Some(days as usize)
	}
}

impl<T: TimeSeriesKey, V: Copy + Default> TimeSeries<T, V> {
	pub fn get_or_create(&mut self, k: T) -> &mut [V] {
		let index = match self.keys.get(&k) {
			Some(v) => *v,
			None => {
				let v = self.time_series.len();
				self.time_series.push(vec![V::default(); self.len]);
				self.keys.insert(k, v);
				v
			},
		};
		&mut self.time_series[index][..]
	}

	#[cfg(test)]
	pub fn get(&self, k: &T) -> Option<&[V]> {
		let index = *self.keys.get(k)?;
		Some(&self.time_series[index][..])
	}

	#[cfg(test)]
	pub fn get_value(&self, k: &T, i: usize) -> Option<V> {
		if i >= self.len {
			return None
		}
		self.get(k).map(|v| v[i])
	}

	pub fn keys(&self) -> std::collections::hash_map::Keys<'_, T, usize> {
		self.keys.keys()
	}

	/// Values of all keys on day `i`.
	pub fn column(&self, i: usize) -> impl Iterator<Item = (&T, V)> + '_ {
		let series = &self.time_series;
		self.keys.iter().filter_map(move |(k, index)| {
			series[*index].get(i).map(|v| (k, *v))
		})
	}

	/// Fold keys together. Keys mapped to `None` are dropped; values landing on
	/// the same new key are combined with `merge`.
	pub fn rekeyed<U: TimeSeriesKey, F: Fn(&T) -> Option<U>, M: Fn(V, V) -> V>(&self, f: F, merge: M) -> TimeSeries<U, V> {
		let mut result = TimeSeries::<U, V>{
			start: self.start,
			len: self.len,
			keys: HashMap::new(),
			time_series: Vec::new(),
		};
		for (k_old, index_old) in self.keys.iter() {
			let k_new = match f(k_old) {
				Some(k) => k,
				None => continue,
			};
			let ts_new = result.get_or_create(k_new);
			let ts_old = &self.time_series[*index_old][..];
			assert_eq!(ts_new.len(), ts_old.len());
			for (dst, src) in ts_new.iter_mut().zip(ts_old.iter()) {
				*dst = merge(*dst, *src);
			}
		}
		result
	}
}

impl<T: TimeSeriesKey, V: Copy> TimeSeries<T, Option<V>> {
	/// Replace gaps with the last value seen before them. Slots before the
	/// first value stay empty.
	pub fn carry_forward(&mut self) {
		for vec in self.time_series.iter_mut() {
			let mut last = None;
			for v in vec.iter_mut() {
				match v {
					Some(_) => last = *v,
					None => *v = last,
				}
			}
		}
	}
}
