use std::fmt;

use enum_map::{Enum, EnumMap};

mod ioutil;
mod error;
mod config;
mod fetch;
mod names;
mod jhu;
mod geo;
mod progress;
mod timeseries;
mod aggregate;
mod history;
mod render;
mod animation;
mod pipeline;

pub use ioutil::{magic_open, list_reports};
pub use error::{Error, Result};
pub use config::*;
pub use fetch::sync_repository;
pub use names::*;
pub use jhu::*;
pub use geo::*;
pub use progress::*;
pub use timeseries::*;
pub use aggregate::*;
pub use history::*;
pub use render::*;
pub use animation::*;
pub use pipeline::*;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Enum)]
pub enum Metric {
	Confirmed,
	Deaths,
	Active,
}

impl Metric {
	pub const ALL: [Metric; 3] = [Metric::Confirmed, Metric::Deaths, Metric::Active];

	/// Column name in the history file.
	pub fn column(&self) -> &'static str {
		match self {
			Self::Confirmed => "Confirmed",
			Self::Deaths => "Deaths",
			Self::Active => "Active",
		}
	}

	/// Human readable title used in frame captions.
	pub fn title(&self) -> &'static str {
		match self {
			Self::Confirmed => "Confirmed infections",
			Self::Deaths => "Deaths",
			Self::Active => "Active cases",
		}
	}

	/// Name of the frame directory and of the GIF.
	pub fn savename(&self) -> &'static str {
		match self {
			Self::Confirmed => "confirmed",
			Self::Deaths => "deaths",
			Self::Active => "active",
		}
	}
}

impl fmt::Display for Metric {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(self.column())
	}
}

/// One value per metric.
pub type Sample = EnumMap<Metric, i64>;
