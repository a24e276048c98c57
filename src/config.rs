use std::env;
use std::path::PathBuf;
use std::time::Duration;

use super::error::{Error, Result};


pub static DEFAULT_REPO_URL: &'static str = "https://github.com/CSSEGISandData/COVID-19.git";
static REPORTS_SUBDIR: &'static str = "csse_covid_19_data/csse_covid_19_daily_reports";


#[derive(Debug, Clone)]
pub struct Config {
	/// Local clone of the JHU CSSE repository.
	pub data_repo: PathBuf,
	pub repo_url: String,
	/// Natural Earth map units shapefile.
	pub shapefile: PathBuf,
	/// Frames go to `<output_dir>/<metric>/`.
	pub output_dir: PathBuf,
	pub history_file: PathBuf,
	pub gif_dir: PathBuf,
	/// Clone or pull the data repository before loading.
	pub fetch: bool,
	pub frame_size: (u32, u32),
	pub total_duration: Duration,
	pub last_frame_duration: Duration,
}

impl Default for Config {
	fn default() -> Self {
		Self{
			data_repo: "COVID-19".into(),
			repo_url: DEFAULT_REPO_URL.into(),
			shapefile: "data_maps/mapunits110m/ne_110m_admin_0_map_units.shp".into(),
			output_dir: "output".into(),
			history_file: "df_history.csv".into(),
			gif_dir: ".".into(),
			fetch: true,
			frame_size: (1550, 800),
			total_duration: Duration::from_secs(10),
			last_frame_duration: Duration::from_secs(2),
		}
	}
}

fn parse_flag(var: &'static str, value: String) -> Result<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" | "" => Ok(false),
		_ => Err(Error::Config{var, value}),
	}
}

impl Config {
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|k| env::var(k).ok())
	}

	/// Apply overrides from `lookup` on top of the defaults.
	pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self> {
		let mut cfg = Self::default();
		if let Some(v) = lookup("COVID_DATA_REPO") {
			cfg.data_repo = v.into();
		}
		if let Some(v) = lookup("COVID_REPO_URL") {
			cfg.repo_url = v;
		}
		if let Some(v) = lookup("COVID_SHAPEFILE") {
			cfg.shapefile = v.into();
		}
		if let Some(v) = lookup("COVID_OUTPUT_DIR") {
			cfg.output_dir = v.into();
		}
		if let Some(v) = lookup("COVID_HISTORY_FILE") {
			cfg.history_file = v.into();
		}
		if let Some(v) = lookup("COVID_GIF_DIR") {
			cfg.gif_dir = v.into();
		}
		if let Some(v) = lookup("COVID_FETCH") {
			cfg.fetch = parse_flag("COVID_FETCH", v)?;
		}
		Ok(cfg)
	}

	pub fn reports_dir(&self) -> PathBuf {
		self.data_repo.join(REPORTS_SUBDIR)
	}

	pub fn frame_dir(&self, savename: &str) -> PathBuf {
		self.output_dir.join(savename)
	}

	pub fn gif_path(&self, savename: &str) -> PathBuf {
		self.gif_dir.join(format!("{}.gif", savename))
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	use std::collections::HashMap;

	fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
		move |k: &str| map.get(k).cloned()
	}

	#[test]
	fn defaults_without_overrides() {
		let cfg = Config::from_lookup(|_| None).unwrap();
		assert_eq!(cfg.reports_dir(), PathBuf::from("COVID-19/csse_covid_19_data/csse_covid_19_daily_reports"));
		assert_eq!(cfg.history_file, PathBuf::from("df_history.csv"));
		assert_eq!(cfg.gif_path("deaths"), PathBuf::from("./deaths.gif"));
		assert!(cfg.fetch);
	}

	#[test]
	fn overrides_apply() {
		let cfg = Config::from_lookup(lookup_from(&[
			("COVID_OUTPUT_DIR", "/tmp/frames"),
			("COVID_FETCH", "no"),
		])).unwrap();
		assert_eq!(cfg.frame_dir("active"), PathBuf::from("/tmp/frames/active"));
		assert!(!cfg.fetch);
	}

	#[test]
	fn bad_flag_is_rejected() {
		match Config::from_lookup(lookup_from(&[("COVID_FETCH", "maybe")])) {
			Err(Error::Config{var, value}) => {
				assert_eq!(var, "COVID_FETCH");
				assert_eq!(value, "maybe");
			},
			other => panic!("unexpected result: {:?}", other),
		}
	}
}
