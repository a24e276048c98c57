use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use chrono::NaiveDate;

use super::aggregate::{AsOfTable, DailyMaxTable};
use super::animation::assemble_gif;
use super::config::Config;
use super::error::Result;
use super::fetch::sync_repository;
use super::geo::WorldMap;
use super::history::History;
use super::ioutil::list_reports;
use super::jhu::load_reports;
use super::progress::{default_output, ProgressSink, StepMeter};
use super::render::{Frame, FrameRenderer};
use super::Metric;


/// Where rendered frames end up.
pub trait FrameSink {
	fn draw(&mut self, path: &Path, frame: &Frame) -> Result<()>;
}

impl<'m> FrameSink for FrameRenderer<'m> {
	fn draw(&mut self, path: &Path, frame: &Frame) -> Result<()> {
		self.render(path, frame)
	}
}


pub fn frame_path<P: AsRef<Path>>(dir: P, date: NaiveDate) -> PathBuf {
	dir.as_ref().join(date.format("img%Y%m%d.png").to_string())
}


#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
	pub rendered: usize,
	pub cached: usize,
}


/// Render every date of `metric` that the history does not know yet.
///
/// The history is written to `history_path` before each frame is drawn, so an
/// interrupted run resumes at the frame it was working on.
pub fn render_metric<F: FrameSink + ?Sized, S: ProgressSink + ?Sized>(
	s: &mut S,
	sink: &mut F,
	as_of: &AsOfTable,
	dates: &[NaiveDate],
	history: &mut History,
	history_path: &Path,
	metric: Metric,
	frame_dir: &Path,
) -> Result<FrameStats> {
	let mut stats = FrameStats::default();
	let mut pm = StepMeter::new(s, dates.len());
	for (i, date) in dates.iter().enumerate() {
		if history.contains(*date, metric) {
			debug!("{} {} already in history", metric, date);
			stats.cached += 1;
			continue
		}

		let countries = as_of.country_values(metric, *date);
		let total: i64 = countries.values().sum();
		history.record(*date, metric, total);
		history.save(history_path)?;

		let series = history.series_until(metric, *date);
		let frame = Frame{
			date: *date,
			title: metric.title(),
			countries: &countries,
			history: &series[..],
		};
		sink.draw(&frame_path(frame_dir, *date), &frame)?;
		stats.rendered += 1;
		pm.update(i+1);
	}
	pm.finish();
	Ok(stats)
}


/// Full batch: sync data, load, aggregate, render every metric, assemble GIFs.
pub fn run(cfg: &Config) -> Result<()> {
	if cfg.fetch {
		sync_repository(&cfg.repo_url, &cfg.data_repo)?;
	}

	info!("loading daily reports from {} ...", cfg.reports_dir().display());
	let files = list_reports(cfg.reports_dir())?;
	let reports = load_reports(&mut *default_output(), &files[..])?;

	info!("aggregating daily maxima ...");
	let table = DailyMaxTable::from_reports(&reports[..]);
	drop(reports);
	let as_of = table.as_of();
	info!("{} dates, {} regions", table.dates().len(), table.regions().count());

	info!("loading map from {} ...", cfg.shapefile.display());
	let world = WorldMap::load(&cfg.shapefile)?;
	let mut renderer = FrameRenderer::new(&world, cfg.frame_size);

	let mut history = History::load(&cfg.history_file)?;
	info!("history has {} dates", history.len());

	for metric in Metric::ALL.iter() {
		let frame_dir = cfg.frame_dir(metric.savename());
		fs::create_dir_all(&frame_dir)?;

		info!("processing {} ...", metric);
		let stats = render_metric(
			&mut *default_output(),
			&mut renderer,
			&as_of,
			table.dates(),
			&mut history,
			&cfg.history_file,
			*metric,
			&frame_dir,
		)?;
		info!("{}: {} frames rendered, {} already in history", metric, stats.rendered, stats.cached);

		assemble_gif(
			&frame_dir,
			cfg.gif_path(metric.savename()),
			cfg.total_duration,
			cfg.last_frame_duration,
		)?;
	}
	Ok(())
}


#[cfg(test)]
mod tests {
	use super::*;

	use crate::jhu::Report;
	use crate::progress::NullSink;

	#[derive(Default)]
	struct RecordingSink {
		frames: Vec<(PathBuf, NaiveDate, usize, Vec<i64>)>,
	}

	impl FrameSink for RecordingSink {
		fn draw(&mut self, path: &Path, frame: &Frame) -> Result<()> {
			self.frames.push((path.to_path_buf(), frame.date, frame.countries.len(), frame.history.to_vec()));
			Ok(())
		}
	}

	struct FailingSink;

	impl FrameSink for FailingSink {
		fn draw(&mut self, _path: &Path, _frame: &Frame) -> Result<()> {
			Err(crate::Error::Draw("boom".into()))
		}
	}

	fn day(d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(2020, 3, d).unwrap()
	}

	fn report(country: &str, d: u32, confirmed: i64) -> Report {
		Report{
			country: country.into(),
			province: "".into(),
			updated: day(d).and_hms_opt(12, 0, 0).unwrap(),
			confirmed,
			deaths: 0,
			recovered: 0,
		}
	}

	fn table() -> DailyMaxTable {
		DailyMaxTable::from_reports(&[
			report("Italy", 1, 10),
			report("France", 1, 5),
			report("Italy", 2, 20),
			report("Italy", 4, 40),
		])
	}

	#[test]
	fn frame_file_names() {
		assert_eq!(frame_path("output/deaths", day(7)), PathBuf::from("output/deaths/img20200307.png"));
	}

	#[test]
	fn renders_each_date_and_persists_history() {
		let dir = tempfile::tempdir().unwrap();
		let history_path = dir.path().join("history.csv");
		let table = table();
		let mut history = History::new();
		let mut sink = RecordingSink::default();

		let stats = render_metric(&mut NullSink, &mut sink, &table.as_of(), table.dates(), &mut history, &history_path, Metric::Confirmed, dir.path()).unwrap();
		assert_eq!(stats, FrameStats{rendered: 3, cached: 0});

		let dates: Vec<_> = sink.frames.iter().map(|f| f.1).collect();
		assert_eq!(dates, vec![day(1), day(2), day(4)]);
		assert_eq!(sink.frames[0].0, dir.path().join("img20200301.png"));
		assert_eq!(sink.frames[0].2, 2);
		assert_eq!(sink.frames[2].3, vec![15, 25, 45]);

		let stored = History::load(&history_path).unwrap();
		assert_eq!(stored, history);
		assert_eq!(stored.get(day(2), Metric::Confirmed), Some(25));
		assert_eq!(stored.get(day(2), Metric::Deaths), None);
	}

	#[test]
	fn second_run_skips_known_dates() {
		let dir = tempfile::tempdir().unwrap();
		let history_path = dir.path().join("history.csv");
		let table = table();
		let mut history = History::new();
		history.record(day(1), Metric::Confirmed, 15);
		history.record(day(2), Metric::Confirmed, 999);
		let mut sink = RecordingSink::default();

		let stats = render_metric(&mut NullSink, &mut sink, &table.as_of(), table.dates(), &mut history, &history_path, Metric::Confirmed, dir.path()).unwrap();
		assert_eq!(stats, FrameStats{rendered: 1, cached: 2});
		assert_eq!(sink.frames.len(), 1);
		assert_eq!(sink.frames[0].1, day(4));
		// known values are never recomputed
		assert_eq!(history.get(day(2), Metric::Confirmed), Some(999));
		assert_eq!(sink.frames[0].3, vec![15, 999, 45]);
	}

	#[test]
	fn metrics_are_cached_independently() {
		let dir = tempfile::tempdir().unwrap();
		let history_path = dir.path().join("history.csv");
		let table = table();
		let mut history = History::new();
		let as_of = table.as_of();
		render_metric(&mut NullSink, &mut RecordingSink::default(), &as_of, table.dates(), &mut history, &history_path, Metric::Confirmed, dir.path()).unwrap();

		let mut sink = RecordingSink::default();
		let stats = render_metric(&mut NullSink, &mut sink, &as_of, table.dates(), &mut history, &history_path, Metric::Deaths, dir.path()).unwrap();
		assert_eq!(stats.rendered, 3);
		assert_eq!(history.get(day(4), Metric::Deaths), Some(0));
		assert_eq!(history.get(day(4), Metric::Confirmed), Some(45));
	}

	#[test]
	fn history_is_saved_before_drawing() {
		let dir = tempfile::tempdir().unwrap();
		let history_path = dir.path().join("history.csv");
		let table = table();
		let mut history = History::new();

		let result = render_metric(&mut NullSink, &mut FailingSink, &table.as_of(), table.dates(), &mut history, &history_path, Metric::Confirmed, dir.path());
		assert!(result.is_err());
		let stored = History::load(&history_path).unwrap();
		assert_eq!(stored.get(day(1), Metric::Confirmed), Some(15));
		assert_eq!(stored.len(), 1);
	}
}
