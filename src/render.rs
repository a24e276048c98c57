use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use chrono::NaiveDate;

use plotters::coord::Shift;
use plotters::prelude::*;

use smartstring::alias::{String as SmartString};

use super::error::{Error, Result};
use super::geo::WorldMap;
use super::names::map_units;


pub const WATER: RGBColor = RGBColor(172, 223, 255);
pub const LAND: RGBColor = RGBColor(144, 238, 144);
const LAND_ALPHA: f64 = 0.3;

/// Inset of the trend line in map coordinates: (x0, x1, y0, y1).
pub const TREND_BOX: (f64, f64, f64, f64) = (-160.0, -110.0, -60.0, -20.0);


fn draw_err<E: std::fmt::Display>(e: E) -> Error {
	Error::Draw(e.to_string())
}

/// Fill opacity for a country with `count` cases. `None` means the country is
/// not shaded at all.
pub fn shade_alpha(count: i64) -> Option<f64> {
	if count <= 0 {
		return None
	}
	let alpha = (count as f64).log10() / 6.0 + 0.02;
	if alpha <= 0.0 {
		return None
	}
	Some(alpha.min(1.0))
}

/// Trend line vertices: evenly spaced over x0..x1, scaled so that the maximum
/// reaches y1.
pub fn trend_points(history: &[i64], (x0, x1, y0, y1): (f64, f64, f64, f64)) -> Vec<(f64, f64)> {
	let max = history.iter().copied().max().unwrap_or(0);
	let n = history.len();
	history.iter().enumerate().map(|(i, v)| {
		let x = if n > 1 {
			x0 + (x1 - x0) * (i as f64) / ((n - 1) as f64)
		} else {
			x0
		};
		let y = if max > 0 {
			y0 + (y1 - y0) * (*v as f64) / (max as f64)
		} else {
			y0
		};
		(x, y)
	}).collect()
}

pub fn format_thousands(v: i64) -> String {
	let digits = v.unsigned_abs().to_string();
	let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
	if v < 0 {
		result.push('-');
	}
	for (i, c) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			result.push(',');
		}
		result.push(c);
	}
	result
}

pub fn frame_title(date: NaiveDate, title: &str) -> String {
	format!("{} - COVID-19 - {}", date, title)
}


/// Everything needed to draw one frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
	pub date: NaiveDate,
	pub title: &'a str,
	pub countries: &'a BTreeMap<SmartString, i64>,
	/// National totals up to and including `date`.
	pub history: &'a [i64],
}


pub struct FrameRenderer<'m> {
	map: &'m WorldMap,
	size: (u32, u32),
}

impl<'m> FrameRenderer<'m> {
	pub fn new(map: &'m WorldMap, size: (u32, u32)) -> Self {
		Self{map, size}
	}

	pub fn render<P: AsRef<Path>>(&self, path: P, frame: &Frame) -> Result<()> {
		self.render_to(path.as_ref(), frame, true)
	}

	fn render_to(&self, path: &Path, frame: &Frame, labels: bool) -> Result<()> {
		let root = BitMapBackend::new(path, self.size).into_drawing_area();
		self.draw(&root, frame, labels)?;
		root.present().map_err(draw_err)?;
		Ok(())
	}

	/// Text (title and trend value) is only drawn with `labels`.
	fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>, frame: &Frame, labels: bool) -> Result<()>
		where DB::ErrorType: 'static
	{
		root.fill(&WHITE).map_err(draw_err)?;
		let mut builder = ChartBuilder::on(root);
		builder.margin(10);
		if labels {
			builder.caption(frame_title(frame.date, frame.title), ("sans-serif", 24));
		}
		let mut chart = builder
			.build_cartesian_2d(-180f64..180f64, -90f64..90f64)
			.map_err(draw_err)?;
		chart.plotting_area().fill(&WATER).map_err(draw_err)?;

		let shapes = self.map.shapes();
		chart.draw_series(shapes.iter().flat_map(|s| s.outer_rings()).map(|r| {
			Polygon::new(r.points.clone(), WHITE.filled())
		})).map_err(draw_err)?;
		chart.draw_series(shapes.iter().flat_map(|s| s.outer_rings()).map(|r| {
			Polygon::new(r.points.clone(), LAND.mix(LAND_ALPHA).filled())
		})).map_err(draw_err)?;

		for (country, count) in frame.countries.iter() {
			let alpha = match shade_alpha(*count) {
				Some(a) => a,
				None => continue,
			};
			for unit in map_units(country) {
				let found = self.map.find(unit);
				if found.is_empty() {
					debug!("country name {} not found", unit);
					continue
				}
				let rings: Vec<_> = found.iter().flat_map(|s| s.outer_rings()).collect();
				chart.draw_series(rings.iter().map(|r| {
					Polygon::new(r.points.clone(), WHITE.filled())
				})).map_err(draw_err)?;
				chart.draw_series(rings.iter().map(|r| {
					Polygon::new(r.points.clone(), RED.mix(alpha).filled())
				})).map_err(draw_err)?;
			}
		}

		chart.draw_series(shapes.iter().flat_map(|s| s.rings.iter()).map(|r| {
			PathElement::new(r.points.clone(), BLACK.stroke_width(1))
		})).map_err(draw_err)?;

		let points = trend_points(frame.history, TREND_BOX);
		if let Some(last) = points.last().copied() {
			chart.draw_series(LineSeries::new(points.iter().copied(), RED.stroke_width(2))).map_err(draw_err)?;
			chart.draw_series(std::iter::once(Circle::new(last, 4, RED.filled()))).map_err(draw_err)?;
			if let Some(v) = frame.history.last().filter(|_| labels) {
				chart.draw_series(std::iter::once(Text::new(
					format_thousands(*v),
					(TREND_BOX.1 + 5.0, last.1),
					("sans-serif", 16).into_font(),
				))).map_err(draw_err)?;
			}
		}
		Ok(())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	use crate::geo::{CountryShape, Ring};

	#[test]
	fn alpha_scales_with_log_count() {
		assert_eq!(shade_alpha(0), None);
		assert_eq!(shade_alpha(-4), None);
		assert!((shade_alpha(1).unwrap() - 0.02).abs() < 1e-9);
		assert!((shade_alpha(1000).unwrap() - 0.52).abs() < 1e-9);
		assert_eq!(shade_alpha(100_000_000), Some(1.0));
	}

	#[test]
	fn alpha_is_monotonic() {
		let mut prev = 0.0;
		for count in &[1, 9, 10, 500, 12_345, 999_999] {
			let a = shade_alpha(*count).unwrap();
			assert!(a > prev);
			prev = a;
		}
	}

	#[test]
	fn trend_spans_box() {
		let pts = trend_points(&[0, 50, 100], TREND_BOX);
		assert_eq!(pts, vec![(-160.0, -60.0), (-135.0, -40.0), (-110.0, -20.0)]);
	}

	#[test]
	fn trend_single_and_flat() {
		assert_eq!(trend_points(&[7], TREND_BOX), vec![(-160.0, -20.0)]);
		assert_eq!(trend_points(&[0, 0], TREND_BOX), vec![(-160.0, -60.0), (-110.0, -60.0)]);
		assert!(trend_points(&[], TREND_BOX).is_empty());
	}

	#[test]
	fn thousands_separator() {
		assert_eq!(format_thousands(0), "0");
		assert_eq!(format_thousands(999), "999");
		assert_eq!(format_thousands(1000), "1,000");
		assert_eq!(format_thousands(1234567), "1,234,567");
		assert_eq!(format_thousands(-45678), "-45,678");
	}

	fn square(name: &str, x: f64, y: f64, size: f64) -> CountryShape {
		CountryShape{
			name: name.into(),
			rings: vec![Ring{
				outer: true,
				points: vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size), (x, y)],
			}],
		}
	}

	#[test]
	fn renders_shaded_country_to_png() {
		let map = WorldMap::new(vec![
			square("France", -20., -20., 40.),
			square("Italy", 60., 20., 20.),
		]);
		let mut countries = BTreeMap::new();
		countries.insert(SmartString::from("France"), 100_000_000);
		countries.insert(SmartString::from("Italy"), 0);
		countries.insert(SmartString::from("Atlantis"), 5_000);
		let frame = Frame{
			date: NaiveDate::from_ymd_opt(2020, 3, 15).unwrap(),
			title: "Confirmed infections",
			countries: &countries,
			history: &[10, 20, 40],
		};

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("img20200315.png");
		FrameRenderer::new(&map, (400, 220)).render_to(&path, &frame, false).unwrap();

		let img = image::open(&path).unwrap().to_rgb8();
		assert_eq!(img.dimensions(), (400, 220));
		// plot area is 380x200 pixels behind a 10 pixel margin
		let shaded = img.get_pixel(200, 110).0;
		assert!(shaded[0] > 200 && shaded[1] < 60 && shaded[2] < 60, "{:?}", shaded);
		let land = img.get_pixel(274, 77).0;
		assert!(land[1] > land[0] && land[1] > land[2], "{:?}", land);
		assert_eq!(img.get_pixel(30, 30).0, [WATER.0, WATER.1, WATER.2]);
	}

	#[test]
	fn title_format() {
		let d = NaiveDate::from_ymd_opt(2020, 3, 15).unwrap();
		assert_eq!(frame_title(d, "Deaths"), "2020-03-15 - COVID-19 - Deaths");
	}
}
