use std::collections::HashMap;
use std::path::Path;

use log::{debug, info};

use shapefile::dbase::{FieldValue, Record};
use shapefile::{Polygon, PolygonRing};

use smartstring::alias::{String as SmartString};

use super::error::Result;


static NAME_FIELD: &'static str = "NAME";


#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
	/// Outer boundary; inner rings are holes.
	pub outer: bool,
	/// (longitude, latitude)
	pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryShape {
	pub name: SmartString,
	pub rings: Vec<Ring>,
}

impl CountryShape {
	pub fn outer_rings(&self) -> impl Iterator<Item = &Ring> {
		self.rings.iter().filter(|r| r.outer)
	}
}


fn record_name(record: &Record) -> Option<SmartString> {
	match record.get(NAME_FIELD)? {
		FieldValue::Character(Some(s)) => Some(s.trim().into()),
		FieldValue::Memo(s) => Some(s.trim().into()),
		_ => None,
	}
}

fn convert_polygon(name: SmartString, polygon: &Polygon) -> CountryShape {
	let rings = polygon.rings().iter().map(|ring| {
		let outer = match ring {
			PolygonRing::Outer(_) => true,
			PolygonRing::Inner(_) => false,
		};
		Ring{
			outer,
			points: ring.points().iter().map(|p| (p.x, p.y)).collect(),
		}
	}).collect();
	CountryShape{name, rings}
}


/// Country boundaries keyed by display name. A name can own more than one
/// shape.
#[derive(Debug, Clone, Default)]
pub struct WorldMap {
	shapes: Vec<CountryShape>,
	by_name: HashMap<SmartString, Vec<usize>>,
}

impl WorldMap {
	pub fn new(shapes: Vec<CountryShape>) -> Self {
		let mut by_name: HashMap<SmartString, Vec<usize>> = HashMap::new();
		for (i, shape) in shapes.iter().enumerate() {
			by_name.entry(shape.name.clone()).or_default().push(i);
		}
		Self{shapes, by_name}
	}

	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let rows = shapefile::read_as::<_, Polygon, Record>(path)?;
		let mut shapes = Vec::with_capacity(rows.len());
		for (polygon, record) in rows.iter() {
			match record_name(record) {
				Some(name) => shapes.push(convert_polygon(name, polygon)),
				None => debug!("{}: shape without {} attribute ignored", path.display(), NAME_FIELD),
			}
		}
		let result = Self::new(shapes);
		info!("loaded {} shapes ({} names) from {}", result.shapes.len(), result.by_name.len(), path.display());
		Ok(result)
	}

	/// All shapes in file order.
	pub fn shapes(&self) -> &[CountryShape] {
		&self.shapes[..]
	}

	pub fn find(&self, name: &str) -> Vec<&CountryShape> {
		match self.by_name.get(name) {
			Some(indices) => indices.iter().map(|i| &self.shapes[*i]).collect(),
			None => Vec::new(),
		}
	}
}
