use smartstring::alias::{String as SmartString};


/// Source spelling -> name used by the Natural Earth map units.
static COUNTRY_RENAMES: &[(&str, &str)] = &[
	("Bosnia and Herzegovina", "Bosnia and Herz."),
	("Czech Republic", "Czechia"),
	("Dominican Republic", "Dominican Rep."),
	("Hong Kong SAR", "Hong Kong"),
	("Iran (Islamic Republic of)", "Iran"),
	("Ivory Coast", "Côte d'Ivoire"),
	("Macao SAR", "Macau"),
	("Mainland China", "China"),
	("North Macedonia", "Macedonia"),
	("North Ireland", "N. Ireland"),
	("Republic of Ireland", "Ireland"),
	("Republic of Korea", "South Korea"),
	("Republic of Moldova", "Moldova"),
	("Russian Federation", "Russia"),
	("UK", "United Kingdom"),
	("US", "United States of America"),
	("United States", "United States of America"),
	("Viet Nam", "Vietnam"),
];

static UNITED_KINGDOM_UNITS: &[&str] = &["England", "Wales", "Scotland"];


pub fn normalize_country(raw: &str) -> SmartString {
	let trimmed = raw.trim();
	for (from, to) in COUNTRY_RENAMES.iter() {
		if *from == trimmed {
			return (*to).into()
		}
	}
	trimmed.into()
}

/// Map units a country is drawn as. Most countries are a single unit of the
/// same name.
pub fn map_units(country: &str) -> Vec<&str> {
	match country {
		"United Kingdom" => UNITED_KINGDOM_UNITS.to_vec(),
		other => vec![other],
	}
}
