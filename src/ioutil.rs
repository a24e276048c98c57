use std::ffi::OsStr;
use std::io;
use std::io::Read;
use std::fs;
use std::path::{Path, PathBuf};

use flate2;


pub fn magic_open<P: AsRef<Path>>(path: P) -> io::Result<Box<dyn Read>> {
	let path = path.as_ref();
	match path.extension() {
		Some(x) if x == "gz" => {
			Ok(Box::new(flate2::read::GzDecoder::new(fs::File::open(path)?)))
		},
		_ => Ok(Box::new(fs::File::open(path)?)),
	}
}

fn is_report(path: &Path) -> bool {
	let name = match path.file_name().and_then(OsStr::to_str) {
		Some(n) => n,
		None => return false,
	};
	name.ends_with(".csv") || name.ends_with(".csv.gz")
}

/// All daily report files in `dir`, sorted by file name.
pub fn list_reports<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
	let mut result = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && is_report(&path) {
			result.push(path);
		}
	}
	result.sort();
	Ok(result)
}
