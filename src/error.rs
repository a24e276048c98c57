use std::io;
use std::path::PathBuf;

use thiserror::Error;


#[derive(Debug, Error)]
pub enum Error {
	#[error("i/o error: {0}")]
	Io(#[from] io::Error),
	#[error("malformed csv: {0}")]
	Csv(#[from] csv::Error),
	#[error("failed to read shapefile: {0}")]
	Shapefile(#[from] shapefile::Error),
	#[error("image error: {0}")]
	Image(#[from] image::ImageError),
	#[error("drawing failed: {0}")]
	Draw(String),
	#[error("invalid value for {var}: {value:?}")]
	Config{var: &'static str, value: String},
	#[error("git {action} in {dir} exited with {status}")]
	Git{action: &'static str, dir: PathBuf, status: std::process::ExitStatus},
}

pub type Result<T> = std::result::Result<T, Error>;
