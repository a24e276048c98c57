use std::path::Path;
use std::process::Command;

use log::info;

use super::error::{Error, Result};


/// Clone `url` into `dir` if it does not exist yet, pull otherwise.
pub fn sync_repository<P: AsRef<Path>>(url: &str, dir: P) -> Result<()> {
	let dir = dir.as_ref();
	let (action, status) = if dir.join(".git").exists() {
		info!("pulling {} into {} ...", url, dir.display());
		("pull", Command::new("git").arg("-C").arg(dir).arg("pull").arg(url).status()?)
	} else {
		info!("cloning {} into {} ...", url, dir.display());
		("clone", Command::new("git").arg("clone").arg(url).arg(dir).status()?)
	};
	if !status.success() {
		return Err(Error::Git{action, dir: dir.to_path_buf(), status})
	}
	Ok(())
}
