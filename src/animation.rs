use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, Rgba, RgbaImage};

use super::error::Result;


// GIF delays are stored in centiseconds
const MIN_FRAME: Duration = Duration::from_millis(10);
const ENCODER_SPEED: i32 = 10;


/// How long each frame of an animation of `n` frames is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
	pub frame: Duration,
	/// Extra periods the final frame is held for.
	pub hold: u32,
}

impl FrameTiming {
	/// Split `total` over `n` frames plus the closing blank frame, reserving
	/// `last` for holding the final frame.
	pub fn plan(n: usize, total: Duration, last: Duration) -> Self {
		let budget = total.checked_sub(last).unwrap_or_default().as_secs_f64();
		let frame = Duration::from_secs_f64(budget / ((n + 1) as f64)).max(MIN_FRAME);
		let hold = (last.as_secs_f64() / frame.as_secs_f64()).ceil() as u32;
		Self{frame, hold}
	}

	/// Delay of every encoded frame, the blank closing frame included.
	pub fn delays(&self, n: usize) -> Vec<Duration> {
		if n == 0 {
			return Vec::new()
		}
		let mut result = vec![self.frame; n + 1];
		result[n - 1] = self.frame * (self.hold + 1);
		result
	}
}


/// Rendered frames in `dir`, in file name order.
pub fn list_frames<P: AsRef<Path>>(dir: P) -> io::Result<Vec<PathBuf>> {
	let mut result = Vec::new();
	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension().map(|x| x == "png").unwrap_or(false) {
			result.push(path);
		}
	}
	result.sort();
	Ok(result)
}


/// Encode every frame in `frame_dir` into a looping GIF at `out`. Returns the
/// number of frames taken from the directory, or `None` if it had none.
pub fn assemble_gif<P: AsRef<Path>, Q: AsRef<Path>>(
	frame_dir: P,
	out: Q,
	total: Duration,
	last: Duration,
) -> Result<Option<usize>> {
	let frame_dir = frame_dir.as_ref();
	let out = out.as_ref();
	let frames = list_frames(frame_dir)?;
	if frames.is_empty() {
		warn!("no frames in {}, not writing {}", frame_dir.display(), out.display());
		return Ok(None)
	}
	let timing = FrameTiming::plan(frames.len(), total, last);
	let delays = timing.delays(frames.len());
	info!("encoding {} frames into {} ({:?} per frame) ...", frames.len(), out.display(), timing.frame);

	let mut w = io::BufWriter::new(fs::File::create(out)?);
	let mut encoder = GifEncoder::new_with_speed(&mut w, ENCODER_SPEED);
	encoder.set_repeat(Repeat::Infinite)?;
	let mut size = (0, 0);
	for (path, delay) in frames.iter().zip(delays.iter()) {
		let img = image::open(path)?.to_rgba8();
		size = img.dimensions();
		encoder.encode_frame(Frame::from_parts(img, 0, 0, Delay::from_saturating_duration(*delay)))?;
	}
	let blank = RgbaImage::from_pixel(size.0, size.1, Rgba([255, 255, 255, 255]));
	encoder.encode_frame(Frame::from_parts(blank, 0, 0, Delay::from_saturating_duration(timing.frame)))?;
	// the trailer is written when the encoder goes away
	drop(encoder);
	w.flush()?;
	Ok(Some(frames.len()))
}
