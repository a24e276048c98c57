use std::io;
use std::io::Write;
use std::time;


pub trait ProgressSink {
	fn update(&mut self, inow: usize, n: Option<usize>);
	fn finish(&mut self, inow: usize, n: Option<usize>);
}


/// Carriage-return meter for interactive terminals.
pub struct ProgressMeter {
	t0: time::Instant,
	tprev: time::Instant,
	iprev: usize,
}

impl ProgressMeter {
	pub fn start() -> Self {
		let now = time::Instant::now();
		Self{
			t0: now,
			tprev: now,
			iprev: 0,
		}
	}

	fn print(&self, inow: usize, n: Option<usize>, rate: f64) {
		match n {
			Some(n) if n > 0 => {
				let done = (inow as f64) / (n as f64);
				print!("{:6.0}% [{:6.2}/s]\r", done * 100.0, rate);
			},
			_ => {
				print!("{:12} [{:6.2}/s]\r", inow, rate);
			},
		}
		// a broken stdout is not worth aborting a render for
		let _ = io::stdout().flush();
	}
}

impl ProgressSink for ProgressMeter {
	fn update(&mut self, inow: usize, n: Option<usize>) {
		let now = time::Instant::now();
		let dt = (now - self.tprev).as_secs_f64();
		let rate = inow.saturating_sub(self.iprev) as f64 / dt;
		self.print(inow, n, rate);
		self.iprev = inow;
		self.tprev = now;
	}

	fn finish(&mut self, inow: usize, n: Option<usize>) {
		let dt = (time::Instant::now() - self.t0).as_secs_f64();
		let rate = inow as f64 / dt;
		self.print(inow, n, rate);
		println!();
		self.t0 = time::Instant::now();
		self.tprev = self.t0;
		self.iprev = 0;
	}
}


pub struct NullSink;

impl ProgressSink for NullSink {
	fn update(&mut self, _inow: usize, _n: Option<usize>) {}
	fn finish(&mut self, _inow: usize, _n: Option<usize>) {}
}


pub fn default_output() -> Box<dyn ProgressSink> {
	if isatty::stdout_isatty() {
		Box::new(ProgressMeter::start())
	} else {
		Box::new(NullSink)
	}
}


/// Progress over a known number of steps.
pub struct StepMeter<'s, S: ProgressSink + ?Sized> {
	sink: &'s mut S,
	n: usize,
}

impl<'s, S: ProgressSink + ?Sized> StepMeter<'s, S> {
	pub fn new(sink: &'s mut S, n: usize) -> Self {
		Self{sink, n}
	}

	pub fn update(&mut self, inow: usize) {
		self.sink.update(inow, Some(self.n));
	}

	pub fn finish(self) {
		self.sink.finish(self.n, Some(self.n));
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Default)]
	pub struct RecordingSink {
		pub updates: Vec<(usize, Option<usize>)>,
		pub finished: Vec<(usize, Option<usize>)>,
	}

	impl ProgressSink for RecordingSink {
		fn update(&mut self, inow: usize, n: Option<usize>) {
			self.updates.push((inow, n));
		}

		fn finish(&mut self, inow: usize, n: Option<usize>) {
			self.finished.push((inow, n));
		}
	}

	#[test]
	fn step_meter_reports_total() {
		let mut sink = RecordingSink::default();
		let mut pm = StepMeter::new(&mut sink, 4);
		pm.update(1);
		pm.update(3);
		pm.finish();
		assert_eq!(sink.updates, vec![(1, Some(4)), (3, Some(4))]);
		assert_eq!(sink.finished, vec![(4, Some(4))]);
	}
}
