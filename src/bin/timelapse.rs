use log::info;

use tracing_subscriber::EnvFilter;


fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let cfg = covid_timelapse::Config::from_env()?;
	info!("starting with {:?}", cfg);
	covid_timelapse::run(&cfg)?;
	info!("done");
	Ok(())
}
