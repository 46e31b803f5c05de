use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};


pub fn init() {
	// RUST_LOG wins, otherwise info
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new("info"));

	let console_layer = fmt::layer()
		.with_writer(std::io::stderr)
		.with_target(true)
		.with_file(true)
		.with_line_number(true)
		.compact();

	tracing_subscriber::registry()
		.with(filter)
		.with(console_layer)
		.init();

	std::panic::set_hook(Box::new(|info| {
		let payload = info.payload();
		let message = payload.downcast_ref::<&str>().copied()
			.or_else(|| payload.downcast_ref::<String>().map(String::as_str))
			.unwrap_or("<non-string panic>");

		match info.location() {
			Some(loc) => tracing::error!("panic at {}:{}:{}: {message}", loc.file(), loc.line(), loc.column()),
			None => tracing::error!("panic: {message}"),
		}
	}));
}
