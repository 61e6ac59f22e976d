use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

pub fn init_tracing(crate_name: &str) {
    // Filter traces based on the RUST_LOG env var, or, if it's not set,
    // default to tracing everything the client itself emits.
    let env_filter = env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("{}=trace,codebites_core=trace,reqwest=info", crate_name));

    // Logs go to stderr so they never interleave with the tables and
    // notifications the CLI prints on stdout.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        // Record an event when each span closes. This can be used to time
        // requests made against the users service.
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr)
        .try_init();
}
