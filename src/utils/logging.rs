// file: src/utils/logging.rs
// description: Tracing subscriber initialization and operator-facing stage narration

use colored::*;
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber. `RUST_LOG` wins over the verbosity flag.
/// Log lines go to stderr; stdout is reserved for narration and documents.
pub fn init_logger(colored_output: bool, verbose: bool) {
    build_subscriber(colored_output, verbose, std::io::stderr).init();
}

fn build_subscriber<W>(colored_output: bool, verbose: bool, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(colored_output);

    tracing_subscriber::registry().with(filter).with(fmt_layer)
}

pub fn set_color_output(enabled: bool) {
    colored::control::set_override(enabled);
}

pub fn format_success(msg: &str) -> String {
    format!("{} {}", "✓".green().bold(), msg.green())
}

pub fn format_error(msg: &str) -> String {
    format!("{} {}", "✗".red().bold(), msg.red())
}

pub fn format_warning(msg: &str) -> String {
    format!("{} {}", "⚠".yellow().bold(), msg.yellow())
}

pub fn format_info(msg: &str) -> String {
    format!("{} {}", "ℹ".blue().bold(), msg)
}

pub fn format_step(step: usize, total: usize, msg: &str) -> String {
    format!("{} {}", format!("[{}/{}]", step, total).cyan().bold(), msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_plain_formatting() {
        set_color_output(false);
        assert_eq!(format_step(2, 4, "Filtering"), "[2/4] Filtering");
        assert_eq!(format_success("done"), "✓ done");
        assert_eq!(format_error("boom"), "✗ boom");
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_log_lines_use_the_given_writer() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = build_subscriber(false, false, move || sink.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("Config file not found, using defaults");
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("Config file not found, using defaults"));
    }
}
