//! Prometheus text exposition (format 0.0.4), counters and gauges only.
//!
//! Each metric is written as a `# HELP` line, a `# TYPE` line and one
//! unlabelled sample line. Every line ends with `\n`, so a rendered document
//! always ends with exactly one trailing newline.

use std::fmt::{self, Write};

/// Content type advertised for exposition bodies.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// A sample value. Integers print as plain decimal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl From<u64> for Sample {
    fn from(v: u64) -> Self {
        Sample::Unsigned(v)
    }
}

impl From<i64> for Sample {
    fn from(v: i64) -> Self {
        Sample::Signed(v)
    }
}

impl From<f64> for Sample {
    fn from(v: f64) -> Self {
        Sample::Float(v)
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Sample::Unsigned(v) => write!(f, "{v}"),
            Sample::Signed(v) => write!(f, "{v}"),
            // Rust spells these `inf`/`NaN`; scrapers expect `+Inf`/`-Inf`/`NaN`.
            Sample::Float(v) if v.is_nan() => f.write_str("NaN"),
            Sample::Float(v) if v.is_infinite() => {
                f.write_str(if v > 0.0 { "+Inf" } else { "-Inf" })
            }
            Sample::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Accumulates metric blocks into one exposition document.
#[derive(Debug, Default)]
pub struct ExpositionWriter {
    out: String,
}

impl ExpositionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one `HELP`/`TYPE`/sample block.
    pub fn metric(&mut self, name: &str, help: &str, kind: MetricKind, value: impl Into<Sample>) {
        let value = value.into();
        let _ = writeln!(self.out, "# HELP {name} {}", escape_help(help));
        let _ = writeln!(self.out, "# TYPE {name} {}", kind.as_str());
        let _ = writeln!(self.out, "{name} {value}");
    }

    pub fn counter(&mut self, name: &str, help: &str, value: impl Into<Sample>) {
        self.metric(name, help, MetricKind::Counter, value);
    }

    pub fn gauge(&mut self, name: &str, help: &str, value: impl Into<Sample>) {
        self.metric(name, help, MetricKind::Gauge, value);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// HELP text may not contain raw backslashes or newlines.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout() {
        let mut w = ExpositionWriter::new();
        w.counter("x_total", "Things", 3u64);
        assert_eq!(w.finish(), "# HELP x_total Things\n# TYPE x_total counter\nx_total 3\n");
    }

    #[test]
    fn float_spelling() {
        assert_eq!(Sample::Float(20.0).to_string(), "20");
        assert_eq!(Sample::Float(19.5).to_string(), "19.5");
        assert_eq!(Sample::Float(f64::INFINITY).to_string(), "+Inf");
        assert_eq!(Sample::Float(f64::NEG_INFINITY).to_string(), "-Inf");
        assert_eq!(Sample::Float(f64::NAN).to_string(), "NaN");
        assert_eq!(Sample::Signed(-4).to_string(), "-4");
    }

    #[test]
    fn help_is_escaped() {
        assert_eq!(escape_help("a\nb\\c"), "a\\nb\\\\c");
    }
}
