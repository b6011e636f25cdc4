use std::fmt;

use serde::Serialize;

/// One entry of the simulation's output log.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputEvent {
    Text { text: String },
    /// Numeric readout; with a `center` it renders as `center ± diff`.
    Axis {
        label: String,
        value: f64,
        center: Option<f64>,
        precision: usize,
    },
    Warning { text: String },
}

impl OutputEvent {
    pub fn text(text: impl Into<String>) -> Self {
        OutputEvent::Text { text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        OutputEvent::Warning { text: text.into() }
    }

    pub fn axis(label: impl Into<String>, value: f64, precision: usize) -> Self {
        OutputEvent::Axis {
            label: label.into(),
            value,
            center: None,
            precision,
        }
    }

    pub fn centered(label: impl Into<String>, value: f64, center: f64, precision: usize) -> Self {
        OutputEvent::Axis {
            label: label.into(),
            value,
            center: Some(center),
            precision,
        }
    }
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OutputEvent::Text { text } => write!(f, "{text}"),
            OutputEvent::Warning { text } => write!(f, "Warning: {text}"),
            OutputEvent::Axis {
                label,
                value,
                center: None,
                precision,
            } => write!(f, "{label}: {}", format_fixed(*value, *precision)),
            OutputEvent::Axis {
                label,
                value,
                center: Some(center),
                precision,
            } => {
                let diff = value - center;
                let sign = if diff < 0.0 { '-' } else { '+' };
                write!(
                    f,
                    "{label}: {} {sign} {}",
                    format_number(*center, *precision),
                    format_fixed(diff.abs(), *precision)
                )
            }
        }
    }
}

/// Fixed number of decimals, with negative zero printed as zero.
pub fn format_fixed(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        return text[1..].to_string();
    }
    text
}

/// Shortest readable form: integers without a fraction, others trimmed.
pub fn format_number(value: f64, precision: usize) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format_fixed(value, precision);
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            return "0".to_string();
        }
        return trimmed.to_string();
    }
    text
}

pub trait EventSink {
    fn emit(&mut self, event: OutputEvent);
    fn emitted(&self) -> usize;
}

#[derive(Default)]
pub struct VecEventSink {
    pub events: Vec<OutputEvent>,
}

impl VecEventSink {
    pub fn into_events(self) -> Vec<OutputEvent> {
        self.events
    }
}

impl EventSink for VecEventSink {
    fn emit(&mut self, event: OutputEvent) {
        self.events.push(event);
    }

    fn emitted(&self) -> usize {
        self.events.len()
    }
}

/// Drops everything; probes run against it.
#[derive(Default)]
pub struct NullSink {
    dropped: usize,
}

impl EventSink for NullSink {
    fn emit(&mut self, _event: OutputEvent) {
        self.dropped += 1;
    }

    fn emitted(&self) -> usize {
        self.dropped
    }
}
