//! Host-side report reader
//!
//! Fed the bench's output one line at a time. Everything outside a
//! report block (acknowledgements, live markers, diagnostics) is ignored.

use tirebench_core::config::SampleColumns;
use tirebench_core::run::TestSample;

use crate::report::{HEADER_FULL, HEADER_POSITIONS, REPORT_END, REPORT_START};

/// Errors in a report block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReportError {
    /// Data row with the wrong field count or an unparsable field
    MalformedRow,
    /// Line before the header that is not `key: value`
    MalformedParameter,
}

/// One recognised report line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportItem<'a> {
    /// Start delimiter
    Start,
    /// `key: value` parameter
    Parameter {
        /// Text before the colon
        key: &'a str,
        /// Text after the colon
        value: &'a str,
    },
    /// CSV header; rows that follow use this layout
    Header(SampleColumns),
    /// Data row
    Sample(TestSample),
    /// End delimiter
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// Outside any report block
    Outside,
    /// After the start delimiter, before the header
    Parameters,
    /// Reading rows
    Rows(SampleColumns),
}

/// Line-fed report parser
#[derive(Debug, Clone)]
pub struct ReportReader {
    state: ReaderState,
}

impl Default for ReportReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportReader {
    /// Create a reader waiting for a start delimiter
    pub fn new() -> Self {
        Self {
            state: ReaderState::Outside,
        }
    }

    /// Check if the reader is inside a report block
    pub fn in_report(&self) -> bool {
        self.state != ReaderState::Outside
    }

    /// Feed one line
    ///
    /// Returns `Ok(None)` for lines outside a report block. A start
    /// delimiter always begins a new block, abandoning an unterminated one.
    pub fn feed<'a>(&mut self, line: &'a str) -> Result<Option<ReportItem<'a>>, ReportError> {
        let line = line.trim();

        if line == REPORT_START {
            self.state = ReaderState::Parameters;
            return Ok(Some(ReportItem::Start));
        }

        match self.state {
            ReaderState::Outside => Ok(None),
            _ if line == REPORT_END => {
                self.state = ReaderState::Outside;
                Ok(Some(ReportItem::End))
            }
            ReaderState::Parameters => {
                if let Some(columns) = header_columns(line) {
                    self.state = ReaderState::Rows(columns);
                    return Ok(Some(ReportItem::Header(columns)));
                }

                let (key, value) = line
                    .split_once(':')
                    .ok_or(ReportError::MalformedParameter)?;
                let key = key.trim();
                if key.is_empty() {
                    return Err(ReportError::MalformedParameter);
                }

                Ok(Some(ReportItem::Parameter {
                    key,
                    value: value.trim(),
                }))
            }
            ReaderState::Rows(columns) => parse_row(line, columns)
                .map(|sample| Some(ReportItem::Sample(sample)))
                .ok_or(ReportError::MalformedRow),
        }
    }
}

fn header_columns(line: &str) -> Option<SampleColumns> {
    match line {
        HEADER_FULL => Some(SampleColumns::Full),
        HEADER_POSITIONS => Some(SampleColumns::Positions),
        _ => None,
    }
}

fn parse_row(line: &str, columns: SampleColumns) -> Option<TestSample> {
    let mut fields = line.split(',').map(str::trim);
    let elapsed_ms = fields.next()?.parse::<u32>().ok()?;
    let mut value = || fields.next()?.parse::<f32>().ok();

    let mut sample = TestSample {
        elapsed_ms,
        wheel_distance_m: value()?,
        swivel_distance_m: value()?,
        ..TestSample::default()
    };

    if columns == SampleColumns::Full {
        sample.wheel_speed_m_s = value()?;
        sample.wheel_accel_m_s2 = value()?;
        sample.swivel_speed_m_s = value()?;
        sample.swivel_accel_m_s2 = value()?;
    }

    // Trailing fields mean the row does not match the header
    if fields.next().is_some() {
        return None;
    }

    Some(sample)
}
