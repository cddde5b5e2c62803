use super::{EncodedStream, Encoder};
use crate::prelude::*;

const DEFAULT_ENTRIES_PER_LINE: usize = 10;
const DEFAULT_LINES_PER_FLUSH: usize = 1000;
/// bytes of buffered text allowed per line of `lines_per_flush`
const BYTES_PER_LINE: usize = 256;

/// How floating point values are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FloatFormat {
    /// `%g` style with as many significant digits as the value's type guarantees
    /// (6 for `f32`, 15 for `f64`)
    #[default]
    Digits10,
    /// the shortest text that parses back to the same value
    Shortest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiOptions {
    /// separator between two values on the same line
    pub delimiter: String,
    /// text written at the start of every line
    pub line_prefix: String,
    /// `None` writes everything on a single line
    pub entries_per_line: Option<usize>,
    /// number of completed lines buffered before they are written to the sink
    pub lines_per_flush: usize,
    pub float_format: FloatFormat,
}

impl Default for AsciiOptions {
    fn default() -> Self {
        Self {
            delimiter: " ".to_string(),
            line_prefix: String::new(),
            entries_per_line: Some(DEFAULT_ENTRIES_PER_LINE),
            lines_per_flush: DEFAULT_LINES_PER_FLUSH,
            float_format: FloatFormat::Digits10,
        }
    }
}

impl AsciiOptions {
    pub fn with_delimiter<T: Into<String>>(mut self, delimiter: T) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_line_prefix<T: Into<String>>(mut self, prefix: T) -> Self {
        self.line_prefix = prefix.into();
        self
    }

    pub fn with_entries_per_line(mut self, entries: Option<usize>) -> Self {
        self.entries_per_line = entries;
        self
    }

    pub fn with_lines_per_flush(mut self, lines: usize) -> Self {
        self.lines_per_flush = lines;
        self
    }

    pub fn with_float_format(mut self, format: FloatFormat) -> Self {
        self.float_format = format;
        self
    }

    fn line_length(&self) -> usize {
        match self.entries_per_line {
            Some(0) => {
                log::warn!("ascii output with zero entries per line, writing one entry per line");
                1
            }
            Some(n) => n,
            None => usize::MAX,
        }
    }
}

/// Writes values as delimiter separated text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ascii {
    options: AsciiOptions,
}

impl Ascii {
    pub fn new(options: AsciiOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AsciiOptions {
        &self.options
    }
}

impl Encoder for Ascii {
    type Stream<W: Write> = AsciiStream<W>;

    const FORMAT: &'static str = "ascii";

    fn produces_valid_text() -> bool {
        true
    }

    fn encodes_bytes() -> bool {
        false
    }

    fn stream<W: Write>(&self, sink: W) -> AsciiStream<W> {
        AsciiStream::new(sink, &self.options)
    }
}

/// An open ascii output
///
/// Completed lines are collected in memory and written to the sink every
/// [`AsciiOptions::lines_per_flush`] lines, or earlier once the buffered text grows past
/// `lines_per_flush` times 256 bytes. Long lines (or a single unbroken line) are therefore written
/// in pieces. The line state carries across calls to [`EncodedStream::write_values`].
pub struct AsciiStream<W: Write> {
    sink: W,
    delimiter: String,
    line_prefix: String,
    line_length: usize,
    lines_per_flush: usize,
    flush_threshold: usize,
    float_format: FloatFormat,
    buffer: String,
    entries_in_line: usize,
    buffered_lines: usize,
    started: bool,
}

impl<W: Write> AsciiStream<W> {
    fn new(sink: W, options: &AsciiOptions) -> Self {
        let lines_per_flush = options.lines_per_flush.max(1);
        Self {
            sink,
            delimiter: options.delimiter.clone(),
            line_prefix: options.line_prefix.clone(),
            line_length: options.line_length(),
            lines_per_flush,
            flush_threshold: lines_per_flush.saturating_mul(BYTES_PER_LINE),
            float_format: options.float_format,
            buffer: String::new(),
            entries_in_line: 0,
            buffered_lines: 0,
            started: false,
        }
    }

    /// write booleans as `0` and `1`
    pub fn write_flags(&mut self, flags: &[bool]) -> Result<()> {
        for flag in flags {
            self.begin_entry()?;
            self.buffer.push(if *flag { '1' } else { '0' });
            self.flush_if_full()?;
        }
        Ok(())
    }

    fn begin_entry(&mut self) -> Result<()> {
        if !self.started {
            self.buffer.push_str(&self.line_prefix);
            self.started = true;
        } else if self.entries_in_line == self.line_length {
            self.buffer.push('\n');
            self.buffered_lines += 1;
            if self.buffered_lines >= self.lines_per_flush {
                self.flush_buffer()?;
            }
            self.buffer.push_str(&self.line_prefix);
            self.entries_in_line = 0;
        } else {
            self.buffer.push_str(&self.delimiter);
        }
        self.entries_in_line += 1;
        Ok(())
    }

    fn flush_if_full(&mut self) -> Result<()> {
        if self.buffer.len() >= self.flush_threshold {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Write out the buffered text
    ///
    /// The buffer is emptied even if the sink fails, so dropping the stream afterwards does not
    /// repeat the text.
    fn flush_buffer(&mut self) -> Result<()> {
        self.buffered_lines = 0;
        if self.buffer.is_empty() {
            return Ok(());
        }
        let written = self.sink.write_all(self.buffer.as_bytes());
        self.buffer.clear();
        Ok(written?)
    }
}

impl<W: Write> EncodedStream for AsciiStream<W> {
    fn write_values<T: Scalar>(&mut self, values: &[T]) -> Result<()> {
        let precision = T::PRECISION;
        for value in values {
            self.begin_entry()?;
            if precision.is_float() {
                match self.float_format {
                    FloatFormat::Digits10 => {
                        write_general(&mut self.buffer, value.to_f64(), precision.digits10())
                    }
                    FloatFormat::Shortest => write_shortest(&mut self.buffer, *value),
                }
            } else if precision.is_signed() {
                self.buffer.push_str(&value.to_i64().to_string());
            } else {
                self.buffer.push_str(&value.to_u64().to_string());
            }
            self.flush_if_full()?;
        }
        Ok(())
    }

    fn finish(mut self) -> Result<()> {
        self.flush_buffer()?;
        self.sink.flush()?;
        Ok(())
    }
}

impl<W: Write> Drop for AsciiStream<W> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_buffer() {
            log::error!("failed to flush ascii output on drop: {e}");
        }
    }
}

fn write_shortest<T: Scalar>(out: &mut String, value: T) {
    let mut buffer = ryu::Buffer::new();
    let text = match T::PRECISION {
        Precision::Float32 => buffer.format(num_traits::AsPrimitive::<f32>::as_(value)),
        _ => buffer.format(value.to_f64()),
    };
    out.push_str(text);
}

/// Print `value` like C's `%g` with `precision` significant digits
fn write_general(out: &mut String, value: f64, precision: usize) {
    if value.is_nan() {
        out.push_str(if value.is_sign_negative() { "-nan" } else { "nan" });
        return;
    }
    if value.is_infinite() {
        out.push_str(if value < 0.0 { "-inf" } else { "inf" });
        return;
    }
    if value == 0.0 {
        out.push_str(if value.is_sign_negative() { "-0" } else { "0" });
        return;
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        out.push_str(trim_fraction(mantissa));
        let sign = if exponent < 0 { '-' } else { '+' };
        out.push_str(&format!("e{sign}{:02}", exponent.unsigned_abs()));
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        let fixed = format!("{:.*}", decimals, value);
        out.push_str(trim_fraction(&fixed));
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
