use std::io;
use std::time::SystemTime;

use tracing_core::Metadata;
use tracing_subscriber::fmt::MakeWriter;

use crate::handler::{BufferedHandler, Deliver, Emit, ImmediateHandler};
use crate::record::LogRecord;

impl<D, F> MakeWriter for ImmediateHandler<D, F>
where
    D: Deliver,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    type Writer = RusotoLogsWriter<Self>;

    fn make_writer(&self) -> Self::Writer {
        RusotoLogsWriter::new(self.clone(), None)
    }

    fn make_writer_for(&self, metadata: &Metadata<'_>) -> Self::Writer {
        RusotoLogsWriter::new(self.clone(), Some(metadata))
    }
}

impl<D, F> MakeWriter for BufferedHandler<D, F>
where
    D: Deliver,
    F: Fn(&LogRecord) -> String + Send + Sync,
{
    type Writer = RusotoLogsWriter<Self>;

    fn make_writer(&self) -> Self::Writer {
        RusotoLogsWriter::new(self.clone(), None)
    }

    fn make_writer_for(&self, metadata: &Metadata<'_>) -> Self::Writer {
        RusotoLogsWriter::new(self.clone(), Some(metadata))
    }
}

/// Line-buffered writer emitting one record per completed write.
///
/// Partial lines are held until their newline arrives. Whatever the line buffer
/// hands down in one go becomes a single record, so a single write of
/// `b"a\nb\n"` yields one record `"a\nb"` rather than two.
pub struct RusotoLogsWriter<H: Emit> {
    line_writer: io::LineWriter<Inner<H>>,
}

impl<H: Emit> RusotoLogsWriter<H> {
    fn new(handler: H, metadata: Option<&Metadata<'_>>) -> Self {
        let template = match metadata {
            Some(metadata) => LogRecord::new(String::new()).with_metadata(metadata),
            None => LogRecord::new(String::new()),
        };
        let inner = Inner { handler, template };
        let line_writer = io::LineWriter::new(inner);
        Self { line_writer }
    }
}

impl<H: Emit> io::Write for RusotoLogsWriter<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.line_writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.line_writer.flush()
    }

    fn write_vectored(&mut self, bufs: &[io::IoSlice<'_>]) -> io::Result<usize> {
        self.line_writer.write_vectored(bufs)
    }
}

struct Inner<H> {
    handler: H,
    template: LogRecord,
}

impl<H: Emit> io::Write for Inner<H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let buf_len = buf.len();
        let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
        // The service rejects empty messages, so blank lines are skipped.
        if buf.is_empty() {
            return Ok(buf_len);
        }

        let message = String::from_utf8(buf.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let record = LogRecord {
            created: SystemTime::now(),
            message,
            ..self.template.clone()
        };
        self.handler
            .emit(record)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

        Ok(buf_len)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.write(buf).map(|_| ())
    }
}
