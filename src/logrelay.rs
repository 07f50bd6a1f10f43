//! Drains the shared-memory text log into discrete lines.

use crate::world::LogSink;

/// Scans the log buffer for newline- or NUL-delimited segments and forwards
/// each one to the sink. Runs after a STEP reply was received.
///
/// A leading NUL means the bot reported nothing. More segments follow a
/// delimiter only when it was a newline; a NUL terminates the scan. A
/// trailing fragment without any delimiter is dropped.
pub fn drain(log: &[u8], sink: &mut dyn LogSink) {
    if log.first().copied().unwrap_or(0) == 0 {
        return;
    }

    let mut start = 0usize;
    for (i, &b) in log.iter().enumerate() {
        if b != b'\n' && b != 0 {
            continue;
        }
        sink.append_line(&String::from_utf8_lossy(&log[start..i]));
        if b == 0 {
            return;
        }
        start = i + 1;
    }
}
