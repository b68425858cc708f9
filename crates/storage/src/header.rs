// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Header boundary scanning and chunked stream copy
//!
//! The boundary is purely a line terminator byte, so tables can be merged
//! without knowing their schema or quoting rules.

use std::io::{self, BufRead, Read, Write};

/// Outcome of skipping a table's first line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSkip {
    /// Bytes consumed, terminator included
    pub consumed: u64,
    /// False when EOF came before any terminator (header-only source)
    pub terminated: bool,
}

/// Consume bytes up to and including the first LF or CR.
///
/// A CR directly followed by LF is one terminator and both bytes are
/// consumed. Without any terminator the whole stream is consumed.
pub fn skip_header<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<HeaderSkip> {
    let mut consumed = 0u64;
    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if buf.is_empty() {
            return Ok(HeaderSkip {
                consumed,
                terminated: false,
            });
        }

        match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) => {
                let carriage_return = buf[i] == b'\r';
                reader.consume(i + 1);
                consumed += (i + 1) as u64;
                if carriage_return && next_is_line_feed(reader)? {
                    reader.consume(1);
                    consumed += 1;
                }
                return Ok(HeaderSkip {
                    consumed,
                    terminated: true,
                });
            }
            None => {
                let len = buf.len();
                reader.consume(len);
                consumed += len as u64;
            }
        }
    }
}

fn next_is_line_feed<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<bool> {
    loop {
        match reader.fill_buf() {
            Ok(buf) => return Ok(buf.first() == Some(&b'\n')),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// Copy everything left in `reader` to `writer`, `chunk_size` bytes at a time.
/// Returns the number of bytes copied.
pub fn copy_chunked<R, W>(reader: &mut R, writer: &mut W, chunk_size: usize) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut chunk = vec![0u8; chunk_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&chunk[..n])?;
        total += n as u64;
    }
    writer.flush()?;
    Ok(total)
}

#[cfg(test)]
#[path = "header_tests.rs"]
mod tests;
