//! Bounded `innerHTML` serialization

use html5ever::serialize::{serialize, SerializeOpts, TraversalScope};
use lens_protocol::truncate_excerpt;
use scraper::ElementRef;
use std::io;

/// Serialize the children of `element`, keeping at most `limit` characters
pub(super) fn children_of(element: ElementRef<'_>, limit: usize) -> String {
    let mut out = Excerpt::new(limit);
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..SerializeOpts::default()
    };
    // a full buffer aborts the walk with WriteZero
    if let Err(err) = serialize(&mut out, &element, opts) {
        if !out.is_full() {
            tracing::debug!(error = %err, "markup serialization failed");
        }
    }
    out.into_string()
}

/// Writer that refuses input once `limit` characters have arrived
struct Excerpt {
    bytes: Vec<u8>,
    chars: usize,
    limit: usize,
}

impl Excerpt {
    fn new(limit: usize) -> Self {
        Self {
            bytes: Vec::new(),
            chars: 0,
            limit,
        }
    }

    fn is_full(&self) -> bool {
        self.chars >= self.limit
    }

    fn into_string(self) -> String {
        truncate_excerpt(&String::from_utf8_lossy(&self.bytes), self.limit).to_string()
    }
}

impl io::Write for Excerpt {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.is_full() {
            return Err(io::ErrorKind::WriteZero.into());
        }
        // count UTF-8 lead bytes only
        self.chars += buf.iter().filter(|&&b| b & 0xC0 != 0x80).count();
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
