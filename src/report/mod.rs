// Report emitters - final document generation from the merged snapshot

pub mod console;
pub mod html;

use crate::model::RunSnapshot;
use anyhow::Result;

pub use console::ConsoleEmitter;
pub use html::HtmlEmitter;

/// Emitter contract: consume the merged snapshot and produce one report
/// artifact. Screenshot references are passed through verbatim; locating
/// the files is the emitter's concern, never the aggregation core's.
pub trait Emitter: Send + Sync {
    fn emit(&self, stats: &RunSnapshot) -> Result<()>;
}

/// Millisecond duration as `hh:mm:ss.SS`
pub fn format_duration(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = ms % 3_600_000 / 60_000;
    let seconds = ms % 60_000 / 1_000;
    let centis = ms % 1_000 / 10;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{centis:02}")
}
