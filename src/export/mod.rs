pub mod collector;
pub mod exporter;
pub mod obj;
pub mod sink;

pub use exporter::{ExportOutcome, Exporter};
pub use sink::{DirectorySink, DownloadSink};
