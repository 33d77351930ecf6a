pub mod archive_writer;
pub mod naming;
pub mod ocr_service;
pub mod report_writer;

pub use archive_writer::ArchiveWriter;
pub use ocr_service::{OcrEngine, OcrService};
pub use report_writer::{ReportOutput, ReportWriter};
