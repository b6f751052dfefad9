//! The three metadata passes over cataloged records. Each one is independent,
//! re-runnable, and saves every record as soon as it is updated.

pub mod checksum;
pub mod date;
pub mod mimetype;

pub use checksum::compute_checksums;
pub use date::extract_creation_dates;
pub use mimetype::detect_mimetypes;
