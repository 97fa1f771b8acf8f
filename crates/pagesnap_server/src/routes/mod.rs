mod artifacts;
mod capture;
mod catalog;
mod index;

pub use artifacts::serve_artifact;
pub use capture::{capture_handler, CaptureRequest, CaptureResponse};
pub use catalog::{entry_handler, listing_handler};
pub use index::{index_handler, info_handler, InfoResponse};
