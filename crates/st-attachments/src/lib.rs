//! # st-attachments
//!
//! Attachment intake and normalization pipeline for SiteTrack.
//!
//! Accepts user-selected files (photos and PDFs), validates them before any
//! expensive work, downsamples large images to a bounded resolution, encodes
//! the result as a data URI embeddable in a JSON save request, and appends
//! it to the host record's pending attachment list.
//!
//! ## Features
//!
//! - Pre-processing validation (MIME type, size ceiling)
//! - Aspect-preserving image downsampling with configurable bounds
//! - Transport encoding as self-describing data URIs
//! - Append-order attachment registration with indexed removal
//! - Kind inference for legacy records lacking an explicit kind
//! - Fault-isolated batch processing: one bad file never sinks the batch
//!
//! ## Example
//!
//! ```rust,ignore
//! use st_attachments::{AttachmentList, AttachmentPipeline, FileUpload, HostKind};
//!
//! let pipeline = AttachmentPipeline::from_config(&config.intake);
//! let mut attachments = AttachmentList::new();
//!
//! let report = pipeline
//!     .ingest(HostKind::Issue, files, &mut attachments)
//!     .await;
//!
//! // `attachments` now holds the registered records, ready to serialize
//! // into the issue's next save request.
//! ```

pub mod encode;
pub mod intake;
pub mod kind;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod registrar;

pub use encode::{content_digest, split_data_uri, to_data_uri};
pub use intake::{IntakeError, IntakePolicy};
pub use kind::resolve_kind;
pub use model::{Attachment, AttachmentKind, FileUpload, HostKind};
pub use normalize::{ImageNormalizer, NormalizedImage, ProcessingError, ResizeBounds};
pub use pipeline::{
    AttachmentPipeline, BatchReport, CollectingNotifier, FileOutcome, Notifier, TracingNotifier,
};
pub use registrar::{AttachmentError, AttachmentList};
