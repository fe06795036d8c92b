//! Batch orchestration
//!
//! Drives each selected file through validate → normalize (images only) →
//! encode → register. Files run sequentially; image work happens on the
//! blocking pool so the caller's task stays responsive between files. A
//! failure is terminal for its file only — the batch always continues.

use tracing::{info, instrument, warn};

use st_core::config::IntakeConfig;

use crate::encode::{content_digest, to_data_uri};
use crate::intake::{IntakeError, IntakePolicy};
use crate::model::{AttachmentKind, FileUpload, HostKind};
use crate::normalize::{ImageNormalizer, ProcessingError};
use crate::registrar::AttachmentList;

/// Receives the per-file notices the embedding UI shows the user.
/// Every notice names the file and the reason.
pub trait Notifier: Send + Sync {
    fn rejected(&self, name: &str, reason: &IntakeError);
    fn failed(&self, name: &str, reason: &ProcessingError);
}

/// Logs notices through `tracing`. The default when the embedding app
/// wires its own toast layer on top of the log stream.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn rejected(&self, name: &str, reason: &IntakeError) {
        warn!(name = name, reason = %reason, "File rejected at intake");
    }

    fn failed(&self, name: &str, reason: &ProcessingError) {
        warn!(name = name, reason = %reason, "File failed during processing");
    }
}

/// Collects notices for assertions in tests and for UIs that batch them.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    notices: std::sync::Mutex<Vec<String>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }
}

impl Notifier for CollectingNotifier {
    fn rejected(&self, _name: &str, reason: &IntakeError) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(reason.to_string());
        }
    }

    fn failed(&self, _name: &str, reason: &ProcessingError) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(reason.to_string());
        }
    }
}

/// Terminal state of one file after a batch run, in input order
#[derive(Debug)]
pub enum FileOutcome {
    Registered { name: String },
    Rejected(IntakeError),
    Failed(ProcessingError),
}

impl FileOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

/// Result of one batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Per-file outcomes, in input order
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn registered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_registered()).count()
    }

    pub fn rejected(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Rejected(_)))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed(_)))
            .count()
    }
}

/// The attachment pipeline: one instance per upload flow, configured with
/// that flow's policy and resize bounds.
pub struct AttachmentPipeline<N: Notifier = TracingNotifier> {
    policy: IntakePolicy,
    normalizer: ImageNormalizer,
    notifier: N,
}

impl AttachmentPipeline<TracingNotifier> {
    pub fn new(policy: IntakePolicy, normalizer: ImageNormalizer) -> Self {
        Self {
            policy,
            normalizer,
            notifier: TracingNotifier,
        }
    }

    pub fn from_config(config: &IntakeConfig) -> Self {
        Self::new(IntakePolicy::from(config), ImageNormalizer::from(config))
    }
}

impl<N: Notifier> AttachmentPipeline<N> {
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> AttachmentPipeline<M> {
        AttachmentPipeline {
            policy: self.policy,
            normalizer: self.normalizer,
            notifier,
        }
    }

    pub fn policy(&self) -> &IntakePolicy {
        &self.policy
    }

    /// Process a file selection into the host record's pending list.
    ///
    /// Files are handled one at a time, in selection order. Once a file
    /// enters processing it runs to completion or failure; there is no
    /// cancellation — a user removes an unwanted entry from the list
    /// before saving instead.
    #[instrument(skip(self, files, list), fields(host = %host, files = files.len()))]
    pub async fn ingest(
        &self,
        host: HostKind,
        files: Vec<FileUpload>,
        list: &mut AttachmentList,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for file in files {
            let outcome = self.ingest_one(file, list).await;
            report.outcomes.push(outcome);
        }

        info!(
            host = %host,
            registered = report.registered(),
            rejected = report.rejected(),
            failed = report.failed(),
            "Attachment batch processed"
        );
        report
    }

    async fn ingest_one(&self, file: FileUpload, list: &mut AttachmentList) -> FileOutcome {
        let kind = match self.policy.check(&file) {
            Ok(kind) => kind,
            Err(reason) => {
                self.notifier.rejected(&file.name, &reason);
                return FileOutcome::Rejected(reason);
            }
        };

        // Size and digest describe the original bytes, not the normalized ones
        let original_size = file.size() as i64;
        let digest = content_digest(&file.data);

        let (content_type, data) = match kind {
            AttachmentKind::Image => {
                match self
                    .normalizer
                    .normalize_blocking(file.name.clone(), file.data.clone())
                    .await
                {
                    Ok(normalized) => (normalized.content_type, normalized.data),
                    Err(reason) => {
                        self.notifier.failed(&file.name, &reason);
                        return FileOutcome::Failed(reason);
                    }
                }
            }
            AttachmentKind::Document => (file.effective_content_type(), file.data.clone()),
        };

        let payload = to_data_uri(&content_type, &data);
        list.register(
            file.name.clone(),
            kind,
            payload,
            Some(original_size),
            Some(digest),
        );

        info!(name = %file.name, kind = %kind, size = original_size, "Attachment registered");
        FileOutcome::Registered { name: file.name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::split_data_uri;
    use crate::normalize::ResizeBounds;
    use bytes::Bytes;
    use std::io::Cursor;

    fn image_upload(name: &str, width: u32, height: u32) -> FileUpload {
        let img = image::ImageBuffer::from_pixel(width, height, image::Rgb([10u8, 200, 90]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Jpeg)
            .unwrap();
        FileUpload::new(name, "image/jpeg", Bytes::from(buf.into_inner()))
    }

    fn pdf_upload(name: &str) -> FileUpload {
        FileUpload::new(
            name,
            "application/pdf",
            Bytes::from_static(b"%PDF-1.4 minimal"),
        )
    }

    fn pipeline_with_bounds(max: u32) -> AttachmentPipeline<CollectingNotifier> {
        AttachmentPipeline::new(
            IntakePolicy::default(),
            ImageNormalizer::new(ResizeBounds::new(max, max), 80),
        )
        .with_notifier(CollectingNotifier::new())
    }

    #[tokio::test]
    async fn test_oversized_image_is_downsampled_and_registered() {
        let pipeline = pipeline_with_bounds(64);
        let mut list = AttachmentList::new();

        let report = pipeline
            .ingest(
                HostKind::Issue,
                vec![image_upload("wall.jpg", 200, 100)],
                &mut list,
            )
            .await;

        assert_eq!(report.registered(), 1);
        assert_eq!(list.len(), 1);

        let attachment = &list.as_slice()[0];
        assert_eq!(attachment.kind, Some(AttachmentKind::Image));
        assert!(attachment.size.is_some());
        assert!(attachment.digest.is_some());

        let (mime, _) = split_data_uri(&attachment.payload).unwrap();
        assert_eq!(mime, "image/jpeg");
    }

    #[tokio::test]
    async fn test_too_large_file_is_rejected_before_processing() {
        let pipeline = AttachmentPipeline::new(
            IntakePolicy::new(16),
            ImageNormalizer::default(),
        )
        .with_notifier(CollectingNotifier::new());
        let mut list = AttachmentList::new();

        let big = FileUpload::new("huge.png", "image/png", Bytes::from(vec![0u8; 17]));
        let report = pipeline
            .ingest(HostKind::ProgressEntry, vec![big], &mut list)
            .await;

        assert_eq!(report.rejected(), 1);
        assert!(list.is_empty());

        let notices = pipeline.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("huge.png"));
        assert!(notices[0].contains("too large"));
    }

    #[tokio::test]
    async fn test_pdf_passes_through_without_normalization() {
        let pipeline = pipeline_with_bounds(64);
        let mut list = AttachmentList::new();

        let report = pipeline
            .ingest(HostKind::Project, vec![pdf_upload("permit.pdf")], &mut list)
            .await;

        assert_eq!(report.registered(), 1);
        let attachment = &list.as_slice()[0];
        assert_eq!(attachment.kind, Some(AttachmentKind::Document));

        let (mime, b64) = split_data_uri(&attachment.payload).unwrap();
        assert_eq!(mime, "application/pdf");
        // Payload is the original bytes, untouched
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .unwrap();
        assert_eq!(decoded, b"%PDF-1.4 minimal");
    }

    #[tokio::test]
    async fn test_batch_is_fault_isolated() {
        let pipeline = pipeline_with_bounds(64);
        let mut list = AttachmentList::new();

        let corrupt = FileUpload::new(
            "corrupt.jpg",
            "image/jpeg",
            Bytes::from_static(b"not actually a jpeg"),
        );
        let report = pipeline
            .ingest(
                HostKind::Task,
                vec![
                    image_upload("first.jpg", 100, 80),
                    corrupt,
                    image_upload("third.jpg", 100, 80),
                ],
                &mut list,
            )
            .await;

        // Files 1 and 3 registered, file 2 failed, batch continued
        assert_eq!(report.registered(), 2);
        assert_eq!(report.failed(), 1);
        assert_eq!(list.len(), 2);

        let names: Vec<&str> = list.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["first.jpg", "third.jpg"]);

        let notices = pipeline.notifier.notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].contains("corrupt.jpg"));
    }

    #[tokio::test]
    async fn test_outcomes_preserve_input_order() {
        let pipeline = pipeline_with_bounds(64);
        let mut list = AttachmentList::new();

        let report = pipeline
            .ingest(
                HostKind::Issue,
                vec![
                    image_upload("ok.jpg", 100, 80),
                    FileUpload::new("nope.txt", "text/plain", Bytes::from_static(b"hi")),
                ],
                &mut list,
            )
            .await;

        assert!(report.outcomes[0].is_registered());
        assert!(matches!(report.outcomes[1], FileOutcome::Rejected(_)));
    }

    #[tokio::test]
    async fn test_appends_to_existing_list() {
        let pipeline = pipeline_with_bounds(64);
        let mut list = AttachmentList::new();
        list.register(
            "existing.pdf",
            AttachmentKind::Document,
            "data:application/pdf;base64,AAAA",
            Some(4),
            None,
        );

        pipeline
            .ingest(
                HostKind::Issue,
                vec![image_upload("new.jpg", 100, 80)],
                &mut list,
            )
            .await;

        let names: Vec<&str> = list.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["existing.pdf", "new.jpg"]);
    }

    #[tokio::test]
    async fn test_normalized_image_lands_within_flow_bounds() {
        // Same file, two flows with different bounds
        let landscape = AttachmentPipeline::new(
            IntakePolicy::default(),
            ImageNormalizer::new(ResizeBounds::LANDSCAPE, 80),
        );
        let square = AttachmentPipeline::new(
            IntakePolicy::default(),
            ImageNormalizer::new(ResizeBounds::SQUARE, 80),
        );

        let mut list_a = AttachmentList::new();
        let mut list_b = AttachmentList::new();
        landscape
            .ingest(
                HostKind::Issue,
                vec![image_upload("tall.jpg", 1000, 2000)],
                &mut list_a,
            )
            .await;
        square
            .ingest(
                HostKind::Project,
                vec![image_upload("tall.jpg", 1000, 2000)],
                &mut list_b,
            )
            .await;

        assert_eq!(list_a.len(), 1);
        assert_eq!(list_b.len(), 1);
        // Bounds differ, so the payloads differ: 1080-bounded vs 1920-bounded
        assert_ne!(list_a.as_slice()[0].payload, list_b.as_slice()[0].payload);
    }
}
