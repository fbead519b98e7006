use std::sync::{Arc, Mutex, PoisonError};

use tracing::{info, warn};

use study_core::model::{DocumentError, DocumentFile, DocumentKind};

use crate::api::{StudyApi, UploadReceipt};
use crate::cancel::RequestScope;
use crate::error::FlowError;
use crate::notice::Notice;
use crate::session_store::SessionStore;

/// Stages one document at a time and sends it to `/upload`.
pub struct UploadFlow {
    api: Arc<dyn StudyApi>,
    store: SessionStore,
    staged: Mutex<Option<DocumentFile>>,
    scope: RequestScope,
}

impl UploadFlow {
    #[must_use]
    pub fn new(api: Arc<dyn StudyApi>, store: SessionStore) -> Self {
        Self {
            api,
            store,
            staged: Mutex::new(None),
            scope: RequestScope::new(),
        }
    }

    /// Replace the staged file. Returns the detected type so the view can
    /// flag an unsupported file right away; nothing is sent.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::UnsupportedType` when the name does not end
    /// in `.pdf`, `.ppt` or `.pptx`. The file is staged anyway and
    /// [`UploadFlow::submit`] rejects it.
    pub fn stage(&self, file: DocumentFile) -> Result<DocumentKind, DocumentError> {
        let kind = DocumentKind::from_file_name(file.name());
        *self.staged.lock().unwrap_or_else(PoisonError::into_inner) = Some(file);
        kind
    }

    #[must_use]
    pub fn staged_name(&self) -> Option<String> {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|file| file.name().to_string())
    }

    pub fn clear(&self) {
        self.staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.store.upload_flag().is_busy()
    }

    /// Validate and upload the staged file.
    ///
    /// Type and emptiness are checked before any network call. On success
    /// the staged file is cleared and the shared document count updated.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NothingStaged`, `FlowError::Document`,
    /// `FlowError::Busy`, `FlowError::Cancelled` or `FlowError::Api`.
    pub async fn submit(&self) -> Result<UploadReceipt, FlowError> {
        let file = self
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(FlowError::NothingStaged)?;
        file.validate()?;

        let _guard = self
            .store
            .upload_flag()
            .try_begin()
            .ok_or(FlowError::Busy)?;
        let token = self.scope.begin();
        let name = file.name().to_string();
        info!(file = %name, bytes = file.size(), "uploading document");

        let mut receipt = match token.run(self.api.upload(file)).await {
            None => return Err(FlowError::Cancelled),
            Some(Err(err)) => {
                warn!(file = %name, error = %err, "upload failed");
                return Err(err.into());
            }
            Some(Ok(receipt)) => receipt,
        };
        if receipt.filename.is_empty() {
            receipt.filename = name;
        }
        info!(
            file = %receipt.filename,
            chunks = receipt.chunks_processed,
            total = receipt.total_documents,
            "document processed"
        );
        self.store.set_document_count(receipt.total_documents);
        self.clear();
        Ok(receipt)
    }

    /// Suppress the result of a running upload.
    pub fn close(&self) {
        self.scope.close();
    }
}

/// Success message for a processed upload.
#[must_use]
pub fn receipt_notice(receipt: &UploadReceipt) -> Notice {
    Notice::success(format!(
        "{} processed: {} chunks (total documents: {})",
        receipt.filename, receipt.chunks_processed, receipt.total_documents
    ))
}
