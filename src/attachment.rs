// SPDX-License-Identifier: MIT
//
// Single-slot store for a file attached to the next submitted message.
// Files are read fully into memory and base64-encoded here; nothing else
// in the crate looks at file bytes.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

#[derive(Debug, Clone)]
pub(crate) struct PendingAttachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: String,
    pub is_image: bool,
}

#[derive(Default)]
pub(crate) struct AttachmentStore {
    pending: Option<PendingAttachment>,
}

impl AttachmentStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Read `path` into the pending slot, replacing any previous
    /// attachment. Any readable file is accepted.
    pub(crate) fn attach(&mut self, path: &Path) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_for_path(path).to_string();
        let is_image = mime_type.starts_with("image/");

        self.pending = Some(PendingAttachment {
            file_name,
            mime_type,
            data: STANDARD.encode(&bytes),
            is_image,
        });
        Ok(())
    }

    /// Idempotent.
    pub(crate) fn clear(&mut self) {
        self.pending = None;
    }

    /// Consume the pending attachment for inclusion in an outbound message.
    pub(crate) fn take(&mut self) -> Option<PendingAttachment> {
        self.pending.take()
    }

    pub(crate) fn pending(&self) -> Option<&PendingAttachment> {
        self.pending.as_ref()
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" | "md" => "text/plain",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}
