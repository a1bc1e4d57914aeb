//! Failure diagnostics
//!
//! Formats failures into a user-facing report (summary plus technical
//! detail) and serializes the exact same text to the system clipboard on
//! request. Diagnostics must never themselves fail: clipboard errors are
//! logged and swallowed.

use std::error::Error;
use std::time::Duration;
use tracing::warn;

use crate::extract::ExtractError;

/// How long the copy button shows its confirmation before reverting.
pub const COPY_CONFIRM_INTERVAL: Duration = Duration::from_secs(2);

/// Immutable snapshot of a failure, built once at failure time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub summary: String,
    /// Preformatted technical-detail block, when there is anything to show.
    pub technical_detail: Option<String>,
    /// Ordered (kind, message) pairs: the failure itself, then its causes.
    pub cause_chain: Vec<(String, String)>,
}

impl ErrorRecord {
    /// Capture an error and its cause chain. `kind` names the failure
    /// taxonomy variant; causes whose concrete types are not known at
    /// capture time fall back to the generic `Error` kind.
    pub fn from_error(kind: &str, error: &(dyn Error + 'static)) -> Self {
        Self::with_cause_kinds(kind, error, &[])
    }

    /// Like [`Self::from_error`], additionally naming the leading causes
    /// where their concrete types are known at capture time.
    pub fn with_cause_kinds(
        kind: &str,
        error: &(dyn Error + 'static),
        cause_kinds: &[&str],
    ) -> Self {
        let mut cause_chain = vec![(kind.to_string(), error.to_string())];
        let mut source = error.source();
        let mut depth = 0;
        while let Some(cause) = source {
            let cause_kind = cause_kinds.get(depth).copied().unwrap_or("Error");
            cause_chain.push((cause_kind.to_string(), cause.to_string()));
            source = cause.source();
            depth += 1;
        }

        // Detail shows the failure and at most one level of cause.
        let mut detail = format!("{}: {}", cause_chain[0].0, cause_chain[0].1);
        if let Some((cause_kind, message)) = cause_chain.get(1) {
            detail.push_str(&format!("\nCaused by: {cause_kind}: {message}"));
        }

        Self {
            summary: error.to_string(),
            technical_detail: Some(detail),
            cause_chain,
        }
    }

    pub fn from_extract_error(error: &ExtractError) -> Self {
        match error.cause_kind() {
            Some(cause_kind) => Self::with_cause_kinds(error.kind(), error, &[cause_kind]),
            None => Self::from_error(error.kind(), error),
        }
    }
}

/// Exact dialog layout: `<title>\n\n<message>` optionally followed by
/// `\n\nTechnical Details:\n<detail>`. This is also the verbatim clipboard
/// payload of the copy action.
pub fn compose_report(title: &str, message: &str, record: Option<&ErrorRecord>) -> String {
    let mut report = format!("{title}\n\n{message}");
    if let Some(detail) = record
        .and_then(|r| r.technical_detail.as_deref())
        .filter(|d| !d.trim().is_empty())
    {
        report.push_str("\n\nTechnical Details:\n");
        report.push_str(detail);
    }
    report
}

/// Write `text` to the system clipboard. Returns whether the write landed;
/// failure is never fatal.
pub fn copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.to_string())) {
        Ok(()) => true,
        Err(e) => {
            warn!("clipboard write failed: {e}");
            false
        }
    }
}
