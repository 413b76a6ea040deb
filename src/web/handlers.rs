//! Upload handling. Files are converted one after another; each is written
//! to its own temp file, converted on the blocking pool and the temp file is
//! removed before the next one starts.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
    response::Html,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{AppState, WebError, page};
use crate::config::Settings;
use crate::error::Result as ConvertResult;
use crate::export::{ExportDescriptor, ExportFormat};
use crate::stats::{ConversionStats, StatsView, human_size};
use crate::{ConvertOptions, convert_from_path_with};

/// Multipart field the page posts files under.
pub const FILES_FIELD: &str = "files";

#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Converted {
        markdown: String,
        stats: StatsView,
        exports: Vec<ExportDescriptor>,
        converted_at: DateTime<Utc>,
    },
    Failed {
        message: String,
    },
}

impl FileReport {
    fn failed(file_name: String, message: String) -> Self {
        Self {
            file_name,
            outcome: Outcome::Failed { message },
        }
    }

    pub fn is_converted(&self) -> bool {
        matches!(self.outcome, Outcome::Converted { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub results: Vec<FileReport>,
    pub converted: usize,
    pub failed: usize,
    pub totals: StatsView,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.settings))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// POST /api/convert
pub async fn convert_uploads(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, WebError> {
    let mut multipart = multipart?;
    let mut results = Vec::new();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            warn!(field = field.name().unwrap_or(""), "ignoring unknown multipart field");
            continue;
        }
        // Browsers send an empty part when nothing was picked.
        let Some(file_name) = field.file_name().map(display_name).filter(|n| !n.is_empty()) else {
            continue;
        };
        let report = match read_field(&mut field, state.settings.upload.max_file_bytes).await? {
            Some(data) => process_upload(&state.settings, file_name, data).await,
            None => too_large(&state.settings, file_name),
        };
        results.push(report);
    }

    if results.is_empty() {
        return Err(WebError::NoFiles);
    }

    let mut totals = ConversionStats::default();
    for report in &results {
        if let Outcome::Converted { stats, .. } = &report.outcome {
            totals.accumulate(&stats.stats);
        }
    }
    let converted = results.iter().filter(|r| r.is_converted()).count();

    info!(
        files = results.len(),
        converted,
        original_bytes = totals.original_bytes,
        converted_bytes = totals.converted_bytes,
        "upload batch finished"
    );

    Ok(Json(ConvertResponse {
        failed: results.len() - converted,
        converted,
        totals: totals.into(),
        results,
    }))
}

/// Validate, convert and describe one uploaded file.
pub async fn process_upload(settings: &Settings, file_name: String, bytes: Vec<u8>) -> FileReport {
    if !settings.is_allowed(&file_name) {
        return FileReport::failed(
            file_name.clone(),
            format!(
                "{} is not a supported file type. Accepted: {}.",
                file_name,
                settings.upload.allowed_extensions.join(", ")
            ),
        );
    }
    if bytes.len() > settings.upload.max_file_bytes {
        return too_large(settings, file_name);
    }

    let original_bytes = bytes.len() as u64;
    let temp_dir = settings.temp_dir();
    let options = settings.convert_options();
    let suffix = extension_suffix(&file_name);

    let task = tokio::task::spawn_blocking(move || convert_via_temp_file(&temp_dir, &suffix, &bytes, &options));

    let markdown = match tokio::time::timeout(settings.convert_timeout(), task).await {
        Ok(Ok(Ok(markdown))) => markdown,
        Ok(Ok(Err(e))) => {
            warn!(file_name = %file_name, error = %e, "conversion failed");
            return unreadable(file_name);
        }
        Ok(Err(e)) => {
            warn!(file_name = %file_name, error = %e, "conversion task aborted");
            return unreadable(file_name);
        }
        Err(_) => {
            warn!(file_name = %file_name, timeout_secs = settings.convert.timeout_secs, "conversion timed out");
            return unreadable(file_name);
        }
    };

    let stats = ConversionStats::new(original_bytes, &markdown);
    info!(
        file_name = %file_name,
        original_bytes,
        converted_bytes = stats.converted_bytes,
        reduction = %format!("{:.1}%", stats.reduction_percent()),
        "converted upload"
    );

    FileReport {
        outcome: Outcome::Converted {
            exports: ExportFormat::ALL
                .iter()
                .map(|format| format.descriptor(&file_name))
                .collect(),
            stats: stats.into(),
            converted_at: Utc::now(),
            markdown,
        },
        file_name,
    }
}

/// Read one file part, giving up as soon as it passes `limit` bytes. The
/// unread rest is skipped when the next field is requested.
async fn read_field(field: &mut Field<'_>, limit: usize) -> Result<Option<Vec<u8>>, WebError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await? {
        if data.len() + chunk.len() > limit {
            return Ok(None);
        }
        data.extend_from_slice(&chunk);
    }
    Ok(Some(data))
}

fn too_large(settings: &Settings, file_name: String) -> FileReport {
    let message = format!(
        "{} exceeds the {} upload limit.",
        file_name,
        human_size(settings.upload.max_file_bytes as u64)
    );
    FileReport::failed(file_name, message)
}

fn unreadable(file_name: String) -> FileReport {
    let message = format!("Could not read {}. Please check the format.", file_name);
    FileReport::failed(file_name, message)
}

/// Write the upload to a uniquely named temp file, convert it by path and
/// remove the file again whatever the outcome.
fn convert_via_temp_file(
    temp_dir: &Path,
    suffix: &str,
    bytes: &[u8],
    options: &ConvertOptions,
) -> ConvertResult<String> {
    let mut temp = tempfile::Builder::new()
        .prefix("docreader-")
        .suffix(suffix)
        .tempfile_in(temp_dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    let result = convert_from_path_with(temp.path(), options);

    let path = temp.path().to_path_buf();
    if let Err(e) = temp.close() {
        warn!(path = %path.display(), error = %e, "failed to remove temp file");
    }
    result
}

/// Keep only the final path component of a client supplied name.
fn display_name(raw: &str) -> String {
    let normalized = raw.replace('\\', "/");
    normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn extension_suffix(file_name: &str) -> String {
    PathBuf::from(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
