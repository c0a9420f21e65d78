//! Label editing, preview and print handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderName, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::canvas::RenderMode;
use crate::error::PrintError;
use crate::label::{IdentifierAdvisory, LabelRecord, LabelSize};
use crate::preview::PreviewState;

use super::super::state::AppState;
use super::ApiError;

/// Header carrying the preview state alongside the PNG.
pub const PREVIEW_STATE_HEADER: &str = "x-preview-state";

/// Record plus the derived hints the editor shows next to it.
#[derive(Debug, Serialize)]
pub struct LabelView {
    pub label: LabelRecord,
    pub advisory: IdentifierAdvisory,
    pub preview: PreviewState,
    /// Fields from a patch that were not applied.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<&'static str>,
}

async fn view(state: &AppState, record: LabelRecord, ignored: Vec<&'static str>) -> LabelView {
    let preview = state.preview.write().await.refresh(&record).clone();
    LabelView {
        advisory: record.advisory(),
        label: record,
        preview,
        ignored,
    }
}

/// GET /api/label - current record.
pub async fn get(State(state): State<Arc<AppState>>) -> Json<LabelView> {
    let record = state.editor.read().await.record().clone();
    Json(view(&state, record, Vec::new()).await)
}

/// PUT /api/label - replace the whole record.
pub async fn put(
    State(state): State<Arc<AppState>>,
    Json(record): Json<LabelRecord>,
) -> Json<LabelView> {
    let record = {
        let mut editor = state.editor.write().await;
        editor.replace(record);
        editor.record().clone()
    };
    Json(view(&state, record, Vec::new()).await)
}

/// Single-field edits. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct LabelPatch {
    pub fnsku: Option<String>,
    pub title: Option<String>,
    pub condition: Option<String>,
    pub sku: Option<String>,
    #[serde(rename = "labelSize")]
    pub label_size: Option<String>,
}

/// PATCH /api/label - apply field edits.
///
/// Unknown condition or size values are ignored and listed in `ignored`.
pub async fn patch(
    State(state): State<Arc<AppState>>,
    Json(patch): Json<LabelPatch>,
) -> Json<LabelView> {
    let mut ignored = Vec::new();
    let record = {
        let mut editor = state.editor.write().await;
        if let Some(fnsku) = &patch.fnsku {
            editor.set_identifier(fnsku);
        }
        if let Some(title) = &patch.title {
            editor.set_title(title);
        }
        if let Some(sku) = &patch.sku {
            editor.set_sku(sku);
        }
        if let Some(condition) = &patch.condition
            && !editor.set_condition_str(condition)
        {
            ignored.push("condition");
        }
        if let Some(size) = &patch.label_size
            && !editor.set_label_size_str(size)
        {
            ignored.push("labelSize");
        }
        editor.record().clone()
    };
    Json(view(&state, record, ignored).await)
}

/// POST /api/label/reset - clear the form, keeping the label size.
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<LabelView> {
    let record = {
        let mut editor = state.editor.write().await;
        editor.reset();
        editor.record().clone()
    };
    tracing::info!(size = %record.label_size, "label reset");
    Json(view(&state, record, Vec::new()).await)
}

/// GET /api/label/advisory - identifier hint.
pub async fn advisory(State(state): State<Arc<AppState>>) -> Json<IdentifierAdvisory> {
    Json(state.editor.read().await.advisory())
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub safe_zone: bool,
}

/// GET /api/label/preview - PNG of the label as it will print.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response, ApiError> {
    let record = state.editor.read().await.record().clone();
    let (canvas, preview_state) = {
        let mut preview = state.preview.write().await;
        let canvas = preview.canvas(
            &record,
            RenderMode::Preview {
                safe_zone: query.safe_zone,
            },
        );
        (canvas, preview.state().clone())
    };

    let png = canvas
        .to_png()
        .map_err(|e| ApiError::internal(format!("Preview failed: {}", e)))?;

    let state_name = match preview_state {
        PreviewState::Placeholder => "placeholder",
        PreviewState::Current => "current",
        PreviewState::Stale { .. } => "stale",
    };

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (
                HeaderName::from_static(PREVIEW_STATE_HEADER),
                state_name.to_string(),
            ),
        ],
        png,
    )
        .into_response())
}

/// POST /api/label/print - print the current label on the configured target.
pub async fn print(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let record = state.editor.read().await.record().clone();
    if !record.has_identifier() {
        return Err(ApiError::bad_request("Enter an FNSKU before printing"));
    }

    let canvas = state
        .preview
        .write()
        .await
        .print_canvas(&record)
        .map_err(|e| ApiError::bad_request(format!("Cannot print: {}", e)))?;

    // Print to the target (blocking operation, run in separate thread)
    let target = state.print_target.clone();
    let result = tokio::task::spawn_blocking(move || crate::print::print(&canvas, &target)).await;

    match result {
        Ok(Ok(())) => Ok(Json(json!({
            "success": true,
            "message": format!("Label {} sent to {}", record.identifier, state.print_target),
        }))
        .into_response()),
        Ok(Err(e @ PrintError::EmptyLabel)) => Err(ApiError::bad_request(e.to_string())),
        Ok(Err(e)) => {
            tracing::error!(error = %e, print_target = %state.print_target, "print failed");
            Err(ApiError::internal(format!("Print failed: {}", e)))
        }
        Err(e) => Err(ApiError::internal(format!("Task error: {}", e))),
    }
}

#[derive(Debug, Serialize)]
pub struct SizeInfo {
    pub tag: &'static str,
    pub name: &'static str,
    pub width_in: f64,
    pub height_in: f64,
    pub width_dots: u32,
    pub height_dots: u32,
}

/// GET /api/sizes - supported label sizes at the configured resolution.
pub async fn sizes(State(state): State<Arc<AppState>>) -> Json<Vec<SizeInfo>> {
    Json(size_table(state.config.dpi))
}

pub fn size_table(dpi: u32) -> Vec<SizeInfo> {
    LabelSize::ALL
        .iter()
        .map(|size| {
            let (width_in, height_in) = size.inches();
            let (width_dots, height_dots) = size.dots(dpi);
            SizeInfo {
                tag: size.tag(),
                name: size.display_name(),
                width_in,
                height_in,
                width_dots,
                height_dots,
            }
        })
        .collect()
}
