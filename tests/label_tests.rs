//! # Label Workflow Tests
//!
//! End-to-end checks across the editor, storage, preview and print layers:
//!
//! - A complete label renders every field onto a label-sized canvas
//! - Editor state survives a restart through the file store
//! - Preview and print differ only by the safe-zone guide
//! - The printer receives the same pixels the preview showed

use labelkit::barcode::{self, RenderOptions};
use labelkit::canvas::{DEFAULT_DPI, Element, RenderMode, TextRole};
use labelkit::label::{Condition, LabelEditor, LabelRecord, LabelSize};
use labelkit::preview::{LivePreview, PreviewState};
use labelkit::print::{self, PrintTarget, epl2};
use labelkit::storage::{FileStore, KeyValueStore, LabelStore, StorageLayout};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn spatula() -> LabelRecord {
    let mut record = LabelRecord::default();
    record.set_identifier("X001234567");
    record.set_title("Silicone Spatula Set");
    record.set_condition(Condition::UsedGood);
    record.set_sku("ABC-1");
    record
}

fn file_editor(path: &Path, layout: StorageLayout) -> LabelEditor {
    let backend: Box<dyn KeyValueStore> = Box::new(FileStore::new(path));
    LabelEditor::with_store(LabelStore::new(backend, layout))
}

// ============================================================================
// RENDERING
// ============================================================================

#[test]
fn test_complete_standard_label() {
    let record = spatula();
    let symbol = barcode::render(
        &record.identifier,
        &RenderOptions::for_label(record.label_size, DEFAULT_DPI),
    )
    .unwrap();
    assert!(!symbol.bars().is_empty());
    assert_eq!(symbol.human_readable_text(), "X001234567");

    let mut preview = LivePreview::new(DEFAULT_DPI);
    let canvas = preview.print_canvas(&record).unwrap();

    assert_eq!(canvas.physical_size(), (4.0, 6.0));
    assert!(canvas.has_barcode());
    assert_eq!(canvas.texts(TextRole::Identifier), vec!["X001234567"]);
    assert_eq!(canvas.texts(TextRole::Title), vec!["Silicone Spatula Set"]);
    assert_eq!(canvas.texts(TextRole::Condition), vec!["Used - Good"]);
    assert_eq!(canvas.texts(TextRole::Sku), vec!["ABC-1"]);
}

#[test]
fn test_switching_size_keeps_fields() {
    let mut record = spatula();
    record.set_label_size(LabelSize::Compact);
    assert_eq!(record.identifier, "X001234567");
    assert_eq!(record.sku, "ABC-1");

    let mut preview = LivePreview::new(DEFAULT_DPI);
    let canvas = preview.print_canvas(&record).unwrap();
    assert_eq!(canvas.physical_size(), (2.25, 1.25));
    assert_eq!((canvas.width(), canvas.height()), (457, 254));
    assert_eq!(canvas.texts(TextRole::Sku), vec!["ABC-1"]);
}

#[test]
fn test_preview_and_print_differ_only_by_guide() {
    let record = spatula();
    let mut preview = LivePreview::new(DEFAULT_DPI);
    let plain = preview.canvas(&record, RenderMode::Preview { safe_zone: false });
    let printed = preview.print_canvas(&record).unwrap();
    assert_eq!(plain.pixels(), printed.pixels());

    let guided = preview.canvas(&record, RenderMode::Preview { safe_zone: true });
    let guide_count = guided
        .elements()
        .iter()
        .filter(|e| matches!(e, Element::SafeZone { .. }))
        .count();
    assert_eq!(guide_count, 1);
    assert_eq!(guided.elements().len(), printed.elements().len() + 1);
}

#[test]
fn test_bad_keystroke_keeps_preview() {
    let mut preview = LivePreview::new(DEFAULT_DPI);
    let mut record = spatula();
    let before = preview
        .canvas(&record, RenderMode::Preview { safe_zone: false })
        .pixels()
        .to_vec();

    record.set_identifier("X00123456€");
    let after = preview.canvas(&record, RenderMode::Preview { safe_zone: false });
    assert!(matches!(preview.state(), PreviewState::Stale { .. }));
    assert!(after.has_barcode());
    assert_eq!(after.texts(TextRole::Identifier), vec!["X001234567"]);
    assert_eq!(after.pixels().len(), before.len());

    // Not printable while stale
    assert!(preview.print_canvas(&record).is_err());
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_editor_survives_restart() {
    for layout in [StorageLayout::default(), StorageLayout::per_field()] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("labelkit.json");

        {
            let mut editor = file_editor(&path, layout.clone());
            editor.set_identifier(" x001234567 ");
            editor.set_title("Silicone Spatula Set");
            assert!(editor.set_condition_str("Used - Good"));
            editor.set_sku("ABC-1");
        }

        let editor = file_editor(&path, layout.clone());
        assert_eq!(editor.record(), &spatula(), "layout {}", layout);
    }
}

#[test]
fn test_malformed_store_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labelkit.json");
    fs::write(&path, "{ not json").unwrap();

    let mut editor = file_editor(&path, StorageLayout::default());
    assert_eq!(editor.record(), &LabelRecord::default());

    // The next change repairs the file
    editor.set_identifier("X001234567");
    let editor = file_editor(&path, StorageLayout::default());
    assert_eq!(editor.record().identifier, "X001234567");
}

#[test]
fn test_reset_persists_and_keeps_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labelkit.json");

    let mut editor = file_editor(&path, StorageLayout::default());
    editor.replace(LabelRecord {
        label_size: LabelSize::Compact,
        ..spatula()
    });
    editor.reset();

    let editor = file_editor(&path, StorageLayout::default());
    assert_eq!(
        editor.record(),
        &LabelRecord {
            label_size: LabelSize::Compact,
            ..Default::default()
        }
    );
}

#[test]
fn test_blob_schema_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("labelkit.json");
    let mut editor = file_editor(&path, StorageLayout::default());
    editor.replace(spatula());

    let outer: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let blob: serde_json::Value =
        serde_json::from_str(outer["fba-label-kit"].as_str().unwrap()).unwrap();
    assert_eq!(
        blob,
        serde_json::json!({
            "fnsku": "X001234567",
            "title": "Silicone Spatula Set",
            "condition": "Used - Good",
            "sku": "ABC-1",
            "labelSize": "4x6"
        })
    );
}

// ============================================================================
// PRINTING
// ============================================================================

#[test]
fn test_device_receives_preview_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let device = dir.path().join("lp0");
    fs::write(&device, b"").unwrap();

    let record = spatula();
    let mut preview = LivePreview::new(DEFAULT_DPI);
    let shown = preview.canvas(&record, RenderMode::Preview { safe_zone: false });
    let canvas = preview.print_canvas(&record).unwrap();
    print::print(&canvas, &PrintTarget::Device(device.clone())).unwrap();

    let job = fs::read(&device).unwrap();
    let header = format!("GW0,0,{},{}\r\n", shown.width_bytes(), shown.height());
    let start = job
        .windows(header.len())
        .position(|w| w == header.as_bytes())
        .unwrap()
        + header.len();
    let rows = &job[start..start + shown.to_row_bytes().len()];

    let expected: Vec<u8> = shown.to_row_bytes().iter().map(|b| !b).collect();
    assert_eq!(rows, expected.as_slice());
    assert_eq!(job, epl2::label_job(&canvas));
}
