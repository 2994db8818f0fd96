use std::sync::{Mutex, MutexGuard};

use overlayxpert_core::{
    AppSettings, DisplayList, OverlayCollection, OverlayEdit, OverlayId, OverlayRecord,
    OverlayRow, PointerEvent,
};
use serde::Serialize;
use tauri::{AppHandle, Emitter, State, WebviewWindow, command};
use tracing::warn;

use crate::{
    Error,
    surface::{TauriSurfaceFactory, css_cursor},
};

pub const CHANGED_EVENT: &str = "overlays://changed";

pub type Overlays = OverlayCollection<TauriSurfaceFactory>;

pub struct OverlayState(pub Mutex<Overlays>);

impl OverlayState {
    pub fn lock(&self) -> Result<MutexGuard<'_, Overlays>, Error> {
        self.0.lock().map_err(|_| Error::LockPoisoned)
    }
}

/// Everything an overlay page needs to draw itself.
#[derive(Debug, Serialize)]
pub struct OverlayFrame {
    pub display: DisplayList,
    pub opacity: f64,
    pub cursor: &'static str,
}

// Commands that take the overlay lock are async so they run off the main
// thread: building or updating a window waits on the main event loop. No
// guard may live across an `.await`.

/// Push the current table to the manager window.
pub fn notify_changed(app: &AppHandle, overlays: &Overlays) {
    if let Err(e) = app.emit_to(crate::MAIN_WINDOW, CHANGED_EVENT, overlays.rows()) {
        warn!(error = %e, "failed to emit overlay change");
    }
}

fn overlay_id(window: &WebviewWindow) -> Result<OverlayId, Error> {
    window
        .label()
        .parse()
        .map_err(|_| Error::NotAnOverlay(window.label().to_string()))
}

#[command]
pub async fn overlay_add(
    app: AppHandle,
    state: State<'_, OverlayState>,
) -> Result<usize, String> {
    let mut overlays = state.lock().map_err(|e| e.to_string())?;
    let index = overlays.add().map_err(|e| e.to_string())?;
    notify_changed(&app, &overlays);
    Ok(index)
}

#[command]
pub async fn overlay_delete(
    app: AppHandle,
    state: State<'_, OverlayState>,
    row: Option<usize>,
) -> Result<bool, String> {
    let mut overlays = state.lock().map_err(|e| e.to_string())?;
    let deleted = overlays.delete(row).map_err(|e| e.to_string())?;
    if deleted {
        notify_changed(&app, &overlays);
    }
    Ok(deleted)
}

#[command]
pub async fn overlay_toggle_active(
    app: AppHandle,
    state: State<'_, OverlayState>,
    row: usize,
) -> Result<bool, String> {
    let mut overlays = state.lock().map_err(|e| e.to_string())?;
    let active = overlays.toggle_active(row).map_err(|e| e.to_string())?;
    notify_changed(&app, &overlays);
    Ok(active)
}

#[command]
pub async fn overlay_set_edit_mode(app: AppHandle, editing: bool) -> Result<(), String> {
    crate::set_edit_mode(&app, editing).map_err(|e| e.to_string())
}

#[command]
pub async fn overlay_edit_mode(state: State<'_, OverlayState>) -> Result<bool, String> {
    let overlays = state.lock().map_err(|e| e.to_string())?;
    Ok(overlays.is_editing())
}

#[command]
pub async fn overlay_rows(
    state: State<'_, OverlayState>,
) -> Result<Vec<OverlayRow>, String> {
    let overlays = state.lock().map_err(|e| e.to_string())?;
    Ok(overlays.rows())
}

#[command]
pub async fn overlay_record(
    state: State<'_, OverlayState>,
    row: usize,
) -> Result<Option<OverlayRecord>, String> {
    let overlays = state.lock().map_err(|e| e.to_string())?;
    Ok(overlays.record(row).cloned())
}

#[command]
pub async fn overlay_apply_edit(
    app: AppHandle,
    state: State<'_, OverlayState>,
    row: usize,
    edit: OverlayEdit,
) -> Result<(), String> {
    let mut overlays = state.lock().map_err(|e| e.to_string())?;
    overlays.apply_edit(row, edit).map_err(|e| e.to_string())?;
    notify_changed(&app, &overlays);
    Ok(())
}

#[command]
pub async fn overlay_process_choices(
    state: State<'_, OverlayState>,
) -> Result<Vec<String>, String> {
    let mut overlays = state.lock().map_err(|e| e.to_string())?;
    Ok(overlays.process_choices())
}

/// Pointer input from an overlay page, in CSS pixels local to the window.
#[command]
pub async fn overlay_pointer(
    app: AppHandle,
    window: WebviewWindow,
    state: State<'_, OverlayState>,
    event: PointerEvent,
) -> Result<(), String> {
    let id = overlay_id(&window).map_err(|e| e.to_string())?;
    let mut overlays = state.lock().map_err(|e| e.to_string())?;
    overlays
        .dispatch_pointer(id, event)
        .map_err(|e| e.to_string())?;
    if matches!(event, PointerEvent::Up { .. }) {
        notify_changed(&app, &overlays);
    }
    Ok(())
}

#[command]
pub async fn overlay_frame(
    window: WebviewWindow,
    state: State<'_, OverlayState>,
) -> Result<OverlayFrame, String> {
    let id = overlay_id(&window).map_err(|e| e.to_string())?;
    let overlays = state.lock().map_err(|e| e.to_string())?;

    let mut display = DisplayList::default();
    overlays.paint(id, &mut display).map_err(|e| e.to_string())?;
    let surface = overlays
        .surface(id)
        .ok_or_else(|| format!("Overlay {id} not found"))?;

    Ok(OverlayFrame {
        display,
        opacity: surface.opacity(),
        cursor: css_cursor(surface.cursor()),
    })
}

#[command]
pub fn app_settings(settings: State<'_, AppSettings>) -> AppSettings {
    settings.inner().clone()
}
