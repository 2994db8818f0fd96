mod commands;
mod error;
mod logging;
mod platform;
mod surface;
mod tray;

use std::sync::Mutex;
use std::time::Duration;

use overlayxpert_core::{
    AppSettings, CollectionOptions, JsonFileStore, OverlayCollection, OverlayId, SystemResolver,
};
use tauri::{AppHandle, Emitter, Manager, PhysicalSize, Window, WindowEvent};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

pub use commands::{OverlayFrame, OverlayState, Overlays};
pub use error::Error;
pub use surface::{TauriSurface, TauriSurfaceFactory};
use tray::TrayState;

pub const MAIN_WINDOW: &str = "main";
pub const EDIT_MODE_EVENT: &str = "overlays://edit-mode";

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(50);

/// Lock or unlock every overlay and keep the tray check mark in step.
pub fn set_edit_mode(app: &AppHandle, editing: bool) -> Result<(), Error> {
    // The guard is a temporary, so the lock is released before the tray
    // update, which waits on the main thread.
    app.state::<OverlayState>().lock()?.set_edit_mode(editing)?;

    if let Some(tray) = app.try_state::<TrayState>() {
        tray.edit_mode.set_checked(editing)?;
    }
    if let Err(e) = app.emit(EDIT_MODE_EVENT, editing) {
        warn!(error = %e, "failed to emit edit mode change");
    }

    info!(editing, "edit mode switched");
    Ok(())
}

pub fn toggle_edit_mode(app: &AppHandle) -> Result<(), Error> {
    let editing = !app.state::<OverlayState>().lock()?.is_editing();
    set_edit_mode(app, editing)
}

fn sweep_once(app: &AppHandle) {
    let result = app
        .state::<OverlayState>()
        .lock()
        .and_then(|mut overlays| overlays.sweep().map_err(Error::from));
    if let Err(e) = result {
        warn!(error = %e, "visibility sweep failed");
    }
}

fn spawn_sweep_loop(app: AppHandle, period: Duration) {
    tauri::async_runtime::spawn(async move {
        // interval panics on a zero period
        let mut ticker = tokio::time::interval(period.max(MIN_SWEEP_INTERVAL));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&app);
        }
    });
}

/// An overlay window changed size without going through the collection.
fn overlay_resized(window: &Window, size: PhysicalSize<u32>) {
    let Ok(id) = window.label().parse::<OverlayId>() else {
        return;
    };
    let Ok(scale) = window.scale_factor() else {
        return;
    };
    let logical = size.to_logical::<f64>(scale);

    let Some(state) = window.try_state::<OverlayState>() else {
        return;
    };
    // Our own set_bounds raises this event too; if the lock is taken the
    // change is already being recorded.
    let Ok(mut overlays) = state.0.try_lock() else {
        return;
    };
    let changed = overlays
        .surface_mut(id)
        .is_some_and(|surface| {
            surface.observe_size(logical.width.round() as i32, logical.height.round() as i32)
        });
    if !changed {
        return;
    }
    if let Err(e) = overlays.on_surface_resized(id) {
        warn!(%id, error = %e, "failed to record overlay resize");
    }
}

fn prompt_close(window: &Window) {
    let window_clone = window.clone();
    window
        .dialog()
        .message("What would you like to do?")
        .title("Close OverlayXpert")
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::OkCancelCustom(
            "Minimize to Tray".to_string(),
            "Quit".to_string(),
        ))
        .show(move |minimize| {
            if minimize {
                // "Minimize to Tray" was clicked - hide the window
                let _ = window_clone.hide();
            } else {
                // "Quit" was clicked - exit the application
                window_clone.app_handle().exit(0);
            }
        });
}

#[cfg(desktop)]
fn shortcut_plugin(shortcut: &str) -> tauri::plugin::TauriPlugin<tauri::Wry> {
    use tauri_plugin_global_shortcut::{Builder, ShortcutState};

    let builder = || {
        Builder::new().with_handler(|app, _shortcut, event| {
            if event.state() != ShortcutState::Pressed {
                return;
            }
            // Runs off the main thread, like the tray menu
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Err(e) = toggle_edit_mode(&app) {
                    error!(error = %e, "failed to toggle edit mode");
                }
            });
        })
    };

    // Fall back to a plugin with no shortcut so the app still starts
    match builder().with_shortcut(shortcut) {
        Ok(builder) => builder.build(),
        Err(e) => {
            warn!(shortcut, error = %e, "invalid edit mode shortcut, none registered");
            builder().build()
        }
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let settings = AppSettings::load();
    logging::init(settings.debug_logging);
    info!(store = %settings.resolved_store_path().display(), "starting OverlayXpert");

    let mut builder = tauri::Builder::default().plugin(tauri_plugin_dialog::init());

    #[cfg(desktop)]
    {
        builder = builder.plugin(shortcut_plugin(&settings.edit_mode_shortcut));
    }

    builder
        .invoke_handler(tauri::generate_handler![
            commands::overlay_add,
            commands::overlay_delete,
            commands::overlay_toggle_active,
            commands::overlay_set_edit_mode,
            commands::overlay_edit_mode,
            commands::overlay_rows,
            commands::overlay_record,
            commands::overlay_apply_edit,
            commands::overlay_process_choices,
            commands::overlay_pointer,
            commands::overlay_frame,
            commands::app_settings,
        ])
        .setup(move |app| {
            let handle = app.handle().clone();

            // Load stored overlays before anything can reach the state.
            // Setup runs on the main thread, so windows are built directly.
            let mut overlays = OverlayCollection::new(
                TauriSurfaceFactory::new(handle.clone()),
                Box::new(JsonFileStore::new(settings.resolved_store_path())),
                Box::new(SystemResolver::new()),
                CollectionOptions {
                    edge_margin: settings.edge_margin,
                    screen: settings.screen(),
                },
            );
            overlays.load()?;
            app.manage(OverlayState(Mutex::new(overlays)));

            tray::setup_tray(app)?;

            // Visibility follows the foreground process from here on
            spawn_sweep_loop(handle, Duration::from_millis(settings.sweep_interval_ms));
            app.manage(settings);

            Ok(())
        })
        .on_window_event(|window, event| match event {
            // Only intercept close for the manager window
            WindowEvent::CloseRequested { api, .. } if window.label() == MAIN_WINDOW => {
                api.prevent_close();
                prompt_close(window);
            }
            WindowEvent::Resized(size) => overlay_resized(window, *size),
            _ => {}
        })
        .run(tauri::generate_context!())
        .expect("error running OverlayXpert")
}
