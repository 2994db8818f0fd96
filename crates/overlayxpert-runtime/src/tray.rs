use tauri::{
    App, AppHandle, Manager, Wry,
    image::Image,
    menu::{CheckMenuItem, CheckMenuItemBuilder, MenuBuilder, MenuItemBuilder, PredefinedMenuItem},
    tray::{TrayIconBuilder, TrayIconEvent},
};
use tracing::{error, warn};

use crate::{MAIN_WINDOW, OverlayState, commands::notify_changed};

const TRAY_ICON: &[u8] = include_bytes!("../icons/32x32.png");

/// Tray items whose state follows the application.
pub struct TrayState {
    pub edit_mode: CheckMenuItem<Wry>,
}

pub fn setup_tray(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    // Build menu items
    let add = MenuItemBuilder::with_id("add_overlay", "Add Overlay").build(app)?;
    let edit_mode = CheckMenuItemBuilder::with_id("edit_mode", "Edit Mode")
        .checked(false)
        .build(app)?;
    let separator = PredefinedMenuItem::separator(app)?;
    let show = MenuItemBuilder::with_id("show_manager", "Show Manager").build(app)?;
    let quit = MenuItemBuilder::with_id("quit", "Quit OverlayXpert").build(app)?;

    // Build the menu
    let menu = MenuBuilder::new(app)
        .item(&add)
        .item(&edit_mode)
        .item(&separator)
        .item(&show)
        .item(&quit)
        .build()?;

    // Load tray icon
    let icon = Image::from_bytes(TRAY_ICON)?;

    // Create tray
    let _tray = TrayIconBuilder::new()
        .icon(icon)
        .menu(&menu)
        .tooltip("OverlayXpert")
        .on_menu_event(|app, event| {
            handle_menu_event(app, event.id.as_ref());
        })
        .on_tray_icon_event(|tray, event| {
            // Double-click opens the manager
            if let TrayIconEvent::DoubleClick { .. } = event {
                show_manager(tray.app_handle());
            }
        })
        .build(app)?;

    // Kept so edit mode changes from elsewhere can update the check mark
    app.manage(TrayState { edit_mode });
    Ok(())
}

/// Bring the manager window back from the tray.
pub fn show_manager(app: &AppHandle) {
    let Some(window) = app.get_webview_window(MAIN_WINDOW) else {
        warn!("manager window is gone");
        return;
    };
    if let Err(e) = window.show().and_then(|_| window.unminimize()).and_then(|_| window.set_focus())
    {
        error!(error = %e, "failed to show manager window");
    }
}

fn add_overlay(app: &AppHandle) {
    let state = app.state::<OverlayState>();
    let result = state.lock().and_then(|mut overlays| {
        overlays.add()?;
        notify_changed(app, &overlays);
        Ok(())
    });
    if let Err(e) = result {
        error!(error = %e, "failed to add overlay");
    }
}

/// Menu events arrive on the main thread, which must never wait on the
/// overlay lock. Work that takes it is spawned.
fn handle_menu_event(app: &AppHandle, id: &str) {
    match id {
        "add_overlay" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move { add_overlay(&app) });
        }
        "edit_mode" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                if let Err(e) = crate::toggle_edit_mode(&app) {
                    error!(error = %e, "failed to toggle edit mode");
                }
            });
        }
        "show_manager" => show_manager(app),
        "quit" => app.exit(0),
        _ => {}
    }
}
