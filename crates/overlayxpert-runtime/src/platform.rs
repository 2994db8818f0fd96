//! Platform-specific overlay window configuration.
//!
//! Click-through itself goes through `set_ignore_cursor_events`; this module
//! only adds what Tauri does not expose.

use overlayxpert_core::Error;
use tauri::WebviewWindow;

/// Keep an overlay out of the taskbar and the Alt+Tab switcher, and above
/// normal windows.
pub fn configure_overlay(window: &WebviewWindow) -> Result<(), Error> {
    #[cfg(target_os = "windows")]
    configure_overlay_windows(window)?;

    #[cfg(not(target_os = "windows"))]
    let _ = window;

    Ok(())
}

#[cfg(target_os = "windows")]
fn configure_overlay_windows(window: &WebviewWindow) -> Result<(), Error> {
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        GWL_EXSTYLE, GetWindowLongPtrW, HWND_TOPMOST, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE,
        SetWindowLongPtrW, SetWindowPos, WS_EX_TOOLWINDOW,
    };

    let hwnd = window
        .hwnd()
        .map_err(|e| Error::Surface(format!("Failed to get HWND handle: {e}")))?;

    unsafe {
        let hwnd = HWND(hwnd.0);

        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE) | WS_EX_TOOLWINDOW.0 as isize;
        SetWindowLongPtrW(hwnd, GWL_EXSTYLE, ex_style);

        SetWindowPos(
            hwnd,
            Some(HWND_TOPMOST),
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        )
        .map_err(|e| Error::Surface(format!("Failed to set window position: {e}")))?;
    }

    Ok(())
}
