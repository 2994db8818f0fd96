//! Foreground process lookup
//!
//! Resolves the executable name of the process owning the focused top-level
//! window, and lists processes that own visible windows. Every failure along
//! the way (no focused window, no owner, process exited mid-lookup) yields
//! "unknown" rather than an error.

use std::collections::BTreeSet;

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::trace;

pub trait ForegroundProcessResolver {
    fn current_foreground_process_name(&mut self) -> Option<String>;

    /// Names of processes owning at least one visible, titled window.
    fn enumerate_visible_process_names(&mut self) -> BTreeSet<String>;
}

/// Resolver backed by the OS window manager and `sysinfo`.
pub struct SystemResolver {
    system: System,
}

impl SystemResolver {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    fn process_names(&mut self, pids: &[Pid]) -> BTreeSet<String> {
        if pids.is_empty() {
            return BTreeSet::new();
        }
        self.system
            .refresh_processes(ProcessesToUpdate::Some(pids), true);
        pids.iter()
            .filter_map(|pid| self.system.process(*pid))
            .map(|process| process.name().to_string_lossy().into_owned())
            .collect()
    }

    #[cfg(target_os = "windows")]
    fn foreground_pid() -> Option<u32> {
        use windows::Win32::UI::WindowsAndMessaging::{
            GetForegroundWindow, GetWindowThreadProcessId,
        };

        unsafe {
            let hwnd = GetForegroundWindow();
            if hwnd.0.is_null() {
                return None;
            }
            let mut pid: u32 = 0;
            GetWindowThreadProcessId(hwnd, Some(&mut pid));
            (pid != 0).then_some(pid)
        }
    }

    #[cfg(target_os = "windows")]
    fn visible_window_pids() -> Vec<u32> {
        use windows::Win32::Foundation::{BOOL, HWND, LPARAM};
        use windows::Win32::UI::WindowsAndMessaging::{
            EnumWindows, GetWindowTextLengthW, GetWindowThreadProcessId, IsWindowVisible,
        };

        unsafe extern "system" fn collect(hwnd: HWND, lparam: LPARAM) -> BOOL {
            unsafe {
                if IsWindowVisible(hwnd).as_bool() && GetWindowTextLengthW(hwnd) > 0 {
                    let pids = &mut *(lparam.0 as *mut Vec<u32>);
                    let mut pid: u32 = 0;
                    GetWindowThreadProcessId(hwnd, Some(&mut pid));
                    if pid != 0 {
                        pids.push(pid);
                    }
                }
            }
            BOOL(1)
        }

        let mut pids: Vec<u32> = Vec::new();
        unsafe {
            let _ = EnumWindows(Some(collect), LPARAM(&mut pids as *mut Vec<u32> as isize));
        }
        pids.sort_unstable();
        pids.dedup();
        pids
    }

    #[cfg(target_os = "linux")]
    fn foreground_pid() -> Option<u32> {
        use std::process::Command;

        let output = Command::new("xdotool")
            .args(["getactivewindow", "getwindowpid"])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        String::from_utf8_lossy(&output.stdout).trim().parse().ok()
    }

    #[cfg(target_os = "linux")]
    fn visible_window_pids() -> Vec<u32> {
        use std::process::Command;

        // wmctrl -l -p: window_id desktop_id pid host title
        let Ok(output) = Command::new("wmctrl").args(["-l", "-p"]).output() else {
            return Vec::new();
        };
        if !output.status.success() {
            return Vec::new();
        }
        let mut pids: Vec<u32> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter_map(|line| {
                let parts: Vec<&str> = line.split_whitespace().collect();
                (parts.len() >= 5).then(|| parts[2].parse().ok()).flatten()
            })
            .filter(|pid| *pid != 0)
            .collect();
        pids.sort_unstable();
        pids.dedup();
        pids
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    fn foreground_pid() -> Option<u32> {
        None
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux")))]
    fn visible_window_pids() -> Vec<u32> {
        Vec::new()
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ForegroundProcessResolver for SystemResolver {
    fn current_foreground_process_name(&mut self) -> Option<String> {
        let pid = Self::foreground_pid()?;
        // The process may have exited since the window lookup; that simply
        // resolves to no name.
        let name = self.process_names(&[Pid::from_u32(pid)]).into_iter().next();
        trace!(pid, ?name, "resolved foreground process");
        name
    }

    fn enumerate_visible_process_names(&mut self) -> BTreeSet<String> {
        let pids: Vec<Pid> = Self::visible_window_pids()
            .into_iter()
            .map(Pid::from_u32)
            .collect();
        self.process_names(&pids)
    }
}
