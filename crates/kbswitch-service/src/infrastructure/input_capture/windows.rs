//! Windows low-level keyboard hook and foreground tracking.
//!
//! Installs `WH_KEYBOARD_LL` for key-downs and key-ups, and an out-of-context
//! `EVENT_SYSTEM_FOREGROUND` WinEvent hook that reports the executable name of
//! the newly focused window. Both hooks live on one dedicated Win32
//! message-loop thread.
//!
//! Key events are observed, never swallowed: the hook always forwards to the
//! next hook in the chain.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Windows API FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::OnceLock;
use std::thread;

use tracing::{debug, error};
use windows::core::PWSTR;
use windows::Win32::Foundation::{CloseHandle, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::Threading::{
    GetCurrentThreadId, OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, GetWindowThreadProcessId, PostThreadMessageW,
    SetWindowsHookExW, UnhookWindowsHookEx, EVENT_SYSTEM_FOREGROUND, HC_ACTION, KBDLLHOOKSTRUCT,
    KBDLLHOOKSTRUCT_FLAGS, LLKHF_EXTENDED, MSG, WH_KEYBOARD_LL, WINEVENT_OUTOFCONTEXT,
    WM_KEYDOWN, WM_KEYUP, WM_QUIT, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::{CaptureError, InputSource, RawInputEvent};

/// Global sender used by hook callbacks to deliver events to the consumer.
/// Initialized once by [`WindowsInputSource::start`].
static EVENT_SENDER: OnceLock<Sender<RawInputEvent>> = OnceLock::new();

/// Thread id of the hook message loop, `0` until it is running.
static HOOK_THREAD_ID: AtomicU32 = AtomicU32::new(0);

/// Windows keyboard and foreground capture.
#[derive(Debug, Default)]
pub struct WindowsInputSource;

impl WindowsInputSource {
    pub fn new() -> Self {
        Self
    }
}

impl InputSource for WindowsInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let (tx, rx) = mpsc::channel::<RawInputEvent>();

        EVENT_SENDER
            .set(tx)
            .map_err(|_| CaptureError::AlreadyStarted)?;

        thread::Builder::new()
            .name("kbswitch-hook-loop".to_string())
            .spawn(run_hook_message_loop)
            .map_err(|e| CaptureError::KeyboardHookInstallFailed(e.to_string()))?;

        Ok(rx)
    }

    fn stop(&self) {
        let thread_id = HOOK_THREAD_ID.load(Ordering::SeqCst);
        if thread_id != 0 {
            // SAFETY: Posting WM_QUIT to a thread id we recorded ourselves; a
            // stale id only makes the call fail.
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
            }
        }
    }
}

/// Entry point for the dedicated Win32 message loop thread.
fn run_hook_message_loop() {
    // SAFETY: GetCurrentThreadId has no preconditions.
    HOOK_THREAD_ID.store(unsafe { GetCurrentThreadId() }, Ordering::SeqCst);

    // SAFETY: SetWindowsHookExW requires the calling thread to pump messages,
    // which the loop below does.
    let keyboard_hook =
        match unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), None, 0) } {
            Ok(hook) => hook,
            Err(e) => {
                error!(error = %e, "WH_KEYBOARD_LL hook installation failed");
                return;
            }
        };

    // SAFETY: Out-of-context WinEvent hooks are delivered through this
    // thread's message loop.
    let foreground_hook: HWINEVENTHOOK = unsafe {
        SetWinEventHook(
            EVENT_SYSTEM_FOREGROUND,
            EVENT_SYSTEM_FOREGROUND,
            None,
            Some(foreground_event_proc),
            0,
            0,
            WINEVENT_OUTOFCONTEXT,
        )
    };
    if foreground_hook.is_invalid() {
        error!("foreground WinEvent hook installation failed; per-application mode will not track focus");
    }

    debug!("input hooks installed");

    let mut msg = MSG::default();
    // SAFETY: Standard Win32 GetMessage/DispatchMessage loop pattern.
    unsafe {
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            DispatchMessageW(&msg);
        }
        let _ = UnhookWindowsHookEx(keyboard_hook);
        if !foreground_hook.is_invalid() {
            let _ = UnhookWinEvent(foreground_hook);
        }
    }
    HOOK_THREAD_ID.store(0, Ordering::SeqCst);
    debug!("input hooks removed");
}

fn send(event: RawInputEvent) {
    if let Some(sender) = EVENT_SENDER.get() {
        // Ignore send errors (channel closed during shutdown).
        let _ = sender.send(event);
    }
}

/// Low-level keyboard hook callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread. It must return
/// quickly (< ~300ms) to avoid hook removal by the OS.
unsafe extern "system" fn keyboard_hook_proc(
    n_code: i32,
    w_param: WPARAM,
    l_param: LPARAM,
) -> LRESULT {
    if n_code == HC_ACTION as i32 {
        // SAFETY: l_param points to a KBDLLHOOKSTRUCT when n_code == HC_ACTION.
        let kbs = &*(l_param.0 as *const KBDLLHOOKSTRUCT);

        let vk_code = kbs.vkCode as u8;
        let scan_code = kbs.scanCode as u16;
        let time_ms = kbs.time;
        let is_extended = (kbs.flags & LLKHF_EXTENDED) != KBDLLHOOKSTRUCT_FLAGS(0);

        match w_param.0 as u32 {
            WM_KEYDOWN | WM_SYSKEYDOWN => send(RawInputEvent::KeyDown {
                vk_code,
                scan_code,
                time_ms,
                is_extended,
            }),
            WM_KEYUP | WM_SYSKEYUP => send(RawInputEvent::KeyUp {
                vk_code,
                scan_code,
                time_ms,
                is_extended,
            }),
            _ => {}
        }
    }

    // SAFETY: Forward the event to the next hook in the chain.
    CallNextHookEx(None, n_code, w_param, l_param)
}

/// Foreground-window WinEvent callback.
///
/// # Safety
///
/// Called by Windows from the hook message loop thread.
unsafe extern "system" fn foreground_event_proc(
    _hook: HWINEVENTHOOK,
    _event: u32,
    hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _event_thread: u32,
    _event_time_ms: u32,
) {
    if let Some(app_id) = executable_name(hwnd) {
        send(RawInputEvent::ForegroundChanged { app_id });
    }
}

/// File name of the executable that owns `hwnd`.
fn executable_name(hwnd: HWND) -> Option<String> {
    let mut pid = 0u32;
    // SAFETY: `pid` outlives the call; an invalid hwnd yields pid 0.
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    if pid == 0 {
        return None;
    }

    // SAFETY: Limited-information access is enough for the image name.
    let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }.ok()?;

    let mut buffer = [0u16; 1024];
    let mut len = buffer.len() as u32;
    // SAFETY: `buffer` and `len` describe a writable UTF-16 buffer of `len` units.
    let queried = unsafe {
        QueryFullProcessImageNameW(
            process,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut len,
        )
    };
    // SAFETY: `process` was opened above and is closed exactly once.
    unsafe {
        let _ = CloseHandle(process);
    }
    queried.ok()?;

    let path = String::from_utf16_lossy(&buffer[..len as usize]);
    path.rsplit('\\').next().map(str::to_string)
}
