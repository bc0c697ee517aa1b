//! Global low-level keyboard hook feeding every key transition into a channel.

use crate::error::Result;
use crate::keys::KeyEvent;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// Installed global hook. Dropping it removes the hook.
#[derive(Debug)]
pub struct KeyHook {
    events: Option<Receiver<KeyEvent>>,
    #[cfg(target_os = "windows")]
    backend: platform::HookThread,
}

impl KeyHook {
    /// Install the system-wide hook.
    ///
    /// Only one hook may be installed per process. Failure is fatal for global
    /// capture.
    pub fn install() -> Result<Self> {
        #[cfg(target_os = "windows")]
        {
            let (backend, events) = platform::HookThread::spawn()?;
            tracing::info!("global keyboard hook installed");
            Ok(Self {
                events: Some(events),
                backend,
            })
        }
        #[cfg(not(target_os = "windows"))]
        {
            Err(crate::error::CaseError::HookInstallFailed(
                "global key capture is only supported on Windows".into(),
            ))
        }
    }

    /// Take the event stream. Returns `None` after the first call.
    pub fn events(&mut self) -> Option<Receiver<KeyEvent>> {
        self.events.take()
    }
}

impl Drop for KeyHook {
    fn drop(&mut self) {
        #[cfg(target_os = "windows")]
        self.backend.stop();
        tracing::debug!("global keyboard hook removed");
    }
}

/// Readiness channel between the hook thread and the installer.
///
/// It has zero capacity, so a report only succeeds while the installer is
/// still waiting in `recv_timeout`. Once the installer gives up, the thread's
/// report fails and the thread must undo its own setup.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn ready_channel<T>() -> (SyncSender<T>, Receiver<T>) {
    sync_channel(0)
}

#[cfg(target_os = "windows")]
mod platform {
    use crate::error::{CaseError, Result};
    use crate::keys::{KeyEvent, KeyId, Transition};
    use once_cell::sync::Lazy;
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::sync::Mutex;
    use std::thread::JoinHandle;
    use std::time::{Duration, Instant};

    static KEY_EVENT_SENDER: Lazy<Mutex<Option<Sender<KeyEvent>>>> =
        Lazy::new(|| Mutex::new(None));

    const READY_TIMEOUT: Duration = Duration::from_secs(2);
    const LLKHF_INJECTED: u32 = 0x10;

    #[derive(Debug)]
    pub struct HookThread {
        thread_id: u32,
        join: Option<JoinHandle<()>>,
    }

    impl HookThread {
        pub fn spawn() -> Result<(Self, Receiver<KeyEvent>)> {
            let (event_tx, event_rx) = channel::<KeyEvent>();
            {
                let mut guard = KEY_EVENT_SENDER
                    .lock()
                    .map_err(|_| CaseError::HookInstallFailed("sender lock poisoned".into()))?;
                if guard.is_some() {
                    return Err(CaseError::HookInstallFailed(
                        "a keyboard hook is already installed".into(),
                    ));
                }
                *guard = Some(event_tx);
            }

            match Self::spawn_thread() {
                Ok(thread) => Ok((thread, event_rx)),
                Err(err) => {
                    if let Ok(mut guard) = KEY_EVENT_SENDER.lock() {
                        *guard = None;
                    }
                    Err(err)
                }
            }
        }

        fn spawn_thread() -> Result<Self> {
            use windows::Win32::System::LibraryLoader::GetModuleHandleW;
            use windows::Win32::System::Threading::GetCurrentThreadId;
            use windows::Win32::UI::WindowsAndMessaging::{
                DispatchMessageW, GetMessageW, PeekMessageW, SetWindowsHookExW, TranslateMessage,
                UnhookWindowsHookEx, MSG, PM_NOREMOVE, WH_KEYBOARD_LL,
            };

            let (ready_tx, ready_rx) =
                super::ready_channel::<std::result::Result<u32, String>>();

            let join = std::thread::Builder::new()
                .name("casecon-key-hook".into())
                .spawn(move || {
                    let mut msg = MSG::default();
                    // Create the thread's message queue before reporting ready.
                    unsafe {
                        let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                    }

                    let thread_id = unsafe { GetCurrentThreadId() };
                    let hmodule = match unsafe { GetModuleHandleW(None) } {
                        Ok(h) => h,
                        Err(err) => {
                            let _ = ready_tx.send(Err(err.to_string()));
                            return;
                        }
                    };

                    let hook = match unsafe {
                        SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), hmodule, 0)
                    } {
                        Ok(h) if !h.0.is_null() => h,
                        Ok(_) => {
                            let _ = ready_tx.send(Err(windows::core::Error::from_win32().to_string()));
                            return;
                        }
                        Err(err) => {
                            let _ = ready_tx.send(Err(err.to_string()));
                            return;
                        }
                    };

                    if ready_tx.send(Ok(thread_id)).is_err() {
                        // The installer timed out and reported failure.
                        unsafe {
                            let _ = UnhookWindowsHookEx(hook);
                        }
                        return;
                    }

                    loop {
                        let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                        if r.0 <= 0 {
                            break;
                        }
                        unsafe {
                            let _ = TranslateMessage(&msg);
                            DispatchMessageW(&msg);
                        }
                    }

                    unsafe {
                        let _ = UnhookWindowsHookEx(hook);
                    }
                })
                .map_err(|e| CaseError::HookInstallFailed(e.to_string()))?;

            let thread_id = ready_rx
                .recv_timeout(READY_TIMEOUT)
                .map_err(|_| {
                    CaseError::HookInstallFailed("hook thread did not signal readiness".into())
                })?
                .map_err(CaseError::HookInstallFailed)?;

            Ok(Self {
                thread_id,
                join: Some(join),
            })
        }

        pub fn stop(&mut self) {
            if let Ok(mut guard) = KEY_EVENT_SENDER.lock() {
                *guard = None;
            }
            if let Some(join) = self.join.take() {
                use windows::Win32::Foundation::{LPARAM, WPARAM};
                use windows::Win32::UI::WindowsAndMessaging::{PostThreadMessageW, WM_QUIT};
                unsafe {
                    let _ = PostThreadMessageW(self.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
                }
                let _ = join.join();
            }
        }
    }

    // Runs on the hook thread for every key transition system-wide. It only
    // forwards the event; the OS drops hooks that take too long.
    unsafe extern "system" fn keyboard_hook_proc(
        n_code: i32,
        w_param: windows::Win32::Foundation::WPARAM,
        l_param: windows::Win32::Foundation::LPARAM,
    ) -> windows::Win32::Foundation::LRESULT {
        use windows::Win32::UI::WindowsAndMessaging::{
            CallNextHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, WM_KEYDOWN, WM_KEYUP,
            WM_SYSKEYDOWN, WM_SYSKEYUP,
        };

        if n_code == HC_ACTION as i32 {
            let msg = w_param.0 as u32;
            let transition = match msg {
                WM_KEYDOWN | WM_SYSKEYDOWN => Some(Transition::Down),
                WM_KEYUP | WM_SYSKEYUP => Some(Transition::Up),
                _ => None,
            };
            if let Some(transition) = transition {
                let info = unsafe { &*(l_param.0 as *const KBDLLHOOKSTRUCT) };
                let injected = info.flags.0 & LLKHF_INJECTED != 0;
                if !injected {
                    let event = KeyEvent {
                        key: KeyId(info.vkCode).normalized(),
                        transition,
                        at: Instant::now(),
                    };
                    if let Ok(guard) = KEY_EVENT_SENDER.lock() {
                        if let Some(sender) = guard.as_ref() {
                            let _ = sender.send(event);
                        }
                    }
                }
            }
        }

        CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param)
    }
}
