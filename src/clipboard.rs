//! OS side of the clipboard pipeline: clipboard text access and synthesized
//! copy/paste keystrokes.

use crate::error::{CaseError, Result};
use arboard::Clipboard;

/// Read and write the system clipboard as text.
pub trait ClipboardAccess: Send + Sync {
    /// `None` when the clipboard holds no text.
    fn get_text(&self) -> Result<Option<String>>;
    fn set_text(&self, text: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Synthesize the copy and paste chords in the foreground application.
pub trait KeySynth: Send + Sync {
    fn copy(&self) -> Result<()>;
    fn paste(&self) -> Result<()>;
}

/// The desktop clipboard through `arboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

fn open() -> Result<Clipboard> {
    Clipboard::new().map_err(|e| CaseError::Clipboard(e.to_string()))
}

impl ClipboardAccess for SystemClipboard {
    fn get_text(&self) -> Result<Option<String>> {
        match open()?.get_text() {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(CaseError::Clipboard(e.to_string())),
        }
    }

    fn set_text(&self, text: &str) -> Result<()> {
        open()?
            .set_text(text.to_string())
            .map_err(|e| CaseError::Clipboard(e.to_string()))
    }

    fn clear(&self) -> Result<()> {
        open()?
            .clear()
            .map_err(|e| CaseError::Clipboard(e.to_string()))
    }
}

/// Ctrl+C / Ctrl+V through Win32 `SendInput`.
///
/// The user is usually still holding the shortcut's modifiers when the action
/// fires, so those are lifted first or the target would see Ctrl+Win+Alt+C.
#[derive(Debug, Default, Clone, Copy)]
pub struct SendInputKeys;

impl KeySynth for SendInputKeys {
    fn copy(&self) -> Result<()> {
        #[cfg(target_os = "windows")]
        {
            platform::release_held_modifiers()?;
            platform::send_chord(&[platform::VK_CONTROL, u16::from(b'C')])
        }
        #[cfg(not(target_os = "windows"))]
        {
            Err(CaseError::KeySynth(
                "keystroke synthesis is only supported on Windows".into(),
            ))
        }
    }

    fn paste(&self) -> Result<()> {
        #[cfg(target_os = "windows")]
        {
            platform::release_held_modifiers()?;
            platform::send_chord(&[platform::VK_CONTROL, u16::from(b'V')])
        }
        #[cfg(not(target_os = "windows"))]
        {
            Err(CaseError::KeySynth(
                "keystroke synthesis is only supported on Windows".into(),
            ))
        }
    }
}

#[cfg(target_os = "windows")]
mod platform {
    use crate::error::{CaseError, Result};
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        GetAsyncKeyState, SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT,
        KEYBD_EVENT_FLAGS, KEYEVENTF_KEYUP, VIRTUAL_KEY,
    };

    pub const VK_CONTROL: u16 = 0x11;
    // Unassigned code. Tapping it before lifting Win or Alt keeps the lone
    // release from opening the Start menu or a menu bar.
    const VK_MASK: u16 = 0xE8;
    const SIDED_MODIFIERS: [u16; 8] = [0xA0, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5, 0x5B, 0x5C];

    pub fn release_held_modifiers() -> Result<()> {
        let held: Vec<u16> = SIDED_MODIFIERS
            .into_iter()
            .filter(|vk| unsafe { GetAsyncKeyState(i32::from(*vk)) } < 0)
            .collect();
        if held.is_empty() {
            return Ok(());
        }
        if held.iter().any(|vk| matches!(vk, 0xA4 | 0xA5 | 0x5B | 0x5C)) {
            send_vk(VK_MASK, KEYBD_EVENT_FLAGS(0))?;
            send_vk(VK_MASK, KEYEVENTF_KEYUP)?;
        }
        for vk in held {
            send_vk(vk, KEYEVENTF_KEYUP)?;
        }
        Ok(())
    }

    pub fn send_chord(vks: &[u16]) -> Result<()> {
        // key down in order
        for &vk in vks {
            send_vk(vk, KEYBD_EVENT_FLAGS(0))?;
        }
        // key up in reverse order
        for &vk in vks.iter().rev() {
            send_vk(vk, KEYEVENTF_KEYUP)?;
        }
        Ok(())
    }

    fn send_vk(vk: u16, flags: KEYBD_EVENT_FLAGS) -> Result<()> {
        let input = INPUT {
            r#type: INPUT_KEYBOARD,
            Anonymous: INPUT_0 {
                ki: KEYBDINPUT {
                    wVk: VIRTUAL_KEY(vk),
                    wScan: 0,
                    dwFlags: flags,
                    time: 0,
                    dwExtraInfo: 0,
                },
            },
        };
        let sent = unsafe { SendInput(&[input], std::mem::size_of::<INPUT>() as i32) };
        if sent == 0 {
            return Err(CaseError::KeySynth(format!(
                "SendInput returned 0 for key {vk:#04x}"
            )));
        }
        Ok(())
    }
}
