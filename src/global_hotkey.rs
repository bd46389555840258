use crate::command::Command;
use crate::error::HotkeyRegistrationError;
use crate::hotkey::{HotkeyId, HotkeyTable, KeyCombo};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// OS-level global hotkey API.
pub trait HotkeyBackend {
    fn register(&mut self, id: HotkeyId, combo: KeyCombo) -> Result<(), HotkeyRegistrationError>;
    fn unregister(&mut self, id: HotkeyId, combo: KeyCombo)
        -> Result<(), HotkeyRegistrationError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub registered: Vec<KeyCombo>,
    pub failed: Vec<HotkeyRegistrationError>,
}

impl RegistrationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Owns the registration table and maps fired hotkey ids back to commands.
pub struct HotkeyDispatcher<B: HotkeyBackend> {
    backend: B,
    table: HotkeyTable,
    registered: BTreeMap<HotkeyId, KeyCombo>,
}

impl<B: HotkeyBackend> HotkeyDispatcher<B> {
    pub fn new(backend: B, table: HotkeyTable) -> Self {
        Self {
            backend,
            table,
            registered: BTreeMap::new(),
        }
    }

    pub fn table(&self) -> &HotkeyTable {
        &self.table
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Releases anything held, then registers every binding in table order.
    /// A binding the OS refuses is logged and skipped.
    pub fn register_all(&mut self) -> RegistrationReport {
        self.unregister_all();

        let mut report = RegistrationReport::default();
        for (id, binding) in self.table.iter() {
            match self.backend.register(id, binding.combo) {
                Ok(()) => {
                    debug!(id, combo = %binding.combo, "registered global hotkey");
                    self.registered.insert(id, binding.combo);
                    report.registered.push(binding.combo);
                }
                Err(err) => {
                    warn!(id, combo = %binding.combo, %err, "global hotkey unavailable for this run");
                    report.failed.push(err);
                }
            }
        }

        info!(
            registered = report.registered.len(),
            failed = report.failed.len(),
            "global hotkeys registered"
        );
        report
    }

    /// Releases every hotkey this process holds. Safe to call repeatedly.
    pub fn unregister_all(&mut self) -> usize {
        let held = std::mem::take(&mut self.registered);
        let released = held.len();
        for (id, combo) in held {
            if let Err(err) = self.backend.unregister(id, combo) {
                warn!(id, combo = %combo, %err, "failed to release global hotkey");
            }
        }
        if released > 0 {
            debug!(released, "global hotkeys released");
        }
        released
    }

    pub fn is_registered(&self, combo: KeyCombo) -> bool {
        self.registered.values().any(|held| *held == combo)
    }

    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }

    /// Command for a fired hotkey id. Ids this dispatcher does not hold resolve to nothing.
    pub fn resolve(&self, id: HotkeyId) -> Option<Command> {
        if !self.registered.contains_key(&id) {
            debug!(id, "ignoring unknown hotkey id");
            return None;
        }
        self.table.get(id).map(|binding| binding.command)
    }
}

impl<B: HotkeyBackend> Drop for HotkeyDispatcher<B> {
    fn drop(&mut self) {
        self.unregister_all();
    }
}

#[cfg(windows)]
mod platform {
    use super::HotkeyBackend;
    use crate::error::HotkeyRegistrationError;
    use crate::hotkey::{HotkeyId, KeyCombo};
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_ALT, MOD_CONTROL, MOD_NOREPEAT,
        MOD_SHIFT, MOD_WIN,
    };

    /// `RegisterHotKey` against the calling thread's message queue; fired
    /// hotkeys arrive as `WM_HOTKEY` with the id in `wParam`.
    #[derive(Debug, Default)]
    pub struct NativeHotkeys;

    fn modifier_flags(combo: KeyCombo) -> HOT_KEY_MODIFIERS {
        let mut flags = MOD_NOREPEAT.0;
        if combo.modifiers.ctrl {
            flags |= MOD_CONTROL.0;
        }
        if combo.modifiers.shift {
            flags |= MOD_SHIFT.0;
        }
        if combo.modifiers.alt {
            flags |= MOD_ALT.0;
        }
        if combo.modifiers.win {
            flags |= MOD_WIN.0;
        }
        HOT_KEY_MODIFIERS(flags)
    }

    impl HotkeyBackend for NativeHotkeys {
        fn register(
            &mut self,
            id: HotkeyId,
            combo: KeyCombo,
        ) -> Result<(), HotkeyRegistrationError> {
            let vk = combo
                .key
                .virtual_key()
                .ok_or(HotkeyRegistrationError::UnsupportedKey { combo })?;
            unsafe { RegisterHotKey(HWND::default(), id, modifier_flags(combo), vk) }.map_err(
                |err| HotkeyRegistrationError::AlreadyClaimed {
                    combo,
                    reason: err.to_string(),
                },
            )
        }

        fn unregister(
            &mut self,
            id: HotkeyId,
            combo: KeyCombo,
        ) -> Result<(), HotkeyRegistrationError> {
            unsafe { UnregisterHotKey(HWND::default(), id) }.map_err(|err| {
                HotkeyRegistrationError::Unregister {
                    combo,
                    reason: err.to_string(),
                }
            })
        }
    }
}

#[cfg(windows)]
pub use platform::NativeHotkeys;

#[cfg(not(windows))]
#[derive(Debug, Default)]
pub struct NativeHotkeys;

#[cfg(not(windows))]
impl HotkeyBackend for NativeHotkeys {
    fn register(&mut self, _id: HotkeyId, _combo: KeyCombo) -> Result<(), HotkeyRegistrationError> {
        Err(HotkeyRegistrationError::PlatformUnsupported)
    }

    fn unregister(
        &mut self,
        _id: HotkeyId,
        _combo: KeyCombo,
    ) -> Result<(), HotkeyRegistrationError> {
        Ok(())
    }
}
