//! WASAPI session backend.
//!
//! Binds the default render endpoint's session manager. COM is
//! initialized when the backend is opened and released when it is
//! dropped, so each invocation acquires and releases its own handle.

use std::ptr;

use tracing::debug;
use windows::{
    core::{Interface, PWSTR},
    Win32::{
        Foundation::{CloseHandle, S_OK},
        Media::Audio::{
            eMultimedia, eRender, IAudioSessionControl2, IAudioSessionManager2,
            IMMDeviceEnumerator, ISimpleAudioVolume, MMDeviceEnumerator,
        },
        System::{
            Com::{
                CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL,
                COINIT_MULTITHREADED,
            },
            Threading::{
                OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
                PROCESS_QUERY_LIMITED_INFORMATION,
            },
        },
    },
};

use crate::{
    backend::AudioBackend,
    error::{Error, Result},
    session::{AudioSession, SessionId, SYSTEM_SOUNDS_NAME},
};

/// Balances `CoInitializeEx` with `CoUninitialize`. Declared as the last
/// field of the backend so every COM interface is released first.
struct ComGuard;

impl Drop for ComGuard {
    fn drop(&mut self) {
        unsafe { CoUninitialize() };
    }
}

/// Live handle onto the default render endpoint's session manager.
pub struct WasapiBackend {
    manager: IAudioSessionManager2,
    /// Volume controls for the most recent snapshot, in enumeration
    /// order; [`SessionId`] indexes into this table.
    controls: Vec<ISimpleAudioVolume>,
    _com: ComGuard,
}

impl WasapiBackend {
    /// Connect to the audio subsystem. Fails when there is no default
    /// render endpoint or COM cannot be initialized.
    pub fn open() -> Result<Self> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED)
                .ok()
                .map_err(unavailable)?;
            let com = ComGuard;
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL).map_err(unavailable)?;
            let device = enumerator
                .GetDefaultAudioEndpoint(eRender, eMultimedia)
                .map_err(unavailable)?;
            let manager: IAudioSessionManager2 =
                device.Activate(CLSCTX_ALL, None).map_err(unavailable)?;
            Ok(Self {
                manager,
                controls: Vec::new(),
                _com: com,
            })
        }
    }

    fn control(&self, id: SessionId) -> Result<&ISimpleAudioVolume> {
        self.controls
            .get(id.0)
            .ok_or_else(|| Error::Backend("stale session handle".to_string()))
    }
}

impl AudioBackend for WasapiBackend {
    fn sessions(&mut self) -> Result<Vec<AudioSession>> {
        self.controls.clear();
        let mut sessions = Vec::new();
        unsafe {
            let list = self.manager.GetSessionEnumerator().map_err(backend_err)?;
            let count = list.GetCount().map_err(backend_err)?;
            for i in 0..count {
                let control = list.GetSession(i).map_err(backend_err)?;
                let details: IAudioSessionControl2 = control.cast().map_err(backend_err)?;
                let volume: ISimpleAudioVolume = control.cast().map_err(backend_err)?;

                let is_system_sounds = details.IsSystemSoundsSession() == S_OK;
                let process_name = if is_system_sounds {
                    SYSTEM_SOUNDS_NAME.to_string()
                } else {
                    let pid = details.GetProcessId().map_err(backend_err)?;
                    match process_image_name(pid) {
                        Some(name) => name,
                        None => {
                            debug!(pid, "skipping session with unresolvable process");
                            continue;
                        }
                    }
                };

                let id = SessionId(self.controls.len());
                sessions.push(AudioSession {
                    id,
                    process_name,
                    volume: volume.GetMasterVolume().map_err(backend_err)?,
                    muted: volume.GetMute().map_err(backend_err)?.as_bool(),
                    is_system_sounds,
                });
                self.controls.push(volume);
            }
        }
        Ok(sessions)
    }

    fn volume(&mut self, id: SessionId) -> Result<f32> {
        unsafe { self.control(id)?.GetMasterVolume().map_err(backend_err) }
    }

    fn set_volume(&mut self, id: SessionId, level: f32) -> Result<()> {
        unsafe {
            self.control(id)?
                .SetMasterVolume(level, ptr::null())
                .map_err(backend_err)
        }
    }

    fn muted(&mut self, id: SessionId) -> Result<bool> {
        unsafe { Ok(self.control(id)?.GetMute().map_err(backend_err)?.as_bool()) }
    }

    fn set_mute(&mut self, id: SessionId, muted: bool) -> Result<()> {
        unsafe {
            self.control(id)?
                .SetMute(muted, ptr::null())
                .map_err(backend_err)
        }
    }
}

/// Image name of the process owning a session, e.g. `Discord.exe`.
fn process_image_name(pid: u32) -> Option<String> {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
        let mut buf = [0u16; 1024];
        let mut len = buf.len() as u32;
        let queried = QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buf.as_mut_ptr()),
            &mut len,
        );
        let _ = CloseHandle(handle);
        queried.ok()?;
        let path = String::from_utf16_lossy(&buf[..len as usize]);
        path.rsplit(['\\', '/'])
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

fn unavailable(err: windows::core::Error) -> Error {
    Error::BackendUnavailable(err.to_string())
}

fn backend_err(err: windows::core::Error) -> Error {
    Error::Backend(err.to_string())
}
