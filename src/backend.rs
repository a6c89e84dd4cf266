//! Capability seam over the OS audio-session API.

use crate::{
    error::Result,
    session::{AudioSession, SessionId},
};

/// The narrow surface this tool needs from the platform mixer:
/// enumerate sessions, and read/write volume and mute per session.
///
/// One implementation binds the live OS audio subsystem; tests inject
/// an in-memory fake. Session ids address the snapshot most recently
/// returned by [`AudioBackend::sessions`].
pub trait AudioBackend {
    /// Fresh snapshot of every active session, system sounds included.
    /// Never cached; callers re-enumerate on every invocation.
    fn sessions(&mut self) -> Result<Vec<AudioSession>>;

    fn volume(&mut self, id: SessionId) -> Result<f32>;

    fn set_volume(&mut self, id: SessionId, level: f32) -> Result<()>;

    fn muted(&mut self, id: SessionId) -> Result<bool>;

    fn set_mute(&mut self, id: SessionId, muted: bool) -> Result<()>;
}

/// Open a handle to the platform audio subsystem.
///
/// The handle owns whatever OS state it acquires and releases it on
/// drop; each invocation of the tool opens its own.
pub fn system_backend() -> Result<Box<dyn AudioBackend>> {
    #[cfg(windows)]
    {
        Ok(Box::new(crate::wasapi::WasapiBackend::open()?))
    }
    #[cfg(not(windows))]
    {
        Err(crate::error::Error::BackendUnavailable(
            "no audio session backend for this platform".to_string(),
        ))
    }
}
