//! Session data model and name matching.

/// Name under which the OS notification-sound session is listed and
/// matched, mirroring how the mixer itself labels it.
pub const SYSTEM_SOUNDS_NAME: &str = "System Sounds";

/// Position of a session within one enumeration snapshot.
///
/// Only valid against the backend that produced the snapshot; session
/// identity does not survive re-enumeration, let alone separate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(pub usize);

/// One live audio session as reported by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSession {
    pub id: SessionId,
    /// Process image name, e.g. `Discord.exe`, or [`SYSTEM_SOUNDS_NAME`].
    pub process_name: String,
    /// Normalized volume scalar in [0.0, 1.0].
    pub volume: f32,
    pub muted: bool,
    pub is_system_sounds: bool,
}

/// Find the session whose process name equals `name`, ignoring case and
/// surrounding whitespace.
///
/// Exact match only, no substring or fuzzy matching. When several
/// sessions share a process name, the first one in enumeration order
/// wins; the others are left untouched.
pub fn find<'a>(name: &str, sessions: &'a [AudioSession]) -> Option<&'a AudioSession> {
    let wanted = name.trim().to_lowercase();
    sessions
        .iter()
        .find(|s| s.process_name.to_lowercase() == wanted)
}
