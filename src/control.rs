//! Volume control operations against a backend.

use tracing::debug;

use crate::{
    backend::AudioBackend,
    error::{Error, Result},
    session::{AudioSession, SessionId},
};

/// Parse a user-supplied volume into the normalized scalar.
///
/// A value in [0.0, 1.0] is the scalar itself; a value in (1.0, 100.0]
/// is a percentage and is divided by 100. Anything else, including
/// negative numbers and non-numeric input, is rejected. Note the
/// consequence at the boundary: `1` is full volume, 1% is `0.01`.
pub fn normalize_volume(raw: &str) -> Result<f32> {
    let invalid = || Error::InvalidVolume(raw.trim().to_string());
    let value: f64 = raw.trim().parse().map_err(|_| invalid())?;
    if (0.0..=1.0).contains(&value) {
        Ok(value as f32)
    } else if value > 1.0 && value <= 100.0 {
        Ok((value / 100.0) as f32)
    } else {
        Err(invalid())
    }
}

/// Fresh snapshot of all active sessions.
///
/// Volumes are clamped into [0.0, 1.0] so downstream rendering and
/// arithmetic can rely on the invariant regardless of what the backend
/// reported.
pub fn list_sessions(backend: &mut dyn AudioBackend) -> Result<Vec<AudioSession>> {
    let mut sessions = backend.sessions()?;
    for s in &mut sessions {
        s.volume = s.volume.clamp(0.0, 1.0);
    }
    debug!(count = sessions.len(), "enumerated audio sessions");
    Ok(sessions)
}

/// Read the session's current volume scalar.
pub fn volume(backend: &mut dyn AudioBackend, id: SessionId) -> Result<f32> {
    Ok(backend.volume(id)?.clamp(0.0, 1.0))
}

/// Normalize `raw` and apply it to the session. Returns the scalar that
/// was applied.
pub fn set_volume(backend: &mut dyn AudioBackend, session: &AudioSession, raw: &str) -> Result<f32> {
    let level = normalize_volume(raw)?;
    backend.set_volume(session.id, level)?;
    debug!(name = %session.process_name, level, "volume set");
    Ok(level)
}

/// Flip the session's mute state exactly once. Returns the new state.
pub fn toggle_mute(backend: &mut dyn AudioBackend, session: &AudioSession) -> Result<bool> {
    let next = !backend.muted(session.id)?;
    backend.set_mute(session.id, next)?;
    debug!(name = %session.process_name, muted = next, "mute toggled");
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::fake::FakeBackend, session::find};

    #[test]
    fn normalize_percentages() {
        assert_eq!(normalize_volume("50").unwrap(), 0.5);
        assert_eq!(normalize_volume("100").unwrap(), 1.0);
        assert_eq!(normalize_volume("75").unwrap(), 0.75);
        assert_eq!(normalize_volume(" 25 ").unwrap(), 0.25);
    }

    #[test]
    fn normalize_scalars() {
        assert_eq!(normalize_volume("0").unwrap(), 0.0);
        assert_eq!(normalize_volume("0.5").unwrap(), 0.5);
        assert_eq!(normalize_volume("1").unwrap(), 1.0);
        assert_eq!(normalize_volume("1.0").unwrap(), 1.0);
        assert_eq!(normalize_volume("0.75").unwrap(), 0.75);
    }

    #[test]
    fn normalize_rejects_out_of_range() {
        assert!(normalize_volume("150").is_err());
        assert!(normalize_volume("100.5").is_err());
        assert!(normalize_volume("-5").is_err());
        assert!(normalize_volume("-0.2").is_err());
    }

    #[test]
    fn normalize_rejects_non_numeric() {
        assert!(normalize_volume("abc").is_err());
        assert!(normalize_volume("").is_err());
        assert!(normalize_volume("  ").is_err());
        assert!(normalize_volume("NaN").is_err());
        assert!(normalize_volume("inf").is_err());
    }

    #[test]
    fn percentage_and_scalar_inputs_agree() {
        assert_eq!(
            normalize_volume("50").unwrap(),
            normalize_volume("0.5").unwrap()
        );
    }

    #[test]
    fn enumeration_clamps_reported_volumes() {
        let mut backend = FakeBackend::new(&[("Spotify.exe", -15.0, false), ("Discord.exe", 256.7, false)]);
        let sessions = list_sessions(&mut backend).unwrap();
        for s in &sessions {
            assert!((0.0..=1.0).contains(&s.volume), "{} out of range", s.volume);
        }
        assert_eq!(sessions[0].volume, 0.0);
        assert_eq!(sessions[1].volume, 1.0);
    }

    #[test]
    fn set_volume_round_trips() {
        let mut backend = FakeBackend::new(&[("Discord.exe", 0.8, false)]);
        let sessions = list_sessions(&mut backend).unwrap();
        let session = find("discord.exe", &sessions).unwrap();

        let applied = set_volume(&mut backend, session, "40").unwrap();
        assert_eq!(applied, 0.4);
        assert_eq!(volume(&mut backend, session.id).unwrap(), 0.4);
    }

    #[test]
    fn set_volume_is_idempotent() {
        let mut backend = FakeBackend::new(&[("Discord.exe", 0.8, false)]);
        let sessions = list_sessions(&mut backend).unwrap();
        let session = find("discord.exe", &sessions).unwrap();

        set_volume(&mut backend, session, "30").unwrap();
        let once = backend.volume_of("Discord.exe");
        set_volume(&mut backend, session, "30").unwrap();
        assert_eq!(once, backend.volume_of("Discord.exe"));
    }

    #[test]
    fn set_volume_rejects_invalid_without_mutating() {
        let mut backend = FakeBackend::new(&[("Discord.exe", 0.8, false)]);
        let sessions = list_sessions(&mut backend).unwrap();
        let session = find("Discord.exe", &sessions).unwrap();

        assert!(matches!(
            set_volume(&mut backend, session, "150"),
            Err(Error::InvalidVolume(_))
        ));
        assert_eq!(backend.volume_of("Discord.exe"), 0.8);
    }

    #[test]
    fn duplicates_mutate_only_the_first_session() {
        let mut backend = FakeBackend::new(&[
            ("Discord.exe", 0.75, false),
            ("Discord.exe", 0.75, false),
            ("Steam.exe", 0.99, false),
        ]);
        let sessions = list_sessions(&mut backend).unwrap();
        let session = find("discord.exe", &sessions).unwrap();

        set_volume(&mut backend, session, "10").unwrap();
        assert_eq!(backend.volume_at(0), 0.1);
        assert_eq!(backend.volume_at(1), 0.75);
        assert_eq!(backend.volume_at(2), 0.99);
    }

    #[test]
    fn toggle_flips_and_toggle_twice_restores() {
        let mut backend = FakeBackend::new(&[("Discord.exe", 0.8, false)]);
        let sessions = list_sessions(&mut backend).unwrap();
        let session = find("Discord.exe", &sessions).unwrap();

        assert!(toggle_mute(&mut backend, session).unwrap());
        assert!(backend.muted_of("Discord.exe"));
        assert!(!toggle_mute(&mut backend, session).unwrap());
        assert!(!backend.muted_of("Discord.exe"));
    }

    #[test]
    fn system_sounds_session_is_controllable() {
        let mut backend = FakeBackend::new(&[("Discord.exe", 0.8, false)]).with_system_sounds(0.75, false);
        let sessions = list_sessions(&mut backend).unwrap();
        let session = find("system sounds", &sessions).unwrap();
        assert!(session.is_system_sounds);

        set_volume(&mut backend, session, "0.25").unwrap();
        assert_eq!(backend.volume_of("System Sounds"), 0.25);
    }

    #[test]
    fn unavailable_backend_is_fatal() {
        let mut backend = FakeBackend::unavailable();
        assert!(matches!(
            list_sessions(&mut backend),
            Err(Error::BackendUnavailable(_))
        ));
    }
}
