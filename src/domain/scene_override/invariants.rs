use super::entity::SetOverrideRequest;
use crate::domain::numbering::ShowIdentity;
use crate::domain::{DomainError, DomainResult};

/// Validates an override write before it reaches storage
pub fn validate_override_request(
    show: &ShowIdentity,
    request: &SetOverrideRequest,
) -> DomainResult<()> {
    if !show.is_complete() {
        return Err(DomainError::InvalidKey(format!(
            "show id missing for provider {}",
            show.provider
        )));
    }

    match request {
        SetOverrideRequest::Episode { native, scene } => {
            if !native.is_complete() {
                return Err(DomainError::InvalidKey(format!(
                    "native episode number missing in {}",
                    native
                )));
            }
            if let Some(scene) = scene {
                if !scene.is_complete() {
                    return Err(DomainError::InvariantViolation(format!(
                        "scene episode {} uses the unset sentinel; pass no scene value to clear",
                        scene
                    )));
                }
            }
        }
        SetOverrideRequest::Absolute {
            absolute_number,
            scene_absolute,
        } => {
            if *absolute_number == 0 {
                return Err(DomainError::InvalidKey(
                    "native absolute number missing".to_string(),
                ));
            }
            if *scene_absolute == Some(0) {
                return Err(DomainError::InvariantViolation(
                    "scene absolute 0 is the unset sentinel; pass no scene value to clear"
                        .to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Override invariants:
///
/// 1. At most one episode-keyed record per (show, season, episode)
/// 2. At most one absolute-keyed record per (show, absolute number)
/// 3. Episode-keyed and absolute-keyed records never share a row
/// 4. A mapped scene value is never zero

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::numbering::{ProviderKind, SeasonEpisode};

    fn show() -> ShowIdentity {
        ShowIdentity::new(ProviderKind::TVDB, 79824)
    }

    #[test]
    fn test_valid_requests() {
        let set = SetOverrideRequest::episode(SeasonEpisode::new(1, 2), Some(SeasonEpisode::new(2, 1)));
        assert!(validate_override_request(&show(), &set).is_ok());

        let clear = SetOverrideRequest::episode(SeasonEpisode::new(1, 2), None);
        assert!(validate_override_request(&show(), &clear).is_ok());

        let specials = SetOverrideRequest::episode(SeasonEpisode::new(3, 1), Some(SeasonEpisode::new(0, 4)));
        assert!(validate_override_request(&show(), &specials).is_ok());

        let absolute = SetOverrideRequest::absolute(30, Some(28));
        assert!(validate_override_request(&show(), &absolute).is_ok());
    }

    #[test]
    fn test_missing_show_id_fails() {
        let incomplete = ShowIdentity::new(ProviderKind::TVDB, 0);
        let request = SetOverrideRequest::absolute(1, Some(1));
        assert!(matches!(
            validate_override_request(&incomplete, &request),
            Err(DomainError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_sentinel_scene_values_fail() {
        let request = SetOverrideRequest::episode(SeasonEpisode::new(1, 1), Some(SeasonEpisode::new(1, 0)));
        assert!(validate_override_request(&show(), &request).is_err());

        let request = SetOverrideRequest::absolute(5, Some(0));
        assert!(validate_override_request(&show(), &request).is_err());

        let request = SetOverrideRequest::absolute(0, Some(3));
        assert!(validate_override_request(&show(), &request).is_err());
    }
}
