use crate::error::SessionError;
use crate::types::io::{CreateHelpSessionInput, InstapayReferenceInput, SessionUpdate};
use crate::types::{SessionStatus, SpecialistId};

const REFERENCE_PREFIX: &str = "51";
const REFERENCE_LEN: usize = 12;

/// Creation fields after presence and format checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCreate {
    pub steps: String,
    pub description: String,
    pub image_url: String,
    pub instapay_reference: u64,
    pub specialist: Option<SpecialistId>,
    pub note: String,
}

/// `51` followed by ten digits.
pub fn parse_instapay_reference(input: &InstapayReferenceInput) -> Result<u64, SessionError> {
    let text = match input {
        InstapayReferenceInput::Number(value) => value.to_string(),
        InstapayReferenceInput::Text(value) => value.trim().to_string(),
    };
    let well_formed = text.len() == REFERENCE_LEN
        && text.starts_with(REFERENCE_PREFIX)
        && text.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(SessionError::invalid("invalid instapay reference id"));
    }
    text.parse::<u64>()
        .map_err(|_| SessionError::invalid("invalid instapay reference id"))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

pub fn validate_create(input: CreateHelpSessionInput) -> Result<ValidCreate, SessionError> {
    let (Some(steps), Some(description), Some(image_url), Some(reference)) = (
        required(input.steps),
        required(input.description),
        required(input.image_url),
        input.instapay_reference,
    ) else {
        return Err(SessionError::invalid("all required fields must be filled"));
    };
    let instapay_reference = parse_instapay_reference(&reference)?;
    let specialist = match input.specialist.filter(|value| !value.trim().is_empty()) {
        Some(value) => Some(
            SpecialistId::new(value.trim().to_string())
                .map_err(|err| SessionError::invalid(format!("specialist: {err}")))?,
        ),
        None => None,
    };
    Ok(ValidCreate {
        steps,
        description,
        image_url,
        instapay_reference,
        specialist,
        note: input.note.map(|note| note.trim().to_string()).unwrap_or_default(),
    })
}

pub fn validate_update_status(status: SessionStatus) -> Result<(), SessionError> {
    if SessionStatus::UPDATE_PATH.contains(&status) {
        Ok(())
    } else {
        Err(SessionError::invalid(format!(
            "invalid status update: {status}"
        )))
    }
}

pub fn validate_assignment_status(status: SessionStatus) -> Result<(), SessionError> {
    if SessionStatus::ASSIGNMENT_PATH.contains(&status) {
        Ok(())
    } else {
        Err(SessionError::invalid(
            "invalid status: must be 'accepted' or 'rejected'",
        ))
    }
}

pub fn validate_note_text(text: Option<&str>) -> Result<String, SessionError> {
    match text.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => Ok(trimmed.to_string()),
        _ => Err(SessionError::invalid("note content is required")),
    }
}

pub fn validate_updates(updates: &[SessionUpdate]) -> Result<(), SessionError> {
    if updates.is_empty() {
        return Err(SessionError::invalid("no updates supplied"));
    }
    for update in updates {
        match update {
            SessionUpdate::SetStatus { status } => validate_update_status(*status)?,
            SessionUpdate::AppendNote { text } => {
                validate_note_text(Some(text))?;
            }
            SessionUpdate::SetDescription { description } => {
                if description.trim().is_empty() {
                    return Err(SessionError::invalid("description must not be blank"));
                }
            }
            SessionUpdate::SetEndTime { .. }
            | SessionUpdate::SetDuration { .. }
            | SessionUpdate::SetType { .. } => {}
        }
    }
    Ok(())
}

/// `None` and `"all"` mean no status restriction.
pub fn parse_status_filter(value: Option<&str>) -> Result<Option<SessionStatus>, SessionError> {
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(SessionError::invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_input() -> CreateHelpSessionInput {
        CreateHelpSessionInput {
            steps: Some("restart, reinstall driver".to_string()),
            description: Some("no wifi".to_string()),
            image_url: Some("https://img.example/1.png".to_string()),
            instapay_reference: Some(InstapayReferenceInput::Number(510000000001)),
            specialist: None,
            note: None,
        }
    }

    #[test]
    fn reference_format() {
        let ok = |s: &str| parse_instapay_reference(&InstapayReferenceInput::Text(s.into()));
        assert_eq!(ok("510000000001").unwrap(), 510000000001);
        assert_eq!(ok(" 519999999999 ").unwrap(), 519999999999);
        assert!(ok("520000000001").is_err());
        assert!(ok("51000000001").is_err());
        assert!(ok("5100000000011").is_err());
        assert!(ok("51000000000a").is_err());
        assert!(parse_instapay_reference(&InstapayReferenceInput::Number(41)).is_err());
    }

    #[test]
    fn missing_or_blank_required_fields_are_rejected() {
        let mut input = full_input();
        input.steps = Some("   ".to_string());
        let err = validate_create(input).unwrap_err();
        assert!(matches!(err, SessionError::InvalidInput { .. }));

        let mut input = full_input();
        input.instapay_reference = None;
        assert!(validate_create(input).is_err());
    }

    #[test]
    fn valid_create_keeps_fields() {
        let mut input = full_input();
        input.note = Some("  call after 5pm ".to_string());
        let valid = validate_create(input).unwrap();
        assert_eq!(valid.instapay_reference, 510000000001);
        assert_eq!(valid.note, "call after 5pm");
        assert!(valid.specialist.is_none());
    }

    #[test]
    fn malformed_specialist_id_is_invalid_input() {
        let mut input = full_input();
        input.specialist = Some("64b7f0c2e4".to_string());
        assert!(matches!(
            validate_create(input).unwrap_err(),
            SessionError::InvalidInput { .. }
        ));
    }

    #[test]
    fn status_vocabularies_are_disjoint_per_path() {
        assert!(validate_update_status(SessionStatus::Active).is_ok());
        assert!(validate_update_status(SessionStatus::Accepted).is_err());
        assert!(validate_assignment_status(SessionStatus::Rejected).is_ok());
        assert!(validate_assignment_status(SessionStatus::Completed).is_err());
    }

    #[test]
    fn updates_need_at_least_one_valid_intent() {
        assert!(validate_updates(&[]).is_err());
        assert!(validate_updates(&[SessionUpdate::AppendNote {
            text: "  ".to_string()
        }])
        .is_err());
        assert!(validate_updates(&[SessionUpdate::SetDuration { seconds: 900 }]).is_ok());
    }

    #[test]
    fn status_filter_parsing() {
        assert_eq!(parse_status_filter(None).unwrap(), None);
        assert_eq!(parse_status_filter(Some("all")).unwrap(), None);
        assert_eq!(
            parse_status_filter(Some("accepted")).unwrap(),
            Some(SessionStatus::Accepted)
        );
        assert!(parse_status_filter(Some("done")).is_err());
    }
}
