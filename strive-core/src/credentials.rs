use serde::{Deserialize, Serialize};
use strive_types::{ClientError, PendingCredential, Session};

pub const MIN_PASSWORD_LEN: usize = 6;

/// What a single credential submission resolved to. The caller never decides
/// between login and signup up front; the server's answer does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CredentialOutcome {
    /// Login succeeded; the session is ready to persist.
    Authenticated(Session),
    /// No such account. The same credentials are carried into the
    /// signup-completion step.
    NeedsSignup(PendingCredential),
    /// Any other failure; shown inline at the login step.
    Rejected { message: String },
}

/// Trims both fields. `None` means the submission is a silent no-op.
pub fn normalize_credentials(username: &str, password: &str) -> Option<(String, String)> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return None;
    }
    Some((username.to_string(), password.to_string()))
}

/// Local check run before any network call when changing a password.
pub fn validate_new_password(password: &str) -> Result<(), ClientError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ClientError::validation(
            "Password must be at least 6 characters.",
        ));
    }
    Ok(())
}

/// Maps a login attempt onto its outcome. A 404 is not an error here: it
/// means the account does not exist yet and the flow continues as signup.
pub fn resolve_login(
    credential: PendingCredential,
    result: Result<Session, ClientError>,
) -> CredentialOutcome {
    match result {
        Ok(session) => CredentialOutcome::Authenticated(session),
        Err(err) if err.is_not_found() => CredentialOutcome::NeedsSignup(credential),
        Err(err) => CredentialOutcome::Rejected {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential() -> PendingCredential {
        PendingCredential {
            username: "alice".to_string(),
            password: "hunter42".to_string(),
        }
    }

    #[test]
    fn test_successful_login_is_authenticated() {
        let session = Session::new("tok-1".to_string(), "alice".to_string(), None);
        let outcome = resolve_login(credential(), Ok(session.clone()));
        assert_eq!(outcome, CredentialOutcome::Authenticated(session));
    }

    #[test]
    fn test_unknown_user_continues_as_signup() {
        let err = ClientError::api(404, "User not found. Proceed with signup.");
        let outcome = resolve_login(credential(), Err(err));
        assert_eq!(outcome, CredentialOutcome::NeedsSignup(credential()));
    }

    #[test]
    fn test_wrong_password_is_rejected_with_message() {
        let err = ClientError::api(401, "Incorrect password.");
        let outcome = resolve_login(credential(), Err(err));
        assert_eq!(
            outcome,
            CredentialOutcome::Rejected {
                message: "Incorrect password.".to_string()
            }
        );
    }

    #[test]
    fn test_network_failure_is_rejected_not_signup() {
        let err = ClientError::network("connection refused");
        let outcome = resolve_login(credential(), Err(err));
        assert!(matches!(outcome, CredentialOutcome::Rejected { .. }));
    }

    #[test]
    fn test_normalize_trims_whitespace() {
        let (user, pass) = normalize_credentials("  alice ", " pw123 ").unwrap();
        assert_eq!(user, "alice");
        assert_eq!(pass, "pw123");
    }

    #[test]
    fn test_normalize_rejects_blank_fields() {
        assert!(normalize_credentials("", "pw").is_none());
        assert!(normalize_credentials("alice", "   ").is_none());
        assert!(normalize_credentials("  ", "").is_none());
    }

    #[test]
    fn test_password_length_boundary() {
        assert!(validate_new_password("12345").is_err());
        assert!(validate_new_password("123456").is_ok());
        let err = validate_new_password("abc").unwrap_err();
        assert!(matches!(err, ClientError::Validation { .. }));
    }
}
