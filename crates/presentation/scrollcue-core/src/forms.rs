//! Newsletter form validation. Nothing is sent anywhere; the visitor only
//! gets an alert.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NewsletterConfig;
use crate::error::ValidationError;
use crate::ids::ElementId;
use crate::outputs::Change;

// Unanchored: any `a@b.c` run inside the text passes.
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^@\s]+@[^@\s]+\.[^@\s]+").expect("valid regex"));

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if EMAIL.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail)
    }
}

/// Changes for a submit of `value` typed into `input`.
pub fn submit_newsletter(
    input: ElementId,
    value: &str,
    config: &NewsletterConfig,
) -> (Result<(), ValidationError>, Vec<Change>) {
    let result = validate_email(value);
    let changes = match result {
        Ok(()) => vec![
            Change::RemoveAttribute {
                element: input,
                name: "aria-invalid".into(),
            },
            Change::Alert {
                message: config.success_message.clone(),
            },
        ],
        Err(_) => vec![
            Change::SetAttribute {
                element: input,
                name: "aria-invalid".into(),
                value: "true".into(),
            },
            Change::Alert {
                message: config.invalid_message.clone(),
            },
        ],
    };
    (result, changes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("  contato@oficina.com.br ").is_ok());
    }

    #[test]
    fn rejects_missing_parts() {
        for bad in ["", "ana", "ana@", "ana@example", "@example.com", "a b@c d"] {
            assert_eq!(validate_email(bad), Err(ValidationError::InvalidEmail), "{bad}");
        }
    }

    #[test]
    fn failure_marks_input_invalid() {
        let cfg = NewsletterConfig::default();
        let (res, changes) = submit_newsletter(ElementId(4), "nope", &cfg);
        assert!(res.is_err());
        assert_eq!(
            changes[0],
            Change::SetAttribute {
                element: ElementId(4),
                name: "aria-invalid".into(),
                value: "true".into()
            }
        );
        assert_eq!(
            changes[1],
            Change::Alert {
                message: "Por favor, insira um e-mail válido.".into()
            }
        );
    }

    #[test]
    fn success_clears_invalid_flag() {
        let cfg = NewsletterConfig::default();
        let (res, changes) = submit_newsletter(ElementId(4), "ana@example.com", &cfg);
        assert!(res.is_ok());
        assert!(matches!(changes[0], Change::RemoveAttribute { .. }));
        assert_eq!(
            changes[1],
            Change::Alert {
                message: "Inscrição realizada com sucesso!".into()
            }
        );
    }
}
