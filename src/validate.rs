use serde::Serialize;

// One failed field, echoed back to the client in the 400 body
#[derive(Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// Collapse runs of whitespace to single spaces and trim the ends
pub fn normalize_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

// Latin letters, spaces, hyphens and apostrophes; must start with a letter
pub fn valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '-' || c == '\'')
}

pub fn check_name(field: &str, name: &str, errors: &mut Vec<FieldError>) {
    // Length limits count characters, not bytes
    let chars = name.chars().count();
    if chars < 2 {
        errors.push(FieldError::new(
            field,
            "must be at least 2 characters",
        ));
    } else if chars > 50 {
        errors.push(FieldError::new(field, "must not exceed 50 characters"));
    } else if !valid_name(name) {
        errors.push(FieldError::new(
            field,
            "must start with a letter and contain only Latin letters, spaces, hyphens and apostrophes",
        ));
    }
}

// Loose shape check, the CRM does its own verification downstream
pub fn valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().count() > 100 {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}

pub fn check_email(field: &str, email: &str, errors: &mut Vec<FieldError>) {
    if !valid_email(email) {
        errors.push(FieldError::new(field, "invalid email address"));
    }
}

// Optional + prefix, then 10-20 digits (spaces allowed in the raw input)
pub fn valid_phone(phone: &str) -> bool {
    let rest = phone.strip_prefix('+').unwrap_or(phone);
    let body_len = rest.chars().count();
    (10..=20).contains(&body_len) && rest.chars().all(|c| c.is_ascii_digit() || c == ' ')
}

// Phones are forwarded without the grouping spaces
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn check_phone(field: &str, phone: &str, errors: &mut Vec<FieldError>) {
    if !valid_phone(phone) {
        errors.push(FieldError::new(
            field,
            "must contain 10-20 digits with optional + prefix",
        ));
    }
}

pub fn check_max_len(field: &str, value: &str, max: usize, errors: &mut Vec<FieldError>) {
    if value.chars().count() > max {
        errors.push(FieldError::new(
            field,
            format!("must not exceed {max} characters"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rules() {
        assert!(valid_name("Jan"));
        assert!(valid_name("Anne-Marie O'Neil"));
        assert!(!valid_name("1Jan"));
        assert!(!valid_name("-Jan"));
        assert!(!valid_name("Józef")); // non-Latin letter
        assert!(!valid_name("Jan_Kowalski"));
    }

    #[test]
    fn name_normalization_collapses_whitespace() {
        assert_eq!(normalize_name("  Jan   Maria  Kowalski "), "Jan Maria Kowalski");
    }

    #[test]
    fn email_rules() {
        assert!(valid_email("driver@example.com"));
        assert!(!valid_email("driver@example"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("driver example@mail.com"));
        assert!(!valid_email(&format!("{}@example.com", "a".repeat(100))));
    }

    #[test]
    fn phone_rules() {
        assert!(valid_phone("+48 123 456 789"));
        assert!(valid_phone("0123456789"));
        assert!(!valid_phone("12345"));
        assert!(!valid_phone("+48-123-456-789"));
        assert_eq!(normalize_phone("+48 123 456 789"), "+48123456789");
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        // 300 two-byte characters: 600 bytes but well under the 500 limit
        let polish = "ż".repeat(300);
        let mut errors = Vec::new();
        check_max_len("countries_driven", &polish, 500, &mut errors);
        assert!(errors.is_empty());

        check_max_len("countries_driven", &"ż".repeat(501), 500, &mut errors);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn check_name_reports_the_right_message() {
        let mut errors = Vec::new();
        check_name("first_name", "J", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "first_name");

        errors.clear();
        check_name("first_name", "Jan", &mut errors);
        assert!(errors.is_empty());
    }
}
