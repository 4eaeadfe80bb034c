use serde::Serialize;
use utoipa::ToSchema;

pub const MIN_LENGTH: usize = 8;
const LONG_LENGTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLevel {
    Weak,
    Fair,
    Strong,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PasswordStrength {
    pub score: u8,
    pub level: StrengthLevel,
    pub feedback: Vec<String>,
}

/// Оценка сложности пароля: по баллу за длину >= 8, длину >= 12, строчные,
/// заглавные, цифры и спецсимволы. Пароль короче 8 символов всегда слабый.
pub fn evaluate(password: &str) -> PasswordStrength {
    let length = password.chars().count();
    let mut score = 0u8;
    let mut feedback = Vec::new();

    let mut check = |passed: bool, hint: &str| {
        if passed {
            score += 1;
        } else {
            feedback.push(hint.to_string());
        }
    };

    check(length >= MIN_LENGTH, "Use at least 8 characters");
    check(length >= LONG_LENGTH, "Use 12 or more characters for a stronger password");
    check(
        password.chars().any(|c| c.is_lowercase()),
        "Add a lowercase letter",
    );
    check(
        password.chars().any(|c| c.is_uppercase()),
        "Add an uppercase letter",
    );
    check(
        password.chars().any(|c| c.is_ascii_digit()),
        "Add a number",
    );
    check(
        password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
        "Add a symbol",
    );

    let level = if length < MIN_LENGTH || score < 3 {
        StrengthLevel::Weak
    } else if score < 5 {
        StrengthLevel::Fair
    } else {
        StrengthLevel::Strong
    };

    PasswordStrength {
        score,
        level,
        feedback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_passwords_are_weak() {
        let s = evaluate("Ab1!");
        assert_eq!(s.level, StrengthLevel::Weak);
        assert!(s.feedback.iter().any(|f| f.contains("8 characters")));
    }

    #[test]
    fn mixed_password_is_fair() {
        let s = evaluate("tech1cian");
        assert_eq!(s.score, 3);
        assert_eq!(s.level, StrengthLevel::Fair);
    }

    #[test]
    fn long_mixed_password_is_strong() {
        let s = evaluate("Dispatch-Route-42");
        assert_eq!(s.score, 6);
        assert_eq!(s.level, StrengthLevel::Strong);
        assert!(s.feedback.is_empty());
    }

    #[test]
    fn empty_password_scores_zero() {
        let s = evaluate("");
        assert_eq!(s.score, 0);
        assert_eq!(s.level, StrengthLevel::Weak);
        assert_eq!(s.feedback.len(), 6);
    }
}
