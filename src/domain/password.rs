use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use utoipa::ToSchema;

#[derive(Deserialize, Serialize, Debug, ToSchema)]
pub struct Password(String);

impl Password {
    pub fn parse(s: String) -> Result<Password, String> {
        let is_empty_or_whitespace = s.trim().is_empty();
        let is_too_short = s.graphemes(true).count() < 8;

        if is_empty_or_whitespace || is_too_short {
            Err("La contraseña debe tener al menos 8 caracteres.".to_string())
        } else {
            Ok(Self(s))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Password {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::Password;
    use claims::{assert_err, assert_ok};

    #[test]
    fn whitespace_only_is_rejected() {
        assert_err!(Password::parse("        ".to_string()));
    }

    #[test]
    fn seven_graphemes_are_rejected() {
        assert_err!(Password::parse("abcdefg".to_string()));
    }

    #[test]
    fn eight_graphemes_are_accepted() {
        assert_ok!(Password::parse("abcdefgh".to_string()));
    }
}
