//! Message catalog for validation errors.
//!
//! Templates are keyed by `(locale, rule)` with optional `(locale, field, rule)` overrides.
//! `{name}` placeholders are filled from the `validator::ValidationError` params.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::ValidationError;

use super::field_errors::RuleCode;

/// Supported message locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Th,
    En,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::Th => "th",
            Locale::En => "en",
        }
    }

    /// Match a BCP 47 tag on its primary subtag (`th-TH` => `Th`).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "th" => Some(Locale::Th),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    /// Pick the best supported locale from an `Accept-Language` header value.
    ///
    /// Entries are ranked by their `q` weight; ties keep header order. Entries with `q=0`
    /// are never chosen.
    pub fn negotiate(accept_language: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, usize, Locale)> = accept_language
            .split(',')
            .enumerate()
            .filter_map(|(idx, entry)| {
                let mut parts = entry.split(';');
                let locale = Locale::from_tag(parts.next()?)?;
                let quality = parts
                    .filter_map(|p| p.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (quality > 0.0).then_some((quality, idx, locale))
            })
            .collect();

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.first().map(|(_, _, locale)| *locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s).ok_or_else(|| format!("Unsupported locale '{}'", s))
    }
}

type Template = Cow<'static, str>;

/// Localized message templates for validation rules.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    rules: HashMap<(Locale, RuleCode), Template>,
    fields: HashMap<(Locale, RuleCode), HashMap<&'static str, Template>>,
}

impl MessageCatalog {
    /// An empty catalog. Rendering falls back to the rule identifier.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            fields: HashMap::new(),
        }
    }

    /// Catalog with the built-in Thai and English messages.
    pub fn builtin() -> Self {
        use RuleCode::*;

        Self::empty()
            .with_message(Locale::Th, Required, "กรุณากรอกข้อมูลให้ครบถ้วน")
            .with_message(Locale::Th, InvalidType, "รูปแบบข้อมูลไม่ถูกต้อง")
            .with_message(Locale::Th, TooShort, "ต้องมีความยาวอย่างน้อย {min} ตัวอักษร")
            .with_message(Locale::Th, TooLong, "ต้องมีความยาวไม่เกิน {max} ตัวอักษร")
            .with_message(Locale::Th, TooLarge, "ขนาดไฟล์ต้องไม่เกิน {max_mb} MB")
            .with_message(
                Locale::Th,
                UnsupportedType,
                "รองรับเฉพาะไฟล์ประเภท {accepted} เท่านั้น",
            )
            .with_field_message(Locale::Th, "storeId", Required, "กรุณาระบุร้านค้า")
            .with_field_message(Locale::Th, "storeId", InvalidType, "รหัสร้านค้าต้องเป็นตัวเลข")
            .with_field_message(Locale::Th, "reason", Required, "กรุณาระบุเหตุผลในการรายงาน")
            .with_field_message(Locale::Th, "evidence", Required, "กรุณาแนบไฟล์หลักฐาน")
            .with_message(Locale::En, Required, "This field is required")
            .with_message(Locale::En, InvalidType, "Invalid value type")
            .with_message(Locale::En, TooShort, "Must be at least {min} characters")
            .with_message(Locale::En, TooLong, "Must be at most {max} characters")
            .with_message(Locale::En, TooLarge, "File must not exceed {max_mb} MB")
            .with_message(
                Locale::En,
                UnsupportedType,
                "Accepted file types: {accepted}",
            )
            .with_field_message(Locale::En, "storeId", Required, "Please select a store")
            .with_field_message(Locale::En, "storeId", InvalidType, "Store ID must be a number")
            .with_field_message(
                Locale::En,
                "reason",
                Required,
                "Please describe the reason for this report",
            )
            .with_field_message(
                Locale::En,
                "evidence",
                Required,
                "Please attach an evidence file",
            )
    }

    pub fn with_message(
        mut self,
        locale: Locale,
        code: RuleCode,
        template: impl Into<Template>,
    ) -> Self {
        self.rules.insert((locale, code), template.into());
        self
    }

    pub fn with_field_message(
        mut self,
        locale: Locale,
        field: &'static str,
        code: RuleCode,
        template: impl Into<Template>,
    ) -> Self {
        self.fields
            .entry((locale, code))
            .or_default()
            .insert(field, template.into());
        self
    }

    fn template(&self, locale: Locale, field: &str, code: RuleCode) -> Option<&str> {
        self.fields
            .get(&(locale, code))
            .and_then(|by_field| by_field.get(field))
            .map(|t| t.as_ref())
            .or_else(|| self.rules.get(&(locale, code)).map(|t| t.as_ref()))
    }

    /// Render the message for `error` on `field`.
    ///
    /// Lookup order: field override, rule message, the same two in English, then the bare
    /// error code.
    pub fn render(&self, locale: Locale, field: &str, error: &ValidationError) -> String {
        let template = RuleCode::from_code(&error.code).and_then(|code| {
            self.template(locale, field, code)
                .or_else(|| self.template(Locale::En, field, code))
        });

        let Some(template) = template else {
            return error.code.to_string();
        };

        error
            .params
            .iter()
            .fold(template.to_string(), |message, (name, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                message.replace(&format!("{{{}}}", name), &value)
            })
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(code: RuleCode) -> ValidationError {
        ValidationError::new(code.as_str())
    }

    #[test]
    fn test_builtin_catalog_covers_every_rule() {
        let catalog = MessageCatalog::builtin();
        for locale in [Locale::Th, Locale::En] {
            for code in RuleCode::ALL {
                let message = catalog.render(locale, "anything", &error(code));
                assert_ne!(message, code.as_str(), "missing {:?} message for {}", locale, code);
            }
        }
    }

    #[test]
    fn test_placeholders_are_filled() {
        let catalog = MessageCatalog::builtin();
        let mut too_short = error(RuleCode::TooShort);
        too_short.add_param(Cow::from("min"), &10);
        assert_eq!(
            catalog.render(Locale::En, "reason", &too_short),
            "Must be at least 10 characters"
        );
        assert_eq!(
            catalog.render(Locale::Th, "reason", &too_short),
            "ต้องมีความยาวอย่างน้อย 10 ตัวอักษร"
        );
    }

    #[test]
    fn test_string_params_are_not_quoted() {
        let catalog = MessageCatalog::builtin();
        let mut unsupported = error(RuleCode::UnsupportedType);
        unsupported.add_param(Cow::from("accepted"), &"image/webp");
        assert_eq!(
            catalog.render(Locale::En, "evidence", &unsupported),
            "Accepted file types: image/webp"
        );
        assert_eq!(
            catalog.render(Locale::Th, "evidence", &unsupported),
            "รองรับเฉพาะไฟล์ประเภท image/webp เท่านั้น"
        );
    }

    #[test]
    fn test_field_override_wins() {
        let catalog = MessageCatalog::builtin();
        let required = error(RuleCode::Required);
        assert_eq!(
            catalog.render(Locale::En, "evidence", &required),
            "Please attach an evidence file"
        );
        assert_eq!(
            catalog.render(Locale::En, "other", &required),
            "This field is required"
        );
    }

    #[test]
    fn test_falls_back_to_english_then_code() {
        let catalog = MessageCatalog::empty().with_message(Locale::En, RuleCode::TooLarge, "big");
        assert_eq!(
            catalog.render(Locale::Th, "evidence", &error(RuleCode::TooLarge)),
            "big"
        );
        assert_eq!(
            catalog.render(Locale::Th, "evidence", &error(RuleCode::Required)),
            "required"
        );
        assert_eq!(
            catalog.render(Locale::En, "evidence", &ValidationError::new("length")),
            "length"
        );
    }

    #[test]
    fn test_negotiate_accept_language() {
        assert_eq!(Locale::negotiate("th-TH,th;q=0.9,en;q=0.8"), Some(Locale::Th));
        assert_eq!(Locale::negotiate("fr-FR, en-US;q=0.7, th;q=0.5"), Some(Locale::En));
        assert_eq!(Locale::negotiate("th;q=0.2, en;q=0.9"), Some(Locale::En));
        assert_eq!(Locale::negotiate("en;q=0, th;q=0.1"), Some(Locale::Th));
        assert_eq!(Locale::negotiate("de, fr"), None);
        assert_eq!(Locale::negotiate(""), None);
    }

    #[test]
    fn test_locale_from_str() {
        assert_eq!("TH".parse::<Locale>().unwrap(), Locale::Th);
        assert_eq!("en_GB".parse::<Locale>().unwrap(), Locale::En);
        assert!("jp".parse::<Locale>().is_err());
    }
}
