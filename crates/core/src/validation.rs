//! Declarative payload validation.
//!
//! Each entity has a static [`Schema`]: a table of [`FieldSpec`]s, each with
//! its own ordered rule list. The same table validates both creation payloads
//! (required fields must be present) and partial updates (every field optional,
//! but checked when supplied).
//!
//! Validation is pure. It never consults the store, so existence of referenced
//! entities and uniqueness are checked elsewhere.
//!
//! ```
//! use culinary_core::validation::{Mode, USER};
//! use serde_json::json;
//!
//! let payload = json!({ "nombre": "  Ana ", "email": "ANA@example.com" });
//! let normalized = USER.validate(payload.as_object().unwrap(), Mode::Create).unwrap();
//! assert_eq!(normalized["nombre"], "Ana");
//! assert_eq!(normalized["email"], "ana@example.com");
//! ```

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::types::{Difficulty, Email, Unit};

/// Whether a payload creates an entity or partially updates one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Required fields must be present.
    Create,
    /// Every field is optional; supplied fields are still validated.
    Update,
}

/// The JSON shape a field must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A string. Numbers are coerced to their decimal form.
    Text,
    /// A whole number. Numeric strings are coerced.
    Integer,
}

impl Kind {
    /// Whether `rule` can be checked against values of this kind.
    #[must_use]
    pub const fn accepts(self, rule: Rule) -> bool {
        match (self, rule) {
            (Self::Integer, Rule::Range { .. }) => true,
            (Self::Integer, _) | (Self::Text, Rule::Range { .. }) => false,
            (Self::Text, _) => true,
        }
    }
}

/// A single check applied to a field value.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Minimum length in characters (after trimming).
    MinLength(usize),
    /// Must parse as an [`Email`]; the value is normalized to lowercase.
    Email,
    /// Inclusive integer bounds.
    Range {
        min: i64,
        max: Option<i64>,
    },
    /// Case-sensitive membership in a fixed token list.
    OneOf(&'static [&'static str]),
    /// Must be an identifier in the store's format.
    Id,
}

/// Rules for one field of a payload.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Wire name of the field.
    pub field: &'static str,
    /// Expected JSON shape.
    pub kind: Kind,
    /// Must be present (and non-blank) in [`Mode::Create`].
    pub required: bool,
    /// Only accepted in [`Mode::Create`]; updates skip the field entirely.
    pub create_only: bool,
    /// Message reported when a required field is missing or blank.
    pub required_message: &'static str,
    /// Checks run in order; the first failure is reported.
    pub rules: &'static [(Rule, &'static str)],
}

impl FieldSpec {
    const fn text(field: &'static str, required_message: &'static str) -> Self {
        Self {
            field,
            kind: Kind::Text,
            required: true,
            create_only: false,
            required_message,
            rules: &[],
        }
    }

    const fn integer(field: &'static str, required_message: &'static str) -> Self {
        Self {
            kind: Kind::Integer,
            ..Self::text(field, required_message)
        }
    }

    const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    const fn create_only(self) -> Self {
        Self {
            create_only: true,
            ..self
        }
    }

    /// Attach rules. Schemas are statics, so a rule that does not fit the
    /// field's kind fails the build.
    const fn rules(self, rules: &'static [(Rule, &'static str)]) -> Self {
        let mut remaining = rules;
        while let [(rule, _), rest @ ..] = remaining {
            assert!(self.kind.accepts(*rule), "rule does not fit the field kind");
            remaining = rest;
        }
        Self { rules, ..self }
    }
}

/// A rule violation for a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    /// Wire name of the offending field.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
    /// The value as received (`null` when missing).
    pub value: Value,
}

impl FieldViolation {
    /// Create a violation.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

/// A named table of field rules.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Entity name, for logging.
    pub entity: &'static str,
    /// Field rules, in report order.
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Validate a payload, returning it with every known field normalized.
    ///
    /// Unknown fields are passed through untouched. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns every violation found, at most one per field, in schema order.
    pub fn validate(
        &self,
        payload: &Map<String, Value>,
        mode: Mode,
    ) -> Result<Map<String, Value>, Vec<FieldViolation>> {
        let mut normalized = payload.clone();
        let mut violations = Vec::new();

        for spec in self.fields {
            if spec.create_only && mode == Mode::Update {
                continue;
            }

            match payload.get(spec.field) {
                None | Some(Value::Null) => {
                    normalized.remove(spec.field);
                    if spec.required && mode == Mode::Create {
                        violations.push(FieldViolation::new(
                            spec.field,
                            spec.required_message,
                            Value::Null,
                        ));
                    }
                }
                Some(raw) => match check_field(spec, raw) {
                    Ok(value) => {
                        normalized.insert(spec.field.to_owned(), value);
                    }
                    Err(message) => {
                        violations.push(FieldViolation::new(spec.field, message, raw.clone()));
                    }
                },
            }
        }

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(violations)
        }
    }
}

/// Validate one present value, returning its normalized form or a message.
fn check_field(spec: &FieldSpec, raw: &Value) -> Result<Value, String> {
    match spec.kind {
        Kind::Text => {
            let text = match raw {
                Value::String(s) => s.trim().to_owned(),
                Value::Number(n) => n.to_string(),
                _ => return Err(format!("El campo {} debe ser texto", spec.field)),
            };

            // Blank required fields read as missing, even in updates.
            if text.is_empty() && spec.required {
                return Err(spec.required_message.to_owned());
            }

            let mut value = text;
            for (rule, message) in spec.rules {
                value = apply_text_rule(*rule, value).ok_or_else(|| (*message).to_owned())?;
            }
            Ok(Value::String(value))
        }
        Kind::Integer => {
            let first_message = spec
                .rules
                .first()
                .map_or(spec.required_message, |(_, message)| *message);
            let number = as_integer(raw).ok_or_else(|| first_message.to_owned())?;

            for (rule, message) in spec.rules {
                if !integer_rule_holds(*rule, number) {
                    return Err((*message).to_owned());
                }
            }
            Ok(Value::Number(Number::from(number)))
        }
    }
}

fn apply_text_rule(rule: Rule, value: String) -> Option<String> {
    match rule {
        Rule::MinLength(min) => (value.chars().count() >= min).then_some(value),
        Rule::Email => Email::parse(&value).ok().map(Email::into_inner),
        Rule::OneOf(tokens) => tokens.contains(&value.as_str()).then_some(value),
        Rule::Id => uuid::Uuid::parse_str(&value).ok().map(|_| value),
        // Excluded by `FieldSpec::rules`.
        Rule::Range { .. } => None,
    }
}

const fn integer_rule_holds(rule: Rule, number: i64) -> bool {
    match rule {
        Rule::Range { min, max } => {
            number >= min
                && match max {
                    Some(max) => number <= max,
                    None => true,
                }
        }
        Rule::MinLength(_) | Rule::Email | Rule::OneOf(_) | Rule::Id => false,
    }
}

/// Largest magnitude at which every integral `f64` is exact.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Accept JSON integers, integral floats, and numeric strings.
#[allow(clippy::cast_possible_truncation)] // integral and within i64 range
fn as_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < MAX_EXACT_FLOAT)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

// =============================================================================
// Entity schemas
// =============================================================================

/// Largest cooking time the store's `INTEGER` column holds.
pub const MAX_COOKING_MINUTES: i64 = 2_147_483_647;

/// Rules for user payloads.
pub static USER: Schema = Schema {
    entity: "user",
    fields: &[
        FieldSpec::text("nombre", "El nombre es obligatorio").rules(&[(
            Rule::MinLength(2),
            "El nombre debe tener al menos 2 caracteres",
        )]),
        FieldSpec::text("email", "El email es obligatorio")
            .rules(&[(Rule::Email, "Debe ser un email válido")]),
        FieldSpec::integer("edad", "La edad es obligatoria")
            .optional()
            .rules(&[(
                Rule::Range {
                    min: 13,
                    max: Some(120),
                },
                "La edad debe estar entre 13 y 120 años",
            )]),
        FieldSpec::text("pais", "El país es obligatorio")
            .optional()
            .rules(&[(
                Rule::MinLength(2),
                "El país debe tener al menos 2 caracteres",
            )]),
    ],
};

/// Rules for recipe payloads. The owner reference is fixed at creation.
pub static RECIPE: Schema = Schema {
    entity: "recipe",
    fields: &[
        FieldSpec::text("titulo", "El título es obligatorio").rules(&[(
            Rule::MinLength(3),
            "El título debe tener al menos 3 caracteres",
        )]),
        FieldSpec::text("descripcion", "La descripción es obligatoria").rules(&[(
            Rule::MinLength(10),
            "La descripción debe tener al menos 10 caracteres",
        )]),
        FieldSpec::text("instrucciones", "Las instrucciones son obligatorias").rules(&[(
            Rule::MinLength(20),
            "Las instrucciones deben tener al menos 20 caracteres",
        )]),
        FieldSpec::integer("tiempoCoccion", "El tiempo de cocción es obligatorio").rules(&[
            (
                Rule::Range { min: 1, max: None },
                "El tiempo de cocción debe ser un número mayor a 0",
            ),
            (
                Rule::Range {
                    min: 1,
                    max: Some(MAX_COOKING_MINUTES),
                },
                "El tiempo de cocción es demasiado grande",
            ),
        ]),
        FieldSpec::text("dificultad", "La dificultad es obligatoria")
            .optional()
            .rules(&[(
                Rule::OneOf(Difficulty::ACCEPTED),
                "La dificultad debe ser: Fácil, Intermedio o Difícil",
            )]),
        FieldSpec::text("usuario", "El usuario es obligatorio")
            .create_only()
            .rules(&[(Rule::Id, "ID de usuario inválido")]),
    ],
};

/// Rules for ingredient payloads.
pub static INGREDIENT: Schema = Schema {
    entity: "ingredient",
    fields: &[
        FieldSpec::text("nombre", "El nombre del ingrediente es obligatorio").rules(&[(
            Rule::MinLength(2),
            "El nombre debe tener al menos 2 caracteres",
        )]),
        FieldSpec::text("cantidad", "La cantidad es obligatoria"),
        FieldSpec::text("unidad", "La unidad es obligatoria")
            .rules(&[(Rule::OneOf(Unit::TOKENS), "Unidad inválida")]),
        FieldSpec::text("receta", "La receta es obligatoria")
            .create_only()
            .rules(&[(Rule::Id, "ID de receta inválido")]),
    ],
};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    fn fields(violations: &[FieldViolation]) -> Vec<&str> {
        violations.iter().map(|v| v.field.as_str()).collect()
    }

    #[test]
    fn test_user_create_normalizes_fields() {
        let payload = json!({
            "nombre": "  María González  ",
            "email": " Maria@Example.com ",
            "edad": 28,
            "pais": " España ",
        });

        let normalized = USER.validate(object(&payload), Mode::Create).unwrap();

        assert_eq!(normalized["nombre"], "María González");
        assert_eq!(normalized["email"], "maria@example.com");
        assert_eq!(normalized["edad"], 28);
        assert_eq!(normalized["pais"], "España");
    }

    #[test]
    fn test_user_create_reports_every_violation() {
        let payload = json!({ "nombre": "A", "edad": 12, "pais": "X" });

        let violations = USER.validate(object(&payload), Mode::Create).unwrap_err();

        assert_eq!(fields(&violations), ["nombre", "email", "edad", "pais"]);
        assert_eq!(violations[1].message, "El email es obligatorio");
        assert_eq!(violations[1].value, Value::Null);
        assert_eq!(violations[2].value, json!(12));
    }

    #[test]
    fn test_user_update_accepts_partial_payload() {
        let payload = json!({ "pais": "Chile" });
        let normalized = USER.validate(object(&payload), Mode::Update).unwrap();
        assert_eq!(normalized["pais"], "Chile");
    }

    #[test]
    fn test_user_update_still_checks_supplied_fields() {
        let payload = json!({ "email": "broken" });
        let violations = USER.validate(object(&payload), Mode::Update).unwrap_err();
        assert_eq!(violations[0].message, "Debe ser un email válido");
    }

    #[test]
    fn test_age_bounds_are_inclusive() {
        for age in [13, 120] {
            let payload = json!({ "edad": age });
            assert!(USER.validate(object(&payload), Mode::Update).is_ok());
        }
        for age in [12, 121] {
            let payload = json!({ "edad": age });
            assert!(USER.validate(object(&payload), Mode::Update).is_err());
        }
    }

    #[test]
    fn test_age_must_be_integer() {
        let payload = json!({ "edad": 30.5 });
        assert!(USER.validate(object(&payload), Mode::Update).is_err());

        let payload = json!({ "edad": "31" });
        let normalized = USER.validate(object(&payload), Mode::Update).unwrap();
        assert_eq!(normalized["edad"], 31);
    }

    #[test]
    fn test_null_optional_field_is_absent() {
        let payload = json!({ "nombre": "Ana", "email": "ana@example.com", "edad": null });
        let normalized = USER.validate(object(&payload), Mode::Create).unwrap();
        assert!(!normalized.contains_key("edad"));
    }

    #[test]
    fn test_null_difficulty_is_dropped() {
        let payload = json!({
            "titulo": "Sopa",
            "descripcion": "Sopa de verduras",
            "instrucciones": "Hervir todo durante media hora.",
            "tiempoCoccion": 30,
            "dificultad": null,
            "usuario": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        });
        let normalized = RECIPE.validate(object(&payload), Mode::Create).unwrap();
        assert!(!normalized.contains_key("dificultad"));
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let payload = json!({ "nombre": "Ana", "email": "ana@example.com", "apodo": "ani" });
        let normalized = USER.validate(object(&payload), Mode::Create).unwrap();
        assert_eq!(normalized["apodo"], "ani");
    }

    #[test]
    fn test_length_is_checked_after_trim() {
        let payload = json!({ "titulo": "  ab  " });
        let violations = RECIPE.validate(object(&payload), Mode::Update).unwrap_err();
        assert_eq!(
            violations[0].message,
            "El título debe tener al menos 3 caracteres"
        );
    }

    #[test]
    fn test_blank_required_field_reads_as_missing() {
        let payload = json!({ "titulo": "   " });
        let violations = RECIPE.validate(object(&payload), Mode::Update).unwrap_err();
        assert_eq!(violations[0].message, "El título es obligatorio");
    }

    #[test]
    fn test_recipe_create_requires_owner_id() {
        let payload = json!({
            "titulo": "Paella Valenciana",
            "descripcion": "Auténtica paella valenciana",
            "instrucciones": "Sofreír, añadir arroz y caldo, cocinar.",
            "tiempoCoccion": 45,
            "usuario": "not-an-id",
        });

        let violations = RECIPE.validate(object(&payload), Mode::Create).unwrap_err();

        assert_eq!(fields(&violations), ["usuario"]);
        assert_eq!(violations[0].message, "ID de usuario inválido");
    }

    #[test]
    fn test_recipe_update_ignores_owner() {
        let payload = json!({ "titulo": "New Title", "usuario": "not-an-id" });
        let normalized = RECIPE.validate(object(&payload), Mode::Update).unwrap();
        assert_eq!(normalized["titulo"], "New Title");
    }

    #[test]
    fn test_difficulty_membership_is_case_sensitive() {
        let payload = json!({ "dificultad": "fácil" });
        assert!(RECIPE.validate(object(&payload), Mode::Update).is_err());

        let payload = json!({ "dificultad": "Intermedio" });
        assert!(RECIPE.validate(object(&payload), Mode::Update).is_ok());
    }

    #[test]
    fn test_cooking_time_must_be_positive() {
        let payload = json!({ "tiempoCoccion": 0 });
        let violations = RECIPE.validate(object(&payload), Mode::Update).unwrap_err();
        assert_eq!(
            violations[0].message,
            "El tiempo de cocción debe ser un número mayor a 0"
        );
    }

    #[test]
    fn test_ingredient_quantity_accepts_free_text_and_numbers() {
        let recipe = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let payload = json!({ "nombre": "sal", "cantidad": " una pizca ", "unidad": "cucharaditas", "receta": recipe });
        let normalized = INGREDIENT.validate(object(&payload), Mode::Create).unwrap();
        assert_eq!(normalized["cantidad"], "una pizca");

        let payload = json!({ "nombre": "arroz", "cantidad": 400, "unidad": "gramos", "receta": recipe });
        let normalized = INGREDIENT.validate(object(&payload), Mode::Create).unwrap();
        assert_eq!(normalized["cantidad"], "400");
    }

    #[test]
    fn test_ingredient_rejects_unknown_unit() {
        let payload = json!({
            "nombre": "sal",
            "cantidad": "1",
            "unidad": "pizca",
            "receta": "67e55044-10b1-426f-9247-bb680e5fe0c8",
        });
        let violations = INGREDIENT.validate(object(&payload), Mode::Create).unwrap_err();
        assert_eq!(violations[0].field, "unidad");
        assert_eq!(violations[0].message, "Unidad inválida");
        assert_eq!(violations[0].value, json!("pizca"));
    }

    #[test]
    fn test_non_text_value_is_rejected() {
        let payload = json!({ "nombre": ["Ana"] });
        let violations = USER.validate(object(&payload), Mode::Update).unwrap_err();
        assert_eq!(violations[0].message, "El campo nombre debe ser texto");
    }

    #[test]
    fn test_cooking_time_fits_the_column() {
        let payload = json!({ "tiempoCoccion": 3_000_000_000_i64 });
        let violations = RECIPE.validate(object(&payload), Mode::Update).unwrap_err();
        assert_eq!(violations[0].field, "tiempoCoccion");
        assert_eq!(violations[0].message, "El tiempo de cocción es demasiado grande");

        let payload = json!({ "tiempoCoccion": MAX_COOKING_MINUTES });
        assert!(RECIPE.validate(object(&payload), Mode::Update).is_ok());
    }

    #[test]
    fn test_kinds_accept_only_their_rules() {
        assert!(Kind::Integer.accepts(Rule::Range { min: 0, max: None }));
        assert!(!Kind::Integer.accepts(Rule::MinLength(1)));
        assert!(!Kind::Text.accepts(Rule::Range { min: 0, max: None }));
        assert!(Kind::Text.accepts(Rule::Id));
        for schema in [&USER, &RECIPE, &INGREDIENT] {
            for spec in schema.fields {
                assert!(spec.rules.iter().all(|(rule, _)| spec.kind.accepts(*rule)));
            }
        }
    }
}
