use im::hashmap::HashMap;
use std::collections::HashSet;
use tracing::debug;

use crate::types::*;
use crate::unify::is_assignable;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("duplicate field `{field}` in shape `{shape}`")]
    DuplicateField { shape: String, field: String },

    #[error("shape `{shape}` declares more than one {key_kind} index signature")]
    DuplicateIndexSignature { shape: String, key_kind: KeyKind },

    #[error("unknown shape `{0}`")]
    UnknownShape(String),

    #[error("number index type `{number}` of shape `{shape}` is not assignable to string index type `{string}`")]
    InconsistentIndexSignatures {
        shape: String,
        number: FieldType,
        string: FieldType,
    },

    #[error("field `{field}` of shape `{shape}` is not assignable to its {key_kind} index signature")]
    FieldConflictsWithIndexSignature {
        shape: String,
        field: String,
        key_kind: KeyKind,
    },

    #[error("shape `{shape}` incorrectly extends `{base}`: `{field}` is incompatible")]
    IncompatibleExtension {
        shape: String,
        base: String,
        field: String,
    },
}

/// Named shape definitions.
///
/// Backed by a persistent map so that staging a definition (and rolling it
/// back when validation fails) is a cheap clone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShapeRegistry {
    shapes: HashMap<String, ShapeDef>,
}

// Where a flattened member came from, used to validate overrides.
struct Inherited {
    base: String,
    field: FieldSpec,
}

impl ShapeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(
        &mut self,
        name: &str,
        fields: Vec<FieldSpec>,
        index_signatures: Vec<IndexSignature>,
    ) -> Result<(), RegistryError> {
        self.define_extending(name, &[], fields, index_signatures)
    }

    /// Defines `name` as the members of `bases` followed by its own members.
    /// Redefining a name replaces the earlier definition.
    pub fn define_extending(
        &mut self,
        name: &str,
        bases: &[&str],
        fields: Vec<FieldSpec>,
        index_signatures: Vec<IndexSignature>,
    ) -> Result<(), RegistryError> {
        check_unique_fields(name, &fields)?;
        check_unique_index_signatures(name, &index_signatures)?;

        let mut flat_fields: Vec<FieldSpec> = vec![];
        let mut flat_sigs: Vec<IndexSignature> = vec![];
        let mut overrides: Vec<(Inherited, FieldSpec)> = vec![];
        let mut sig_overrides: Vec<(String, IndexSignature, IndexSignature)> = vec![];
        let mut origins: std::collections::HashMap<String, String> = Default::default();

        for base_name in bases {
            let base = self.lookup(base_name)?;
            for field in &base.fields {
                match flat_fields.iter().find(|existing| existing.name == field.name) {
                    Some(existing) if existing.t != field.t || existing.optional != field.optional => {
                        return Err(RegistryError::IncompatibleExtension {
                            shape: name.to_owned(),
                            base: base_name.to_string(),
                            field: field.name.to_owned(),
                        })
                    }
                    Some(_) => (),
                    None => {
                        origins.insert(field.name.to_owned(), base_name.to_string());
                        flat_fields.push(field.to_owned());
                    }
                }
            }
            for sig in &base.index_signatures {
                match flat_sigs.iter().find(|existing| existing.key_kind == sig.key_kind) {
                    Some(existing) if existing.t != sig.t => {
                        return Err(RegistryError::IncompatibleExtension {
                            shape: name.to_owned(),
                            base: base_name.to_string(),
                            field: format!("[{}]", sig.key_kind),
                        })
                    }
                    Some(_) => (),
                    None => flat_sigs.push(sig.to_owned()),
                }
            }
        }

        for field in fields {
            match flat_fields.iter_mut().find(|existing| existing.name == field.name) {
                Some(existing) => {
                    let inherited = Inherited {
                        base: origins.get(&field.name).cloned().unwrap_or_default(),
                        field: existing.to_owned(),
                    };
                    *existing = field.to_owned();
                    overrides.push((inherited, field));
                }
                None => flat_fields.push(field),
            }
        }

        for sig in index_signatures {
            match flat_sigs.iter_mut().find(|existing| existing.key_kind == sig.key_kind) {
                Some(existing) => {
                    let base = bases
                        .iter()
                        .find(|base_name| {
                            self.get(base_name)
                                .and_then(|base| base.index_signature(sig.key_kind))
                                .is_some()
                        })
                        .map(|base_name| base_name.to_string())
                        .unwrap_or_default();
                    sig_overrides.push((base, existing.to_owned(), sig.to_owned()));
                    *existing = sig;
                }
                None => flat_sigs.push(sig),
            }
        }

        let def = ShapeDef {
            name: name.to_owned(),
            fields: flat_fields,
            index_signatures: flat_sigs,
        };

        // Validation runs against a staged copy so that self-references
        // resolve to the new definition.
        let mut staged = self.clone();
        let replaced = staged.shapes.insert(name.to_owned(), def.clone()).is_some();

        for (inherited, field) in &overrides {
            let incompatible = (field.optional && !inherited.field.optional)
                || is_assignable(&staged, &field.t, &inherited.field.t) == Some(false);
            if incompatible {
                return Err(RegistryError::IncompatibleExtension {
                    shape: name.to_owned(),
                    base: inherited.base.to_owned(),
                    field: field.name.to_owned(),
                });
            }
        }
        for (base, inherited, sig) in &sig_overrides {
            if is_assignable(&staged, &sig.t, &inherited.t) == Some(false) {
                return Err(RegistryError::IncompatibleExtension {
                    shape: name.to_owned(),
                    base: base.to_owned(),
                    field: format!("[{}]", sig.key_kind),
                });
            }
        }

        staged.validate_index_signatures(&def)?;

        *self = staged;
        debug!(
            shape = name,
            fields = def.fields.len(),
            index_signatures = def.index_signatures.len(),
            replaced,
            "defined shape"
        );
        Ok(())
    }

    fn validate_index_signatures(&self, def: &ShapeDef) -> Result<(), RegistryError> {
        let number = def.index_signature(KeyKind::Number);
        let string = def.index_signature(KeyKind::String);

        if let (Some(number), Some(string)) = (number, string) {
            if is_assignable(self, &number.t, &string.t) == Some(false) {
                return Err(RegistryError::InconsistentIndexSignatures {
                    shape: def.name.to_owned(),
                    number: number.t.to_owned(),
                    string: string.t.to_owned(),
                });
            }
        }

        for field in &def.fields {
            for sig in def.index_signatures_for(&field.name) {
                // Optional fields may also hold `undefined`, which index
                // signatures don't admit, but only the declared type is
                // compared here.
                if is_assignable(self, &field.t, &sig.t) == Some(false) {
                    return Err(RegistryError::FieldConflictsWithIndexSignature {
                        shape: def.name.to_owned(),
                        field: field.name.to_owned(),
                        key_kind: sig.key_kind,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<&ShapeDef, RegistryError> {
        self.shapes
            .get(name)
            .ok_or_else(|| RegistryError::UnknownShape(name.to_owned()))
    }

    pub fn get(&self, name: &str) -> Option<&ShapeDef> {
        self.shapes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Registered names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.shapes.keys().map(|name| name.as_str())
    }
}

fn check_unique_fields(shape: &str, fields: &[FieldSpec]) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(RegistryError::DuplicateField {
                shape: shape.to_owned(),
                field: field.name.to_owned(),
            });
        }
    }
    Ok(())
}

fn check_unique_index_signatures(
    shape: &str,
    index_signatures: &[IndexSignature],
) -> Result<(), RegistryError> {
    let mut seen = HashSet::new();
    for sig in index_signatures {
        if !seen.insert(sig.key_kind) {
            return Err(RegistryError::DuplicateIndexSignature {
                shape: shape.to_owned(),
                key_kind: sig.key_kind,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn animal_registry() -> ShapeRegistry {
        let mut registry = ShapeRegistry::new();
        registry
            .define("Animal", vec![FieldSpec::new("name", Keyword::String)], vec![])
            .unwrap();
        registry
    }

    #[test]
    fn define_and_lookup() -> Result<(), RegistryError> {
        let registry = animal_registry();
        let animal = registry.lookup("Animal")?;
        assert_eq!(animal.fields, vec![FieldSpec::new("name", Keyword::String)]);
        assert!(registry.contains("Animal"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Animal"]);
        Ok(())
    }

    #[test]
    fn lookup_unknown_shape() {
        let registry = ShapeRegistry::new();
        assert_eq!(
            registry.lookup("Nope"),
            Err(RegistryError::UnknownShape("Nope".to_string()))
        );
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let mut registry = ShapeRegistry::new();
        let result = registry.define(
            "Point",
            vec![
                FieldSpec::new("x", Keyword::Number),
                FieldSpec::new("x", Keyword::String),
            ],
            vec![],
        );
        assert_eq!(
            result,
            Err(RegistryError::DuplicateField {
                shape: "Point".to_string(),
                field: "x".to_string(),
            })
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_index_signatures_are_rejected() {
        let mut registry = ShapeRegistry::new();
        let result = registry.define(
            "Dict",
            vec![],
            vec![
                IndexSignature::new(KeyKind::String, Keyword::Number),
                IndexSignature::new(KeyKind::String, Keyword::String),
            ],
        );
        assert_eq!(
            result,
            Err(RegistryError::DuplicateIndexSignature {
                shape: "Dict".to_string(),
                key_kind: KeyKind::String,
            })
        );
    }

    #[test]
    fn redefinition_replaces() -> Result<(), RegistryError> {
        let mut registry = animal_registry();
        registry.define("Animal", vec![FieldSpec::new("legs", Keyword::Number)], vec![])?;
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("Animal")?.field("name").is_none());
        Ok(())
    }

    #[test]
    fn identical_redefinition_is_idempotent() -> Result<(), RegistryError> {
        let once = animal_registry();
        let mut twice = animal_registry();
        twice.define("Animal", vec![FieldSpec::new("name", Keyword::String)], vec![])?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn number_index_must_fit_string_index() {
        let mut registry = ShapeRegistry::new();
        let result = registry.define(
            "NotOkay",
            vec![],
            vec![
                IndexSignature::new(KeyKind::Number, Keyword::String),
                IndexSignature::new(KeyKind::String, Keyword::Number),
            ],
        );
        assert_eq!(
            result,
            Err(RegistryError::InconsistentIndexSignatures {
                shape: "NotOkay".to_string(),
                number: FieldType::Keyword(Keyword::String),
                string: FieldType::Keyword(Keyword::Number),
            })
        );
    }

    #[test]
    fn number_index_of_subshape_fits_string_index() -> Result<(), RegistryError> {
        let mut registry = animal_registry();
        registry.define_extending(
            "Dog",
            &["Animal"],
            vec![FieldSpec::new("breed", Keyword::String)],
            vec![],
        )?;
        registry.define(
            "Okay",
            vec![],
            vec![
                IndexSignature::new(KeyKind::Number, FieldType::reference("Dog")),
                IndexSignature::new(KeyKind::String, FieldType::reference("Animal")),
            ],
        )?;
        Ok(())
    }

    #[test]
    fn fields_must_fit_string_index() {
        let mut registry = ShapeRegistry::new();
        let result = registry.define(
            "NumberDictionary",
            vec![
                FieldSpec::new("length", Keyword::Number),
                FieldSpec::new("name", Keyword::String),
            ],
            vec![IndexSignature::new(KeyKind::String, Keyword::Number)],
        );
        assert_eq!(
            result,
            Err(RegistryError::FieldConflictsWithIndexSignature {
                shape: "NumberDictionary".to_string(),
                field: "name".to_string(),
                key_kind: KeyKind::String,
            })
        );
    }

    #[test]
    fn numeric_fields_must_fit_number_index() {
        let mut registry = ShapeRegistry::new();
        let result = registry.define(
            "Tuple",
            vec![
                FieldSpec::new("0", Keyword::Number),
                FieldSpec::new("length", Keyword::Number),
            ],
            vec![IndexSignature::new(KeyKind::Number, Keyword::String)],
        );
        assert_eq!(
            result,
            Err(RegistryError::FieldConflictsWithIndexSignature {
                shape: "Tuple".to_string(),
                field: "0".to_string(),
                key_kind: KeyKind::Number,
            })
        );
    }

    #[test]
    fn forward_references_are_allowed() -> Result<(), RegistryError> {
        let mut registry = ShapeRegistry::new();
        registry.define(
            "Owner",
            vec![FieldSpec::new("pet", FieldType::reference("Pet"))],
            vec![IndexSignature::new(KeyKind::String, FieldType::reference("Pet"))],
        )?;
        registry.define("Pet", vec![FieldSpec::new("name", Keyword::String)], vec![])?;
        assert_eq!(registry.len(), 2);
        Ok(())
    }

    #[test]
    fn extends_flattens_base_fields_first() -> Result<(), RegistryError> {
        let mut registry = animal_registry();
        registry.define("PenStroke", vec![FieldSpec::new("penWidth", Keyword::Number)], vec![])?;
        registry.define_extending(
            "Dog",
            &["Animal", "PenStroke"],
            vec![FieldSpec::new("breed", Keyword::String)],
            vec![],
        )?;
        let names: Vec<_> = registry
            .lookup("Dog")?
            .fields
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        assert_eq!(names, vec!["name", "penWidth", "breed"]);
        Ok(())
    }

    #[test]
    fn extends_unknown_base() {
        let mut registry = ShapeRegistry::new();
        let result = registry.define_extending("Dog", &["Animal"], vec![], vec![]);
        assert_eq!(result, Err(RegistryError::UnknownShape("Animal".to_string())));
    }

    #[test]
    fn override_must_be_assignable_to_base_field() {
        let mut registry = animal_registry();
        let result = registry.define_extending(
            "Robot",
            &["Animal"],
            vec![FieldSpec::new("name", Keyword::Number)],
            vec![],
        );
        assert_eq!(
            result,
            Err(RegistryError::IncompatibleExtension {
                shape: "Robot".to_string(),
                base: "Animal".to_string(),
                field: "name".to_string(),
            })
        );
        assert!(!registry.contains("Robot"));
    }

    #[test]
    fn override_may_narrow_to_a_subshape() -> Result<(), RegistryError> {
        let mut registry = animal_registry();
        registry.define_extending(
            "Dog",
            &["Animal"],
            vec![FieldSpec::new("breed", Keyword::String)],
            vec![],
        )?;
        registry.define("Kennel", vec![FieldSpec::new("resident", FieldType::reference("Animal"))], vec![])?;
        registry.define_extending(
            "DogKennel",
            &["Kennel"],
            vec![FieldSpec::new("resident", FieldType::reference("Dog")).readonly()],
            vec![],
        )?;
        let resident = registry.lookup("DogKennel")?.field("resident").cloned();
        assert_eq!(
            resident,
            Some(FieldSpec::new("resident", FieldType::reference("Dog")).readonly())
        );
        Ok(())
    }

    #[test]
    fn override_cannot_make_a_required_field_optional() {
        let mut registry = animal_registry();
        let result = registry.define_extending(
            "MaybeNamed",
            &["Animal"],
            vec![FieldSpec::new("name", Keyword::String).optional()],
            vec![],
        );
        assert!(matches!(
            result,
            Err(RegistryError::IncompatibleExtension { .. })
        ));
    }

    #[test]
    fn conflicting_bases_are_rejected() -> Result<(), RegistryError> {
        let mut registry = animal_registry();
        registry.define("Named", vec![FieldSpec::new("name", Keyword::Number)], vec![])?;
        let result = registry.define_extending("Both", &["Animal", "Named"], vec![], vec![]);
        assert_eq!(
            result,
            Err(RegistryError::IncompatibleExtension {
                shape: "Both".to_string(),
                base: "Named".to_string(),
                field: "name".to_string(),
            })
        );
        Ok(())
    }

    #[test]
    fn error_messages() {
        let err = RegistryError::DuplicateField {
            shape: "Point".to_string(),
            field: "x".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate field `x` in shape `Point`");
        let err = RegistryError::InconsistentIndexSignatures {
            shape: "NotOkay".to_string(),
            number: FieldType::reference("Animal"),
            string: FieldType::reference("Dog"),
        };
        assert_eq!(
            err.to_string(),
            "number index type `Animal` of shape `NotOkay` is not assignable to string index type `Dog`"
        );
    }
}
