pub use crate::config::*;

/// A builder for templates.
///
/// Templates usually come from a configuration file; the builder is the
/// shortest way to write one in code.
///
/// ```
/// use marksheet_engine::builder::SchemaBuilder;
/// use marksheet_engine::{FieldType, IdentityField, SchemaError, Subject};
///
/// let schema = SchemaBuilder::new("Class IX")
///     .identity(IdentityField::new("name", "Name", "Name", FieldType::String))
///     .identity(IdentityField::new("roll", "Roll No", "Roll No", FieldType::Number))
///     .subject(Subject::new("eng", "English", 100.0, &[]))
///     .subject(Subject::new("sci", "Science", 100.0, &["Theory", "Practical"])
///         .with_component_max("Theory", 70.0)
///         .with_component_max("Practical", 30.0))
///     .grading(33.0, &[("I", 60.0), ("II", 45.0), ("III", 33.0)])
///     .build()?;
///
/// assert_eq!(schema.subjects.len(), 2);
/// # Ok::<(), SchemaError>(())
/// ```
pub struct SchemaBuilder {
    pub(crate) _schema: TemplateSchema,
}

impl SchemaBuilder {
    pub fn new(name: &str) -> SchemaBuilder {
        SchemaBuilder {
            _schema: TemplateSchema {
                name: name.to_string(),
                identity_fields: Vec::new(),
                subjects: Vec::new(),
                choice_groups: Default::default(),
                grading: Grading {
                    pass_percent: 33.0,
                    divisions: Vec::new(),
                },
            },
        }
    }

    pub fn identity(mut self, field: IdentityField) -> SchemaBuilder {
        self._schema.identity_fields.push(field);
        self
    }

    pub fn subject(mut self, subject: Subject) -> SchemaBuilder {
        self._schema.subjects.push(subject);
        self
    }

    pub fn choice_group(mut self, id: &str, min: usize, max: usize, label: &str) -> SchemaBuilder {
        self._schema.choice_groups.insert(
            id.to_string(),
            ChoiceGroup {
                min_selected: min,
                max_selected: max,
                label: label.to_string(),
            },
        );
        self
    }

    /// The pass mark and the divisions, highest threshold first.
    pub fn grading(mut self, pass_percent: f64, divisions: &[(&str, f64)]) -> SchemaBuilder {
        self._schema.grading = Grading {
            pass_percent,
            divisions: divisions
                .iter()
                .map(|(name, threshold)| Division {
                    name: name.to_string(),
                    threshold_percent: *threshold,
                })
                .collect(),
        };
        self
    }

    /// Returns the template without checking it.
    pub fn build_unchecked(self) -> TemplateSchema {
        self._schema
    }

    pub fn build(self) -> Result<TemplateSchema, SchemaError> {
        self._schema.check()?;
        Ok(self._schema)
    }
}
