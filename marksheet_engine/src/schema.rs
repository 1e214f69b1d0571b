use log::debug;
use std::collections::{BTreeMap, HashSet};

use crate::config::*;
use crate::headers::normalize_header;

/// The component used when a subject does not declare any.
pub const DEFAULT_COMPONENT: &str = "Total";

impl IdentityField {
    pub fn new(key: &str, label: &str, header: &str, field_type: FieldType) -> IdentityField {
        IdentityField {
            key: key.to_string(),
            label: label.to_string(),
            header: header.to_string(),
            field_type,
            date_format: None,
            required: true,
        }
    }
}

impl Subject {
    /// A required subject, with the default column names for its components.
    pub fn new(key: &str, label: &str, max_marks: f64, components: &[&str]) -> Subject {
        let components: Vec<String> = if components.is_empty() {
            vec![DEFAULT_COMPONENT.to_string()]
        } else {
            components.iter().map(|c| c.to_string()).collect()
        };
        let mut s = Subject {
            key: key.to_string(),
            label: label.to_string(),
            max_marks,
            components,
            component_max: Default::default(),
            optional: false,
            choice_group: None,
            columns: Default::default(),
        };
        s.columns = s.default_columns();
        s
    }

    pub fn optional(mut self) -> Subject {
        self.optional = true;
        self
    }

    pub fn in_group(mut self, group: &str) -> Subject {
        self.choice_group = Some(group.to_string());
        self
    }

    pub fn with_component_max(mut self, component: &str, max: f64) -> Subject {
        self.component_max.insert(component.to_string(), max);
        self
    }

    pub fn with_column(mut self, component: &str, header: &str) -> Subject {
        self.columns.insert(component.to_string(), header.to_string());
        self
    }

    /// The derived column names: the label alone for a single component,
    /// `"<label> <component>"` otherwise.
    pub fn default_columns(&self) -> BTreeMap<String, String> {
        let single = self.components.len() == 1;
        self.components
            .iter()
            .map(|c| {
                let header = if single {
                    self.label.clone()
                } else {
                    format!("{} {}", self.label, c)
                };
                (c.clone(), header)
            })
            .collect()
    }

    pub fn max_for(&self, component: &str) -> f64 {
        self.component_max
            .get(component)
            .cloned()
            .unwrap_or(self.max_marks)
    }

    pub fn column_for(&self, component: &str) -> Option<&str> {
        self.columns.get(component).map(|s| s.as_str())
    }
}

impl ChoiceGroup {
    /// The group created for a choice group id that nobody declared.
    pub fn exactly_one(label: &str) -> ChoiceGroup {
        ChoiceGroup {
            min_selected: 1,
            max_selected: 1,
            label: label.to_string(),
        }
    }
}

impl TemplateSchema {
    pub fn subject(&self, key: &str) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.key == key)
    }

    /// All the column headers the template reads, identity fields first.
    pub fn column_headers(&self) -> Vec<String> {
        let mut res: Vec<String> = self
            .identity_fields
            .iter()
            .map(|f| f.header.clone())
            .collect();
        for s in self.subjects.iter() {
            for c in s.components.iter() {
                if let Some(h) = s.column_for(c) {
                    res.push(h.to_string());
                }
            }
        }
        res
    }

    /// Checks the invariants the engine relies on.
    ///
    /// The engine itself does not call this: a template coming from an authoring
    /// surface is expected to be checked once, when it is loaded.
    pub fn check(&self) -> Result<(), SchemaError> {
        let mut headers: HashSet<String> = HashSet::new();
        for h in self.column_headers() {
            if !headers.insert(normalize_header(&h)) {
                return Err(SchemaError::DuplicateHeader(h));
            }
        }

        let mut identity_keys: HashSet<&str> = HashSet::new();
        for f in self.identity_fields.iter() {
            if !identity_keys.insert(f.key.as_str()) {
                return Err(SchemaError::DuplicateIdentityKey(f.key.clone()));
            }
        }

        let mut subject_keys: HashSet<&str> = HashSet::new();
        for s in self.subjects.iter() {
            if !subject_keys.insert(s.key.as_str()) {
                return Err(SchemaError::DuplicateSubjectKey(s.key.clone()));
            }
            if s.components.is_empty() {
                return Err(SchemaError::EmptyComponents(s.key.clone()));
            }
            if s.max_marks <= 0.0 || s.component_max.values().any(|m| *m <= 0.0) {
                return Err(SchemaError::NonPositiveMax(s.key.clone()));
            }
            if let Some(c) = s
                .component_max
                .keys()
                .find(|c| !s.components.contains(*c))
            {
                return Err(SchemaError::UnknownComponentMax {
                    subject: s.key.clone(),
                    component: c.clone(),
                });
            }
            if let Some(g) = &s.choice_group {
                if !self.choice_groups.contains_key(g) {
                    return Err(SchemaError::UnknownChoiceGroup {
                        subject: s.key.clone(),
                        group: g.clone(),
                    });
                }
            }
        }

        if let Some((gid, _)) = self
            .choice_groups
            .iter()
            .find(|(_, g)| g.min_selected > g.max_selected)
        {
            return Err(SchemaError::InvalidChoiceGroupRange(gid.clone()));
        }

        let sorted = self
            .grading
            .divisions
            .windows(2)
            .all(|w| w[0].threshold_percent >= w[1].threshold_percent);
        if !sorted {
            return Err(SchemaError::UnsortedDivisions);
        }

        debug!(
            "check: template {:?}: {} identity fields, {} subjects, {} choice groups",
            self.name,
            self.identity_fields.len(),
            self.subjects.len(),
            self.choice_groups.len()
        );
        Ok(())
    }
}
