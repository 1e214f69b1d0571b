use crate::sheet::*;
use snafu::prelude::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct IdentityFieldConfig {
    pub key: String,
    pub label: Option<String>,
    pub header: String,
    #[serde(rename = "type")]
    pub field_type: Option<String>,
    #[serde(rename = "dateFormat")]
    pub date_format: Option<String>,
    pub required: Option<bool>,
}

impl IdentityFieldConfig {
    pub fn to_identity_field(&self) -> SheetResult<IdentityField> {
        let field_type = match self.field_type.as_deref() {
            None | Some("string") | Some("text") => FieldType::String,
            Some("number") => FieldType::Number,
            Some("date") => FieldType::Date,
            Some(x) => {
                return InvalidTemplateValueSnafu {
                    field: format!("identityFields.{}.type", self.key),
                    value: x,
                }
                .fail();
            }
        };
        let label = self.label.clone().unwrap_or_else(|| self.header.clone());
        let mut field = IdentityField::new(&self.key, &label, &self.header, field_type);
        field.date_format = self.date_format.clone();
        field.required = self.required.unwrap_or(true);
        Ok(field)
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SubjectConfig {
    pub key: String,
    pub label: String,
    #[serde(rename = "maxMarks")]
    pub max_marks: f64,
    pub components: Option<Vec<String>>,
    #[serde(rename = "componentMax")]
    pub component_max: Option<BTreeMap<String, f64>>,
    pub optional: Option<bool>,
    #[serde(rename = "choiceGroup")]
    pub choice_group: Option<String>,
    /// Component id -> column header. Derived from the label when missing.
    pub columns: Option<BTreeMap<String, String>>,
}

impl SubjectConfig {
    pub fn to_subject(&self) -> Subject {
        let components: Vec<&str> = self
            .components
            .iter()
            .flatten()
            .map(|c| c.as_str())
            .collect();
        let mut subject = Subject::new(&self.key, &self.label, self.max_marks, &components);
        subject.optional = self.optional.unwrap_or(false);
        subject.choice_group = match self.choice_group.clone() {
            Some(g) if g.is_empty() => None,
            g => g,
        };
        if let Some(cm) = &self.component_max {
            subject.component_max = cm.clone();
        }
        if let Some(cols) = &self.columns {
            subject.columns.clear();
            for (cid, header) in cols.iter() {
                subject = subject.with_column(cid, header);
            }
        }
        subject
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceGroupConfig {
    pub min: usize,
    pub max: usize,
    pub label: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DivisionConfig {
    pub name: String,
    pub threshold: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct GradingConfig {
    #[serde(rename = "passPercent")]
    pub pass_percent: f64,
    pub divisions: Option<Vec<DivisionConfig>>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(rename = "templateName")]
    pub template_name: String,
    pub orientation: Option<String>,
    #[serde(rename = "identityFields")]
    pub identity_fields: Vec<IdentityFieldConfig>,
    pub subjects: Vec<SubjectConfig>,
    #[serde(rename = "choiceGroups")]
    pub choice_groups: Option<BTreeMap<String, ChoiceGroupConfig>>,
    pub grading: GradingConfig,
}

impl TemplateConfig {
    pub fn orientation(&self) -> SheetResult<Option<Orientation>> {
        self.orientation.as_deref().map(parse_orientation).transpose()
    }

    /// The template, without the well-formedness check.
    pub fn to_schema(&self) -> SheetResult<TemplateSchema> {
        let mut identity_fields: Vec<IdentityField> = Vec::new();
        for f in self.identity_fields.iter() {
            identity_fields.push(f.to_identity_field()?);
        }
        let choice_groups: BTreeMap<String, ChoiceGroup> = self
            .choice_groups
            .iter()
            .flatten()
            .map(|(gid, g)| {
                (
                    gid.clone(),
                    ChoiceGroup {
                        min_selected: g.min,
                        max_selected: g.max,
                        label: g.label.clone().unwrap_or_else(|| gid.clone()),
                    },
                )
            })
            .collect();
        Ok(TemplateSchema {
            name: self.template_name.clone(),
            identity_fields,
            subjects: self.subjects.iter().map(|s| s.to_subject()).collect(),
            choice_groups,
            grading: Grading {
                pass_percent: self.grading.pass_percent,
                divisions: self
                    .grading
                    .divisions
                    .iter()
                    .flatten()
                    .map(|d| Division {
                        name: d.name.clone(),
                        threshold_percent: d.threshold,
                    })
                    .collect(),
            },
        })
    }
}

pub fn parse_orientation(s: &str) -> SheetResult<Orientation> {
    match s.trim().to_lowercase().as_str() {
        "rows" | "row" => Ok(Orientation::Rows),
        "columns" | "column" | "transpose" => Ok(Orientation::Columns),
        x => InvalidTemplateValueSnafu {
            field: "orientation",
            value: x,
        }
        .fail(),
    }
}

pub fn read_template(path: &str) -> SheetResult<TemplateConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_template: {} bytes from {:?}", contents.len(), path);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

/// Reads a JSON array of subjects, in the same format as the template subjects.
pub fn read_extra_subjects(path: &str) -> SheetResult<Vec<Subject>> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let subjects: Vec<SubjectConfig> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_extra_subjects: {} subjects from {:?}", subjects.len(), path);
    Ok(subjects.iter().map(|s| s.to_subject()).collect())
}

/// Reads a reference summary.
pub fn read_summary(path: &str) -> SheetResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}
