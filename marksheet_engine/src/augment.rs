use log::{debug, warn};

use crate::config::*;

/// Appends custom subjects to a template.
///
/// Subjects whose key already exists are skipped. A subject without any column
/// mapping gets the derived column names. A choice group referenced by a new
/// subject but not declared is created with a 1..1 cardinality.
pub fn augment_schema(base: &TemplateSchema, extensions: &[Subject]) -> TemplateSchema {
    let mut schema = base.clone();
    for ext in extensions.iter() {
        if schema.subject(&ext.key).is_some() {
            warn!(
                "augment_schema: subject {:?} already exists in {:?}, skipping",
                ext.key, schema.name
            );
            continue;
        }
        let mut subject = ext.clone();
        if subject.columns.is_empty() {
            subject.columns = subject.default_columns();
        }
        if let Some(gid) = &subject.choice_group {
            if !schema.choice_groups.contains_key(gid) {
                debug!("augment_schema: creating choice group {:?}", gid);
                schema
                    .choice_groups
                    .insert(gid.clone(), ChoiceGroup::exactly_one(gid));
            }
        }
        debug!("augment_schema: adding subject {:?}", subject.key);
        schema.subjects.push(subject);
    }
    schema
}
