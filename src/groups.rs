//! Group ("union") aggregation: one pass over the schema building
//! group tag → ordered member names, reused by the union predicates and the
//! reflection map.

use indexmap::IndexMap;
use serde_json::Value;

use crate::schema::Schema;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    groups: IndexMap<String, Vec<String>>,
}

impl GroupIndex {
    /// Tags in first-seen order; members in schema order, each listed once.
    pub fn from_schema(schema: &Schema) -> Self {
        let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
        for def in schema.definitions() {
            for tag in &def.group_tags {
                let members = groups.entry(tag.clone()).or_default();
                if !members.contains(&def.name) {
                    members.push(def.name.clone());
                }
            }
        }
        Self { groups }
    }

    /// Members of `tag`; empty for a tag nothing declares.
    pub fn members(&self, tag: &str) -> &[String] {
        self.groups.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(tag, members)| (tag.as_str(), members.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The reflection map as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.groups
                .iter()
                .map(|(tag, members)| {
                    let members = members.iter().cloned().map(Value::from).collect();
                    (tag.clone(), Value::Array(members))
                })
                .collect(),
        )
    }
}
