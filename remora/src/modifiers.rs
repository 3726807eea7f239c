//! Atomic update-operator documents.

use crate::Update;
use mongodb::bson::{self, Bson, Document, doc};
use serde::Serialize;
use std::fmt::Display;

/// Which end of an array `$pop` removes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pop {
    First,
    Last,
}

/// Builder for update documents made of MongoDB update operators (`$inc`,
/// `$push`, `$pull`, ...). Repeated uses of the same operator are merged
/// into one operator sub-document.
///
/// ```ignore
/// User::update(mongo, criteria, Modify::new().inc(Fields::Logins, 1).unset(Fields::Token)).await?;
/// ```
#[derive(Debug, Default)]
pub struct Modify(Document);

impl Modify {
    pub fn new() -> Self {
        Self::default()
    }

    fn operator(&mut self, operator: &str) -> &mut Document {
        if !self.0.contains_key(operator) {
            self.0.insert(operator, Document::new());
        }

        self.0.get_document_mut(operator).unwrap()
    }

    fn to_bson<T: Serialize>(val: &T) -> Bson {
        bson::to_bson(val).unwrap()
    }

    pub fn inc(mut self, field: impl Display, by: i64) -> Self {
        self.operator("$inc").insert(field.to_string(), by);
        self
    }

    pub fn dec(self, field: impl Display, by: i64) -> Self {
        self.inc(field, -by)
    }

    pub fn push(mut self, field: impl Display, value: impl Serialize) -> Self {
        self.operator("$push")
            .insert(field.to_string(), Self::to_bson(&value));
        self
    }

    /// Appends every element of `values` (`$push` with `$each`).
    pub fn push_all(mut self, field: impl Display, values: impl Serialize) -> Self {
        self.operator("$push").insert(
            field.to_string(),
            doc! { "$each": Self::to_bson(&values) },
        );
        self
    }

    pub fn pull(mut self, field: impl Display, value: impl Serialize) -> Self {
        self.operator("$pull")
            .insert(field.to_string(), Self::to_bson(&value));
        self
    }

    pub fn pull_all(mut self, field: impl Display, values: impl Serialize) -> Self {
        self.operator("$pullAll")
            .insert(field.to_string(), Self::to_bson(&values));
        self
    }

    pub fn add_to_set(mut self, field: impl Display, value: impl Serialize) -> Self {
        self.operator("$addToSet")
            .insert(field.to_string(), Self::to_bson(&value));
        self
    }

    pub fn pop(mut self, field: impl Display, pop: Pop) -> Self {
        let end = match pop {
            Pop::First => -1,
            Pop::Last => 1,
        };

        self.operator("$pop").insert(field.to_string(), end);
        self
    }

    pub fn set(mut self, field: impl Display, value: impl Serialize) -> Self {
        self.operator("$set")
            .insert(field.to_string(), Self::to_bson(&value));
        self
    }

    pub fn unset(mut self, field: impl Display) -> Self {
        self.operator("$unset").insert(field.to_string(), "");
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl<M> Update<M> for Modify {
    fn to_document(&self) -> Document {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_merge_under_one_operator() {
        let modify = Modify::new().inc("logins", 1).inc("visits", 2);
        assert_eq!(
            modify.into_document(),
            doc! { "$inc": { "logins": 1_i64, "visits": 2_i64 } }
        );
    }

    #[test]
    fn decrement_negates() {
        let modify = Modify::new().dec("credits", 5);
        assert_eq!(modify.into_document(), doc! { "$inc": { "credits": -5_i64 } });
    }

    #[test]
    fn push_all_uses_each() {
        let modify = Modify::new().push_all("tags", ["a", "b"]);
        assert_eq!(
            modify.into_document(),
            doc! { "$push": { "tags": { "$each": ["a", "b"] } } }
        );
    }

    #[test]
    fn pop_maps_to_signed_ends() {
        let modify = Modify::new().pop("queue", Pop::First).pop("stack", Pop::Last);
        assert_eq!(
            modify.into_document(),
            doc! { "$pop": { "queue": -1, "stack": 1 } }
        );
    }

    #[test]
    fn mixed_operators_coexist() {
        let modify = Modify::new()
            .set("name", "Kit")
            .unset("nickname")
            .pull("tags", "old");

        assert_eq!(
            modify.into_document(),
            doc! {
                "$set": { "name": "Kit" },
                "$unset": { "nickname": "" },
                "$pull": { "tags": "old" },
            }
        );
    }
}
