//! The criteria/finder-options translator.
//!
//! Turns a declarative [`FinderOptions`] value into the pair of documents the
//! driver's cursor API consumes: a query matcher (from [`Criteria`]) and
//! [`CursorOptions`] (sort, skip, limit, projection). The mapping is
//! deterministic: equal inputs always produce equal output pairs.

use crate::{
    Criteria,
    error::{Error, Result},
};
use mongodb::bson::{Document, doc};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn invert(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    fn to_i32(self) -> i32 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }
}

/// An ordered list of `(field, direction)` sort keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sort(Vec<(String, Order)>);

impl Sort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.0.push((field.into(), Order::Asc));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.0.push((field.into(), Order::Desc));
        self
    }

    /// Parses a sort clause string of comma-separated `field [asc|desc]`
    /// tokens. A token without an explicit direction sorts ascending; empty
    /// tokens are skipped.
    pub fn parse(clause: &str) -> Result<Self> {
        let mut keys = vec![];

        for token in clause.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            let mut parts = token.split_whitespace();

            let field = parts.next().unwrap();

            let order = match parts.next() {
                None => Order::Asc,
                Some(direction) if direction.eq_ignore_ascii_case("asc") => Order::Asc,
                Some(direction) if direction.eq_ignore_ascii_case("desc") => Order::Desc,
                Some(_) => return Err(Error::InvalidSortClause(token.to_owned())),
            };

            if parts.next().is_some() {
                return Err(Error::InvalidSortClause(token.to_owned()));
            }

            keys.push((field.to_owned(), order));
        }

        Ok(Self(keys))
    }

    /// Flips the direction of every sort key. Used by `last`.
    pub fn invert(&self) -> Self {
        Self(
            self.0
                .iter()
                .map(|(field, order)| (field.clone(), order.invert()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = (&str, Order)> {
        self.0.iter().map(|(field, order)| (field.as_str(), *order))
    }

    /// `{field: 1|-1}` in declaration order.
    pub fn to_document(&self) -> Document {
        let mut document = doc! {};

        for (field, order) in &self.0 {
            document.insert(field, order.to_i32());
        }

        document
    }
}

impl FromStr for Sort {
    type Err = Error;

    fn from_str(clause: &str) -> Result<Self> {
        Self::parse(clause)
    }
}

/// Sort, pagination, and field-projection directives for a finder call.
/// A pure value object with no lifecycle beyond the call it is passed to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FinderOptions {
    pub sort: Option<Sort>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
    pub fields: Option<Vec<String>>,
}

impl FinderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Convenience form of [`FinderOptions::sort`] taking a clause string
    /// such as `"created_at desc, name"`.
    pub fn order(self, clause: &str) -> Result<Self> {
        Ok(self.sort(Sort::parse(clause)?))
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Lowers the directives into the options half of a cursor call.
    pub fn to_cursor_options(&self) -> CursorOptions {
        CursorOptions {
            sort: self
                .sort
                .as_ref()
                .filter(|sort| !sort.is_empty())
                .map(Sort::to_document),
            skip: self.skip,
            limit: self.limit,
            projection: self.fields.as_deref().map(projection_document),
        }
    }
}

/// The driver-facing options document set: what a cursor API accepts
/// alongside the query matcher.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CursorOptions {
    pub sort: Option<Document>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
    pub projection: Option<Document>,
}

/// Builds an inclusion projection from a field list. `_id` comes back from
/// the server by default, so it is excluded unless listed.
fn projection_document(fields: &[String]) -> Document {
    let mut has_id = false;
    let mut document = doc! {};

    for field in fields {
        if field == "_id" || field == "id" {
            has_id = true;
        } else {
            document.insert(field, 1);
        }
    }

    if !has_id {
        document.insert("_id", 0);
    }

    document
}

/// Translates criteria plus finder options into the `(matcher, options)`
/// pair consumed by the driver.
pub fn translate<M>(
    criteria: &impl Criteria<M>,
    options: &FinderOptions,
) -> (Document, CursorOptions) {
    (criteria.to_document(), options.to_cursor_options())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RawCriteria;

    #[test]
    fn parses_explicit_directions() {
        let sort = Sort::parse("name asc, age desc").unwrap();
        assert_eq!(sort.to_document(), doc! { "name": 1, "age": -1 });
    }

    #[test]
    fn direction_defaults_to_ascending() {
        let sort = Sort::parse("name, age desc").unwrap();
        assert_eq!(sort.to_document(), doc! { "name": 1, "age": -1 });
    }

    #[test]
    fn direction_is_case_insensitive() {
        let sort = Sort::parse("name ASC, age Desc").unwrap();
        assert_eq!(sort.to_document(), doc! { "name": 1, "age": -1 });
    }

    #[test]
    fn tolerates_stray_whitespace_and_empty_tokens() {
        let sort = Sort::parse("  name   desc , , age ").unwrap();
        assert_eq!(sort.to_document(), doc! { "name": -1, "age": 1 });
    }

    #[test]
    fn rejects_unknown_directions() {
        let err = Sort::parse("name sideways").unwrap_err();
        assert!(matches!(err, Error::InvalidSortClause(token) if token == "name sideways"));
    }

    #[test]
    fn rejects_trailing_tokens() {
        assert!(Sort::parse("name asc extra").is_err());
    }

    #[test]
    fn inversion_flips_every_key() {
        let sort = Sort::parse("a asc, b desc, c").unwrap();
        assert_eq!(
            sort.invert().to_document(),
            doc! { "a": -1, "b": 1, "c": -1 }
        );
    }

    #[test]
    fn double_inversion_restores_the_original() {
        for clause in ["a", "a desc", "a asc, b desc", "x, y desc, z asc"] {
            let sort = Sort::parse(clause).unwrap();
            assert_eq!(sort.invert().invert(), sort);
        }
    }

    #[test]
    fn builder_and_parser_agree() {
        let built = Sort::new().asc("name").desc("age");
        assert_eq!(built, Sort::parse("name, age desc").unwrap());
    }

    #[test]
    fn fields_become_an_inclusion_projection() {
        let options = FinderOptions::new().fields(["name", "age"]);
        assert_eq!(
            options.to_cursor_options().projection,
            Some(doc! { "name": 1, "age": 1, "_id": 0 })
        );
    }

    #[test]
    fn listed_id_is_not_excluded() {
        let options = FinderOptions::new().fields(["id", "name"]);
        assert_eq!(
            options.to_cursor_options().projection,
            Some(doc! { "name": 1 })
        );
    }

    #[test]
    fn empty_sort_is_dropped_from_cursor_options() {
        let options = FinderOptions::new().sort(Sort::new());
        assert_eq!(options.to_cursor_options().sort, None);
    }

    #[test]
    fn skip_and_limit_pass_through() {
        let cursor = FinderOptions::new().skip(20).limit(10).to_cursor_options();
        assert_eq!(cursor.skip, Some(20));
        assert_eq!(cursor.limit, Some(10));
    }

    #[test]
    fn translation_is_deterministic() {
        let criteria = RawCriteria::<()>::new(doc! { "age": { "$gt": 21 } });
        let options = FinderOptions::new()
            .order("age desc, name")
            .unwrap()
            .skip(5)
            .limit(50)
            .fields(["name"]);

        let first = translate(&criteria, &options);
        let second = translate(&criteria, &options);
        assert_eq!(first, second);

        let (matcher, cursor) = first;
        assert_eq!(matcher, doc! { "age": { "$gt": 21 } });
        assert_eq!(cursor.sort, Some(doc! { "age": -1, "name": 1 }));
    }
}
