//! Remora is a typed `MongoDB` object-document mapper for Rust.
//!
//! Application structs declare themselves as MongoDB-backed models and gain
//! ActiveRecord-like finder, persistence, and bulk-update methods. Remora
//! translates typed method calls into the query and update documents the
//! driver consumes; everything else (wire protocol, pooling, cursors) stays
//! in the [`mongodb`] driver.
//!
//! ## Example
//!
//! ```ignore
//! // Define a model
//! #[derive(Serialize, Deserialize, Model)]
//! #[model(indexes(email), projections(Profile(id, email)))]
//! struct User {
//!   #[serde(rename = "_id")]
//!   id: ObjectId,
//!   email: String,
//!   username: String,
//!   karma: i64,
//! }
//!
//! // Select a model by id; a miss is `Error::NotFound`
//! let person: User = User::get(mongo, user_id).await?;
//!
//! // Select by custom fields
//! let veteran: Option<User> = User::find_one(mongo, user::criteria! {
//!   karma: Gt(&1000),
//! }).await?;
//!
//! // Finder options: sort clause, pagination, field projection
//! let page: Vec<User> = User::find_with(
//!   mongo,
//!   user::criteria! { karma: Gt(&0) },
//!   FinderOptions::new().order("karma desc, username")?.skip(20).limit(10),
//! ).await?;
//!
//! // The newest user; `last` without a sort order is a usage error
//! let newest: Option<User> = User::last(mongo, user::criteria! {},
//!   FinderOptions::new().order("karma asc")?).await?;
//!
//! // Insert, returning the record
//! let user = User::create(mongo, User { /* ... */ }).await?;
//!
//! // Upsert by id
//! user.save(mongo).await?;
//!
//! // Atomic modifiers
//! User::increment(mongo, by_id(user.id), user::Fields::Karma, 1).await?;
//!
//! // Delete the record backing an instance
//! user.remove(mongo).await?;
//! ```
//!
//! See the [`guides`] module to learn more!

#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::missing_errors_doc
)]

use futures_util::{FutureExt, TryStreamExt, future::BoxFuture};
use mongodb::{
    ClientSession, Collection, Database,
    bson::{self, Bson, Document, doc},
};
use serde::{Serialize, de::DeserializeOwned};
use std::{fmt::Display, marker::PhantomData, sync::LazyLock};

pub use inventory;
pub use mongodb;
pub use remora_macros::{Fields, Model, construct_criteria, construct_update};

pub mod criteria;
pub mod error;
pub mod guides;
pub mod meta;
pub mod modifiers;
pub mod validate;

pub use criteria::{CursorOptions, FinderOptions, Order, Sort, translate};
pub use error::{Error, Result};
pub use modifiers::{Modify, Pop};
pub use validate::{Validate, ValidationError, ValidationErrors};

/// A struct mapped to a `MongoDB` collection. Implemented via
/// `#[derive(Model)]`.
pub trait Model: RecordWithId<Self> + Serialize {
    type Id: Copy + Serialize + Send + Sync + 'static;

    type Fields: Display + Send + 'static;

    const COLLECTION_NAME: &'static str;

    fn collection(db: &Database) -> Collection<Self> {
        db.collection(Self::COLLECTION_NAME)
    }

    fn count<'a>(mongo: Mongo<'a>, criteria: impl Criteria<Self> + 'a) -> BoxFuture<'a, Result<u64>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            let count =
                with_session!(collection.count_documents(criteria.to_document()), session).await?;

            Ok(count)
        }
        .boxed()
    }

    fn exists<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
    ) -> BoxFuture<'a, Result<bool>> {
        async move {
            let count = Self::count(mongo, criteria).await?;

            Ok(count > 0)
        }
        .boxed()
    }

    fn insert<'a>(&'a self, mongo: Mongo<'a>) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(collection.insert_one(self), session).await?;

            Ok(())
        }
        .boxed()
    }

    fn insert_many<'a>(mongo: Mongo<'a>, models: &'a [Self]) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(collection.insert_many(models), session).await?;

            Ok(())
        }
        .boxed()
    }

    /// Inserts one record and hands it back.
    fn create(mongo: Mongo<'_>, model: Self) -> BoxFuture<'_, Result<Self>> {
        async move {
            model.insert(mongo).await?;

            Ok(model)
        }
        .boxed()
    }

    /// Inserts a batch and hands it back. The return shape follows the input
    /// arity: one record in, one record out of [`Model::create`]; a `Vec` in,
    /// a `Vec` out of here.
    fn create_many(mongo: Mongo<'_>, models: Vec<Self>) -> BoxFuture<'_, Result<Vec<Self>>> {
        async move {
            if models.is_empty() {
                return Ok(models);
            }

            Self::insert_many(mongo, &models).await?;

            Ok(models)
        }
        .boxed()
    }

    /// Validates, then inserts. Fails with [`Error::Validation`] before any
    /// data access.
    fn create_strict(mongo: Mongo<'_>, model: Self) -> BoxFuture<'_, Result<Self>>
    where
        Self: Validate,
    {
        async move {
            model.validate().map_err(Error::Validation)?;

            Self::create(mongo, model).await
        }
        .boxed()
    }

    /// Validates every record, then inserts the batch. No record is written
    /// if any of them is invalid.
    fn create_many_strict(mongo: Mongo<'_>, models: Vec<Self>) -> BoxFuture<'_, Result<Vec<Self>>>
    where
        Self: Validate,
    {
        async move {
            for model in &models {
                model.validate().map_err(Error::Validation)?;
            }

            Self::create_many(mongo, models).await
        }
        .boxed()
    }

    /// Upserts by id: replaces the stored document, inserting it if absent.
    fn save<'a>(&'a self, mongo: Mongo<'a>) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(
                collection
                    .replace_one(by_id::<Self>(self.id()).to_document(), self)
                    .upsert(true),
                session
            )
            .await?;

            Ok(())
        }
        .boxed()
    }

    fn save_strict<'a>(&'a self, mongo: Mongo<'a>) -> BoxFuture<'a, Result<()>>
    where
        Self: Validate,
    {
        async move {
            self.validate().map_err(Error::Validation)?;

            self.save(mongo).await
        }
        .boxed()
    }

    fn update<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        update: impl Update<Self> + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(
                collection.update_many(criteria.to_document(), update.to_document()),
                session
            )
            .await?;

            Ok(())
        }
        .boxed()
    }

    fn update_one<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        update: impl Update<Self> + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(
                collection.update_one(criteria.to_document(), update.to_document()),
                session
            )
            .await?;

            Ok(())
        }
        .boxed()
    }

    fn delete<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(collection.delete_many(criteria.to_document()), session).await?;

            Ok(())
        }
        .boxed()
    }

    fn delete_one<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = Self::collection(db);

            with_session!(collection.delete_one(criteria.to_document()), session).await?;

            Ok(())
        }
        .boxed()
    }

    fn increment<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        by: i64,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().inc(field, by))
    }

    fn decrement<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        by: i64,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().dec(field, by))
    }

    fn push<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        value: impl Serialize + Send + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().push(field, value))
    }

    fn push_all<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        values: impl Serialize + Send + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().push_all(field, values))
    }

    fn pull<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        value: impl Serialize + Send + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().pull(field, value))
    }

    fn pull_all<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        values: impl Serialize + Send + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().pull_all(field, values))
    }

    fn add_to_set<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        value: impl Serialize + Send + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().add_to_set(field, value))
    }

    fn pop<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<Self> + 'a,
        field: Self::Fields,
        pop: Pop,
    ) -> BoxFuture<'a, Result<()>> {
        Self::update(mongo, criteria, Modify::new().pop(field, pop))
    }
}

/// A read-side view of a model: either the model itself or a
/// `#[model(projections(...))]` struct carrying a subset of its fields.
pub trait Record<M: Model>: DeserializeOwned + Send + Sync + 'static {
    const FIELDS: Option<&'static [&'static str]>;

    fn projection_document() -> Option<Document> {
        static DOCUMENTS: LazyLock<dashmap::DashMap<&'static [&'static str], Document>> =
            LazyLock::new(dashmap::DashMap::new);

        Self::FIELDS.map(|fields| {
            if let Some(document) = DOCUMENTS.get(fields) {
                document.clone()
            } else {
                let mut has_id = false;
                let mut document = doc! {};

                for field in fields {
                    if *field == "_id" {
                        has_id = true;
                    } else {
                        document.insert(*field, 1);
                    }
                }

                if !has_id {
                    document.insert("_id", 0);
                }

                DOCUMENTS.insert(fields, document.clone());
                document
            }
        })
    }

    /// Runs a find with the full finder-options surface: sort, skip, limit,
    /// and an optional explicit field list. An explicit field list takes
    /// precedence over this record's own projection.
    fn find_with<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<M> + 'a,
        options: FinderOptions,
    ) -> BoxFuture<'a, Result<Vec<Self>>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = db.collection::<Self>(M::COLLECTION_NAME);

            let (matcher, cursor) = translate(&criteria, &options);

            let mut query = collection.find(matcher);

            if let Some(projection) = cursor.projection.or_else(Self::projection_document) {
                query = query.projection(projection);
            }

            if let Some(skip) = cursor.skip {
                query = query.skip(skip);
            }

            if let Some(limit) = cursor.limit {
                query = query.limit(limit);
            }

            if let Some(sort) = cursor.sort {
                query = query.sort(sort);
            }

            let records = match session {
                Some(session) => {
                    query
                        .session(&mut *session)
                        .await?
                        .stream(&mut *session)
                        .try_collect()
                        .await
                }
                None => query.await?.try_collect().await,
            }?;

            Ok(records)
        }
        .boxed()
    }

    fn find<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<M> + 'a,
    ) -> BoxFuture<'a, Result<Vec<Self>>> {
        Self::find_with(mongo, criteria, FinderOptions::new())
    }

    fn find_one<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<M> + 'a,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = db.collection::<Self>(M::COLLECTION_NAME);

            let mut query = collection.find_one(criteria.to_document());
            if let Some(projection) = Self::projection_document() {
                query = query.projection(projection);
            }

            let record = with_session!(query, session).await?;

            Ok(record)
        }
        .boxed()
    }

    /// The first record under the options' sort order.
    fn first<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<M> + 'a,
        options: FinderOptions,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        async move {
            let mut records = Self::find_with(mongo, criteria, options.limit(1)).await?;

            Ok(records.pop())
        }
        .boxed()
    }

    /// The last record under the options' sort order, fetched by inverting
    /// every sort key. Calling this without an explicit sort order is a usage
    /// error ([`Error::UnsortedLast`]), reported before any data access.
    fn last<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<M> + 'a,
        options: FinderOptions,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        async move {
            let inverted = match options.sort.as_ref().filter(|sort| !sort.is_empty()) {
                Some(sort) => sort.invert(),
                None => return Err(Error::UnsortedLast),
            };

            Self::first(mongo, criteria, options.sort(inverted)).await
        }
        .boxed()
    }

    /// Looks a record up by id; a miss is [`Error::NotFound`].
    fn get(mongo: Mongo<'_>, id: M::Id) -> BoxFuture<'_, Result<Self>> {
        async move {
            let record = Self::find_one(mongo, by_id::<M>(id)).await?;

            record.ok_or_else(|| Error::not_found(M::COLLECTION_NAME, 1, 0))
        }
        .boxed()
    }

    /// Strict multi-id lookup: requesting N distinct ids yields exactly N
    /// records, or fails with [`Error::NotFound`].
    fn get_many<'a>(mongo: Mongo<'a>, ids: &'a [M::Id]) -> BoxFuture<'a, Result<Vec<Self>>> {
        async move {
            let records = Self::find(mongo, by_ids::<M>(ids)).await?;

            strict_arity(M::COLLECTION_NAME, ids.len(), records)
        }
        .boxed()
    }

    fn find_one_and_update<'a>(
        mongo: Mongo<'a>,
        criteria: impl Criteria<M> + 'a,
        update: impl Update<M> + 'a,
    ) -> BoxFuture<'a, Result<Option<Self>>> {
        async move {
            let Mongo { db, session } = mongo;
            let collection = db.collection::<Self>(M::COLLECTION_NAME);

            let mut query =
                collection.find_one_and_update(criteria.to_document(), update.to_document());
            if let Some(projection) = Self::projection_document() {
                query = query.projection(projection);
            }

            let record = with_session!(query, session).await?;

            Ok(record)
        }
        .boxed()
    }
}

/// Strict lookups hand back all `expected` records or nothing.
fn strict_arity<T>(collection: &'static str, expected: usize, records: Vec<T>) -> Result<Vec<T>> {
    if records.len() == expected {
        Ok(records)
    } else {
        log::debug!(
            "strict lookup on `{collection}` matched {} of {expected} ids",
            records.len()
        );

        Err(Error::not_found(collection, expected, records.len()))
    }
}

pub trait RecordWithId<M: Model>: Record<M> {
    fn id(&self) -> M::Id;

    /// Applies an update to the stored document and to the struct in memory.
    fn patch<'a>(
        &'a mut self,
        mongo: Mongo<'a>,
        update: impl Update<M> + UpdateApply<Self> + 'a,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            M::update_one(mongo, by_id::<M>(self.id()), RawUpdate::new(update.to_document()))
                .await?;

            update.apply(self)?;

            Ok(())
        }
        .boxed()
    }

    /// Deletes the stored document backing this instance.
    fn remove<'a>(&'a self, mongo: Mongo<'a>) -> BoxFuture<'a, Result<()>> {
        async move {
            M::delete_one(mongo, by_id::<M>(self.id())).await?;

            Ok(())
        }
        .boxed()
    }
}

/// A database handle: a [`Database`] reference, optionally paired with a
/// [`ClientSession`]. Accepted by every Remora operation.
#[derive(Debug)]
pub struct Mongo<'a> {
    pub db: &'a Database,
    pub session: Option<&'a mut ClientSession>,
}

impl<'a> Mongo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db, session: None }
    }

    pub fn new_with_session(db: &'a Database, session: &'a mut ClientSession) -> Self {
        Self {
            db,
            session: Some(session),
        }
    }

    pub fn rb(&mut self) -> Mongo<'_> {
        Mongo {
            db: self.db,
            session: self.session.as_deref_mut(),
        }
    }
}

impl<'a> From<&'a Database> for Mongo<'a> {
    fn from(value: &'a Database) -> Self {
        Self::new(value)
    }
}

impl<'a> From<(&'a Database, &'a mut ClientSession)> for Mongo<'a> {
    fn from(value: (&'a Database, &'a mut ClientSession)) -> Self {
        Self::new_with_session(value.0, value.1)
    }
}

#[macro_export]
macro_rules! with_session {
    ($query: expr, $session: expr) => {
        match $session {
            Some(session) => $query.session(session),
            None => $query,
        }
    };
}

/// A query matcher for models of type `M`.
pub trait Criteria<M>: Send {
    fn to_document(&self) -> Document;
}

#[derive(Debug)]
pub struct ById<M: Model>(M::Id, PhantomData<M>);

pub fn by_id<M: Model>(id: M::Id) -> ById<M> {
    ById(id, PhantomData)
}

impl<M: Model> Criteria<M> for ById<M> {
    fn to_document(&self) -> Document {
        doc! { "_id": bson::to_bson(&self.0).unwrap() }
    }
}

#[derive(Debug)]
pub struct ByIds<'a, M: Model>(&'a [M::Id], PhantomData<M>);

pub fn by_ids<M: Model>(ids: &[M::Id]) -> ByIds<'_, M> {
    ByIds(ids, PhantomData)
}

impl<M: Model> Criteria<M> for ByIds<'_, M> {
    fn to_document(&self) -> Document {
        doc! { "_id": { "$in": bson::to_bson(&self.0).unwrap() } }
    }
}

/// Escape hatch: criteria from a raw BSON document.
#[derive(Debug)]
pub struct RawCriteria<M: Send>(Document, PhantomData<M>);

impl<M: Send> RawCriteria<M> {
    pub fn new(document: Document) -> Self {
        Self(document, PhantomData)
    }
}

impl<M: Send> Criteria<M> for RawCriteria<M> {
    fn to_document(&self) -> Document {
        self.0.clone()
    }
}

/// A `MongoDB` comparison operator applied to one field of a typed criteria
/// struct.
#[derive(Debug)]
pub enum Cmp<'a, T: Serialize + ?Sized> {
    Eq(&'a T),
    Ne(&'a T),
    Gt(&'a T),
    Gte(&'a T),
    Lt(&'a T),
    Lte(&'a T),
    In(&'a [&'a T]),
    Nin(&'a [&'a T]),
}

impl<T: Serialize + ?Sized> Cmp<'_, T> {
    pub fn to_document(&self) -> Document {
        fn to_bson<T: Serialize>(val: &T) -> Bson {
            bson::to_bson(val).unwrap()
        }

        let (operator, bson) = match self {
            Self::Eq(val) => ("$eq", to_bson(val)),
            Self::Ne(val) => ("$ne", to_bson(val)),
            Self::Gt(val) => ("$gt", to_bson(val)),
            Self::Gte(val) => ("$gte", to_bson(val)),
            Self::Lt(val) => ("$lt", to_bson(val)),
            Self::Lte(val) => ("$lte", to_bson(val)),
            Self::In(vals) => ("$in", to_bson(vals)),
            Self::Nin(vals) => ("$nin", to_bson(vals)),
        };

        doc! { operator: bson }
    }
}

/// A complete update document for models of type `M`, operators included.
/// Typed updates produce a `$set`; [`Modify`] produces whatever operators
/// were requested.
pub trait Update<M>: Send {
    fn to_document(&self) -> Document;
}

/// Escape hatch: an update from a raw BSON document.
#[derive(Debug)]
pub struct RawUpdate<M: Send>(Document, PhantomData<M>);

impl<M: Send> RawUpdate<M> {
    pub fn new(document: Document) -> Self {
        Self(document, PhantomData)
    }
}

impl<M: Send> Update<M> for RawUpdate<M> {
    fn to_document(&self) -> Document {
        self.0.clone()
    }
}

/// Mirrors an update onto an in-memory record; used by
/// [`RecordWithId::patch`].
pub trait UpdateApply<R> {
    fn apply(self, record: &mut R) -> Result<()>;
}

#[derive(Debug)]
pub struct RawUpdateApply<M: Model, R: Record<M>, F: Fn(&mut R) + Send>(
    Document,
    F,
    PhantomData<(M, R)>,
);

impl<M: Model, R: Record<M>, F: Fn(&mut R) + Send> RawUpdateApply<M, R, F> {
    pub fn new(document: Document, apply: F) -> Self {
        Self(document, apply, PhantomData)
    }
}

impl<M: Model, R: Record<M>, F: Fn(&mut R) + Send> Update<M> for RawUpdateApply<M, R, F> {
    fn to_document(&self) -> Document {
        self.0.clone()
    }
}

impl<M: Model, R: Record<M>, F: Fn(&mut R) + Send> UpdateApply<R> for RawUpdateApply<M, R, F> {
    fn apply(self, record: &mut R) -> Result<()> {
        self.1(record);
        Ok(())
    }
}

/// Optionality of one field in a typed criteria or update struct.
#[derive(Debug)]
pub enum Field<T> {
    Set(T),
    Omit,
}

impl<T> Field<T> {
    pub fn from_opt(opt: Option<T>) -> Self {
        match opt {
            Some(val) => Self::Set(val),
            None => Self::Omit,
        }
    }
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::Omit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, Model)]
    #[model(indexes(email), projections(Profile(id, email)))]
    struct User {
        #[serde(rename = "_id")]
        id: ObjectId,
        email: String,
        username: String,
        karma: i64,
    }

    impl Validate for User {
        fn validate(&self) -> std::result::Result<(), ValidationErrors> {
            let mut errors = ValidationErrors::new();

            if self.email.is_empty() {
                errors.add("email", "can't be blank");
            }

            errors.into_result()
        }
    }

    #[test]
    fn typed_criteria_build_operator_documents() {
        let criteria = user::criteria! {
            email: "mail@example.com",
            karma: Gt(&100),
        };

        assert_eq!(
            Criteria::<User>::to_document(&criteria),
            doc! {
                "email": { "$eq": "mail@example.com" },
                "karma": { "$gt": 100_i64 },
            }
        );
    }

    #[test]
    fn criteria_macro_defaults_to_eq() {
        let criteria = user::criteria! { username: "Kit" };

        assert_eq!(
            Criteria::<User>::to_document(&criteria),
            doc! { "username": { "$eq": "Kit" } }
        );
    }

    #[test]
    fn id_criteria_use_the_bson_key() {
        let id = ObjectId::new();

        let criteria = user::criteria! { id: Eq(&id) };

        assert_eq!(
            Criteria::<User>::to_document(&criteria),
            doc! { "_id": { "$eq": id } }
        );
    }

    #[test]
    fn by_id_matches_on_underscore_id() {
        let id = ObjectId::new();

        assert_eq!(by_id::<User>(id).to_document(), doc! { "_id": id });
    }

    #[test]
    fn by_ids_matches_with_in() {
        let ids = [ObjectId::new(), ObjectId::new()];

        assert_eq!(
            by_ids::<User>(&ids).to_document(),
            doc! { "_id": { "$in": [ids[0], ids[1]] } }
        );
    }

    #[test]
    fn typed_update_wraps_changes_in_set() {
        let update = user::update! { username: "K.I.".to_string() };

        assert_eq!(
            Update::<User>::to_document(&update),
            doc! { "$set": { "username": "K.I." } }
        );
    }

    #[test]
    fn empty_typed_update_produces_no_operators() {
        let update = user::TypedUpdate::default();

        assert_eq!(Update::<User>::to_document(&update), doc! {});
    }

    #[test]
    fn typed_update_applies_in_memory() {
        let mut record = User {
            id: ObjectId::new(),
            email: "mail@example.com".into(),
            username: "nikis05".into(),
            karma: 0,
        };

        let update = user::update! { karma: 42 };

        UpdateApply::apply(update, &mut record).unwrap();

        assert_eq!(record.karma, 42);
        assert_eq!(record.username, "nikis05");
    }

    #[test]
    fn raw_update_apply_mirrors_changes() {
        let mut record = User {
            id: ObjectId::new(),
            email: "mail@example.com".into(),
            username: "nikis05".into(),
            karma: 0,
        };

        let update = RawUpdateApply::new(doc! { "$inc": { "karma": 1 } }, |user: &mut User| {
            user.karma += 1;
        });

        assert_eq!(
            Update::<User>::to_document(&update),
            doc! { "$inc": { "karma": 1 } }
        );

        UpdateApply::apply(update, &mut record).unwrap();

        assert_eq!(record.karma, 1);
    }

    #[test]
    fn fields_enum_displays_bson_names() {
        assert_eq!(user::Fields::Id.to_string(), "_id");
        assert_eq!(user::Fields::Email.to_string(), "email");
        assert_eq!(user::Fields::Karma.to_string(), "karma");
    }

    #[test]
    fn model_itself_projects_nothing() {
        assert_eq!(<User as Record<User>>::FIELDS, None);
        assert_eq!(<User as Record<User>>::projection_document(), None);
    }

    #[test]
    fn projection_includes_fields_and_keeps_id() {
        assert_eq!(
            <user::Profile as Record<User>>::FIELDS,
            Some(["_id", "email"].as_slice())
        );

        assert_eq!(
            <user::Profile as Record<User>>::projection_document(),
            Some(doc! { "email": 1 })
        );
    }

    #[test]
    fn modifiers_accept_the_fields_enum() {
        let modify = Modify::new().inc(user::Fields::Karma, 1);

        assert_eq!(
            Update::<User>::to_document(&modify),
            doc! { "$inc": { "karma": 1_i64 } }
        );
    }

    #[test]
    fn sort_builder_accepts_the_fields_enum() {
        let sort = Sort::new().desc(user::Fields::Karma).asc(user::Fields::Email);

        assert_eq!(sort.to_document(), doc! { "karma": -1, "email": 1 });
    }

    #[test]
    fn strict_lookups_demand_every_id() {
        let complete = strict_arity("user", 2, vec!["a", "b"]).unwrap();
        assert_eq!(complete, vec!["a", "b"]);

        let err = strict_arity("user", 3, vec!["a"]).unwrap_err();
        assert!(matches!(
            err,
            Error::NotFound {
                collection: "user",
                expected: 3,
                found: 1
            }
        ));
    }

    #[allow(dead_code)]
    #[derive(Fields, Serialize)]
    struct AuditEntry {
        #[serde(rename = "who")]
        actor: String,
        action: String,
    }

    #[test]
    fn fields_derive_works_without_a_model() {
        assert_eq!(audit_entry::Fields::Actor.to_string(), "who");
        assert_eq!(audit_entry::Fields::Action.to_string(), "action");
    }

    #[test]
    fn metadata_registers_collection_and_indexes() {
        let metadata = meta::model_metadata()
            .find(|metadata| metadata.collection_name() == User::COLLECTION_NAME)
            .unwrap();

        assert_eq!(metadata.collection_name(), "user");

        let indexes = metadata.indexes();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].keys, doc! { "email": 1 });
    }

    // No server is listening; these operations must fail before any data
    // access, so a lazily-connecting client is enough.
    fn detached_db() -> Database {
        let client = mongodb::Client::with_options(mongodb::options::ClientOptions::default())
            .unwrap();

        client.database("remora_test")
    }

    #[tokio::test]
    async fn last_without_sort_is_a_usage_error() {
        let db = detached_db();

        let result = User::last(Mongo::new(&db), user::criteria! {}, FinderOptions::new()).await;

        assert!(matches!(result, Err(Error::UnsortedLast)));
    }

    #[tokio::test]
    async fn last_with_empty_sort_is_a_usage_error() {
        let db = detached_db();

        let result = User::last(
            Mongo::new(&db),
            user::criteria! {},
            FinderOptions::new().sort(Sort::new()),
        )
        .await;

        assert!(matches!(result, Err(Error::UnsortedLast)));
    }

    #[tokio::test]
    async fn strict_create_rejects_invalid_records_before_data_access() {
        let db = detached_db();

        let invalid = User {
            id: ObjectId::new(),
            email: String::new(),
            username: "nikis05".into(),
            karma: 0,
        };

        let result = User::create_strict(Mongo::new(&db), invalid).await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn validation_gates_strict_saves() {
        let record = User {
            id: ObjectId::new(),
            email: String::new(),
            username: "nikis05".into(),
            karma: 0,
        };

        let errors = record.validate().unwrap_err();
        let err = Error::Validation(errors);

        assert_eq!(err.to_string(), "validation failed: email can't be blank");
    }
}
