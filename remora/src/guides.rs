/// ## Getting started
///
/// The [`Model`](crate::Model) trait maps a Rust type to a `MongoDB`
/// collection, providing a type-safe interface for inserting, querying,
/// updating, and deleting documents.
///
/// A type that derives [`Model`](crate::Model) must:
/// - be a struct with named fields
/// - implement [`Serialize`](serde::Serialize) and [`Deserialize`](serde::Deserialize)
/// - have a field named `id`, annotated with `#[serde(rename = "_id")]`
///
/// ### Example
///
/// ```ignore
/// use serde::{Serialize, Deserialize};
/// use remora::Model;
/// use mongodb::bson::oid::ObjectId;
///
/// #[derive(Serialize, Deserialize, Model)]
/// struct User {
///   #[serde(rename = "_id")]
///   id: ObjectId,
///   name: String,
///   password: String,
/// }
/// ```
///
/// By default, the collection name is the lowercase form of the struct name
/// (`User` → `user`). Override it with `#[model(collection = "custom_name")]`.
/// Single-field ascending indexes can be declared with
/// `#[model(indexes(name, ...))]` and created at startup through
/// [`meta::enforce_indexes`](crate::meta::enforce_indexes).
///
/// ### Creating `Mongo`
///
/// [`Mongo`](crate::Mongo) is a lightweight wrapper around a reference to
/// [`mongodb::Database`](mongodb::Database), optionally paired with a mutable
/// reference to a [`mongodb::ClientSession`](mongodb::ClientSession). It is
/// accepted by all Remora operations and can be created from a
/// [`Database`](mongodb::Database) instance:
///
/// ```ignore
/// let client = Client::with_uri_str("mongodb://example.com").await?;
/// let db = client.database("mydb");
/// let mongo: Mongo = (&db).into();
/// user.insert(mongo).await?;
/// ```
///
/// ### Method overview
///
/// | Method                        | Description                                            | Corresponding MongoDB query                                      |
/// |-------------------------------|--------------------------------------------------------|------------------------------------------------------------------|
/// | `Model::insert`               | Inserts a new record.                                  | `db.user.insertOne({ ... })`                                     |
/// | `Model::insert_many`          | Inserts a batch of records.                            | `db.user.insertMany([...])`                                      |
/// | `Model::create` / `create_many` | Insert and hand the record(s) back.                  | `db.user.insertOne(...)` / `insertMany(...)`                     |
/// | `Model::save`                 | Upserts the record by id.                              | `db.user.replaceOne({ _id: id }, { ... }, { upsert: true })`     |
/// | `Model::count` / `exists`     | Counts records matching criteria.                      | `db.user.count({ ... })`                                         |
/// | `Record::find`                | Finds records matching criteria.                       | `db.user.find({ ... })`                                          |
/// | `Record::find_with`           | Finds with sort, skip, limit, and field projection.    | `db.user.find({ ... }).sort(...).skip(n).limit(n)`               |
/// | `Record::find_one`            | Finds a single record.                                 | `db.user.findOne({ ... })`                                       |
/// | `Record::first` / `last`      | First/last record under the options' sort order.       | `db.user.find({ ... }).sort(...).limit(1)`                       |
/// | `Record::get`                 | Looks a record up by id; a miss is an error.           | `db.user.findOne({ _id: { $eq: id } })`                          |
/// | `Record::get_many`            | Strict multi-id lookup: all N ids must match.          | `db.user.find({ _id: { $in: [...] } })`                          |
/// | `Model::update` / `update_one`| Applies an update document to matching records.        | `db.user.updateMany({ ... }, { ... })`                           |
/// | `Model::increment`, `push`, ...| Atomic modifier forwarders.                           | `db.user.updateMany({ ... }, { $inc: { ... } })`                 |
/// | `RecordWithId::patch`         | Updates the stored document and the struct in memory.  | `db.user.updateOne({ _id: { $eq: id } }, { ... })`               |
/// | `Model::delete` / `delete_one`| Deletes matching records.                              | `db.user.deleteMany({ ... })`                                    |
/// | `RecordWithId::remove`        | Deletes the record backing an instance.                | `db.user.deleteOne({ _id: { $eq: id } })`                        |
mod getting_started {}

/// Remora gives you a type-safe way to build `MongoDB` criteria and update
/// documents for your models, without writing raw BSON by hand.
///
/// ### Helper module
///
/// Every model defined with `#[derive(Model)]` gets a helper module named
/// after it (in `snake_case`). For a model named `User`, the module is
/// `user`, containing:
/// - `TypedCriteria` — a type-safe `MongoDB` matcher document builder
/// - `TypedUpdate` — a type-safe `$set` update builder
/// - `Fields` — an enum of the model's BSON field names
/// - `criteria!` and `update!` construction macros
///
/// Each field of `TypedCriteria` and `TypedUpdate` is wrapped to represent
/// optionality and matcher semantics:
/// - [`Field::Set(value)`](crate::Field::Set) includes the field;
///   [`Field::Omit`](crate::Field::Omit) leaves it out entirely.
/// - [`Cmp`](crate::Cmp) is the comparison operator applied to a criteria
///   field: `Eq`, `Ne`, `Gt`, `Gte`, `Lt`, `Lte`, `In`, `Nin`.
///
/// The `criteria!` macro defaults bare values to `Eq`:
///
/// ```ignore
/// let veterans = User::find(mongo, user::criteria! {
///     karma: Gte(&1000),
///     username: "Kit",
/// }).await?;
/// ```
///
/// Equivalent `MongoDB` query:
///
/// ```text
/// db.user.find({ karma: { $gte: 1000 }, username: { $eq: "Kit" } })
/// ```
///
/// ### Finder options
///
/// [`FinderOptions`](crate::FinderOptions) carries the sort, pagination, and
/// field-projection directives of a finder call, and is lowered to the
/// driver's cursor options by the
/// [`criteria` translator](crate::criteria::translate). Sort orders can be
/// built programmatically or parsed from a clause string of comma-separated
/// `field [asc|desc]` tokens (direction defaults to ascending):
///
/// ```ignore
/// let page = User::find_with(
///     mongo,
///     user::criteria! { karma: Gt(&0) },
///     FinderOptions::new()
///         .order("karma desc, username")?
///         .skip(20)
///         .limit(10)
///         .fields(["username", "karma"]),
/// ).await?;
/// ```
///
/// [`Record::last`](crate::Record::last) fetches the final record of an
/// ordering by inverting every sort key and taking the first result. Calling
/// it without an explicit sort order is a usage error reported before any
/// data access.
///
/// ### Raw criteria and updates
///
/// Advanced operators not covered by the typed API (`$elemMatch`, `$slice`,
/// computed expressions) remain reachable through
/// [`RawCriteria`](crate::RawCriteria) and [`RawUpdate`](crate::RawUpdate):
///
/// ```ignore
/// let criteria = RawCriteria::new(bson::doc! {
///     user::Fields::Username.to_string(): { "$regex": "^Kit" }
/// });
/// ```
///
/// Prefer the `Fields` enum over string literals when writing raw BSON; field
/// names stay compiler-checked and follow `#[serde(rename = "...")]`.
mod criteria_and_options {}

/// Update operators beyond `$set` are built with
/// [`Modify`](crate::Modify), either directly or through the one-line
/// forwarders on [`Model`](crate::Model):
///
/// ```ignore
/// // Forwarder form
/// User::increment(mongo, by_id(user_id), user::Fields::Karma, 1).await?;
///
/// // Builder form, mixing operators in one update
/// User::update(mongo, user::criteria! { username: "Kit" },
///     Modify::new()
///         .push_all(user::Fields::Badges, ["founder", "veteran"])
///         .unset(user::Fields::LegacyFlag),
/// ).await?;
/// ```
///
/// Available builders: `inc`, `dec`, `push`, `push_all` (`$push`/`$each`),
/// `pull`, `pull_all`, `add_to_set`, `pop` ([`Pop::First`](crate::Pop) /
/// [`Pop::Last`](crate::Pop)), `set`, `unset`. Repeated uses of the same
/// operator merge into one operator sub-document.
///
/// To mirror a raw update onto the in-memory struct, use
/// [`RecordWithId::patch`](crate::RecordWithId::patch) with
/// [`RawUpdateApply`](crate::RawUpdateApply): a BSON update document plus a
/// closure applying the same change locally.
///
/// ```ignore
/// post.patch(mongo, RawUpdateApply::new(
///     doc! { "$pop": { "comments": 1 } },
///     |p: &mut Post| { p.comments.pop(); },
/// )).await?;
/// ```
mod modifiers_and_patches {}

/// Models can opt into application-level validation by implementing
/// [`Validate`](crate::Validate). The strict persistence operations —
/// [`save_strict`](crate::Model::save_strict),
/// [`create_strict`](crate::Model::create_strict),
/// [`create_many_strict`](crate::Model::create_many_strict) — run validation
/// first and fail with [`Error::Validation`](crate::Error::Validation)
/// before touching the database. The non-strict counterparts skip validation
/// entirely.
///
/// ```ignore
/// impl Validate for User {
///     fn validate(&self) -> Result<(), ValidationErrors> {
///         let mut errors = ValidationErrors::new();
///
///         if self.email.is_empty() {
///             errors.add("email", "can't be blank");
///         }
///
///         errors.into_result()
///     }
/// }
///
/// User::create_strict(mongo, user).await?; // Err(Error::Validation) when invalid
/// ```
mod validation {}

/// Derived read-side views of a model are declared with
/// `#[model(projections(...))]`:
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Model)]
/// #[model(projections(Profile(id, email)))]
/// struct User { /* ... */ }
///
/// let profile: Option<user::Profile> = user::Profile::find_one(mongo, by_id(id)).await?;
/// ```
///
/// A projection only fetches the fields it declares; `_id` is excluded from
/// the wire projection unless `id` is listed. Projections that include `id`
/// also implement [`RecordWithId`](crate::RecordWithId) and support `patch`
/// and `remove`. Ad-hoc field lists on a single call go through
/// [`FinderOptions::fields`](crate::FinderOptions::fields) instead, which
/// takes precedence over the record's own projection.
mod projections {}

/// This library is named "Remora" after the fish that travels attached to a
/// larger host. The MongoDB driver does the swimming.
mod naming {}
