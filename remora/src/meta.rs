use crate::{Mongo, error::Result};
use log::debug;
use mongodb::{IndexModel, bson::Document};

#[doc(hidden)]
pub struct ModelMetadataWrapper(pub ModelMetadata);

inventory::collect!(ModelMetadataWrapper);

/// Per-model registry entry collected at link time: the collection a model
/// maps to and the indexes declared on it via `#[model(indexes(...))]`.
pub struct ModelMetadata {
    collection_name: &'static str,
    indexes_ptr: fn() -> &'static [IndexModel],
}

impl ModelMetadata {
    #[doc(hidden)]
    pub const fn new(
        collection_name: &'static str,
        indexes_ptr: fn() -> &'static [IndexModel],
    ) -> Self {
        Self {
            collection_name,
            indexes_ptr,
        }
    }

    pub fn collection_name(&self) -> &'static str {
        self.collection_name
    }

    pub fn indexes(&self) -> &'static [IndexModel] {
        (self.indexes_ptr)()
    }
}

pub fn model_metadata() -> impl Iterator<Item = &'static ModelMetadata> {
    inventory::iter::<ModelMetadataWrapper>
        .into_iter()
        .map(|wrapper| &wrapper.0)
}

/// Creates every declared index through the driver. Typically called once at
/// application startup.
pub async fn enforce_indexes(mongo: Mongo<'_>) -> Result<()> {
    for metadata in model_metadata() {
        let indexes = metadata.indexes();

        if indexes.is_empty() {
            continue;
        }

        debug!(
            "creating {} index(es) on `{}`",
            indexes.len(),
            metadata.collection_name()
        );

        mongo
            .db
            .collection::<Document>(metadata.collection_name())
            .create_indexes(indexes.iter().cloned())
            .await?;
    }

    Ok(())
}
