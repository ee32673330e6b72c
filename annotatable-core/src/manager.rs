use crate::{
    collection::Collection,
    error::Result,
    query::{
        annotate::Annotator,
        filtering::Predicate,
        key::{Annotation, KeySpec},
    },
};
use async_trait::async_trait;

type RecordOf<M> = <<M as Manager>::Collection as Collection>::Record;

/// Entry point for "all records of a kind".
///
/// Every operation starts from [`Manager::all`] and forwards to the
/// collection-level operation of the same name.
#[async_trait]
pub trait Manager: Send + Sync {
    type Collection: Collection;

    /// The full, unfiltered collection.
    fn all(&self) -> Self::Collection;

    fn annotator(&self) -> Annotator {
        Annotator::default()
    }

    async fn sort<K>(&self, key: K, reverse: bool) -> Result<Self::Collection>
    where
        K: Into<KeySpec<RecordOf<Self>>> + Send,
    {
        self.annotator().sort(&self.all(), key, reverse).await
    }

    async fn annotate_property<A>(
        &self,
        annotation: A,
        name: Option<&str>,
    ) -> Result<Self::Collection>
    where
        A: Into<Annotation<RecordOf<Self>>> + Send,
    {
        self.annotator()
            .annotate_property(&self.all(), annotation, name)
            .await
    }

    fn filter(&self, predicate: Predicate) -> Result<Self::Collection> {
        self.all().filter(predicate)
    }
}
