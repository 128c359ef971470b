use std::sync::Arc;

use common::metrics::{CounterName, CounterSink};
use tracing::{error, info, instrument, warn};

use super::domain::{CakeDto, CakeEntity, CakeRequest};
use super::mapper::{CakeMapper, DefaultCakeMapper};
use super::repository::{CakeRepository, CakeTransaction, TransactionalCakeRepository};
use crate::errors::ServiceError;

/// Cake business service: existence checks, mapping and operation counters
/// on top of a repository.
///
/// Repository errors are returned exactly as the repository produced them;
/// the only error this layer creates is [`ServiceError::NotFound`]. Counters
/// are bumped only when an operation succeeds.
pub struct CakeService<R: TransactionalCakeRepository, M: CakeMapper = DefaultCakeMapper> {
    repo: Arc<R>,
    mapper: M,
    counters: Arc<dyn CounterSink>,
}

impl<R: TransactionalCakeRepository> CakeService<R> {
    pub fn new(repo: Arc<R>, counters: Arc<dyn CounterSink>) -> Self {
        Self::with_mapper(repo, DefaultCakeMapper, counters)
    }
}

impl<R: TransactionalCakeRepository, M: CakeMapper> CakeService<R, M> {
    pub fn with_mapper(repo: Arc<R>, mapper: M, counters: Arc<dyn CounterSink>) -> Self {
        Self { repo, mapper, counters }
    }

    /// Every stored cake, in repository order.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CakeDto>, ServiceError> {
        let entities = self.repo.find_all().await?;
        self.counters.increment(CounterName::FindAll);
        Ok(entities.into_iter().map(|e| self.mapper.to_dto(e)).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: i32) -> Result<CakeDto, ServiceError> {
        let entity = self.repo.find_by_id(id).await?.ok_or_else(|| {
            warn!(cake_id = id, "unknown_cake_id");
            ServiceError::not_found("cake", id)
        })?;
        let dto = self.mapper.to_dto(entity);
        self.counters.increment(CounterName::FindById);
        Ok(dto)
    }

    /// Always inserts; there is no duplicate check.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use common::metrics::{CounterName, RecordingCounterSink};
    /// use service::cake::{CakeRequest, CakeService, repository::mock::MockCakeRepository};
    /// let counters = Arc::new(RecordingCounterSink::default());
    /// let svc = CakeService::new(Arc::new(MockCakeRepository::default()), counters.clone());
    /// let req = CakeRequest { name: "Bakewell tart".into(), description: None, image_url: None };
    /// let cake = tokio_test::block_on(svc.create(req)).unwrap();
    /// assert_eq!(cake.id, Some(1));
    /// assert_eq!(counters.count(CounterName::Save), 1);
    /// ```
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create(&self, request: CakeRequest) -> Result<CakeDto, ServiceError> {
        let entity = self.mapper.to_entity(request);
        let saved = self.repo.save(entity).await?;
        self.counters.increment(CounterName::Save);
        info!(cake_id = ?saved.id, "cake_created");
        Ok(self.mapper.to_dto(saved))
    }

    /// Full replace of the cake stored under `id`.
    ///
    /// The request is mapped into a brand new entity that takes over the old
    /// id, so any field the request leaves empty is cleared rather than kept.
    /// The existence check and the save share one transaction.
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: i32, request: CakeRequest) -> Result<CakeDto, ServiceError> {
        let tx = self.repo.begin().await?;
        let result = self.replace_in(&tx, id, request).await;
        let saved = finish(tx, result).await?;
        self.counters.increment(CounterName::Update);
        info!(cake_id = id, "cake_updated");
        Ok(self.mapper.to_dto(saved))
    }

    async fn replace_in(&self, tx: &R::Tx, id: i32, request: CakeRequest) -> Result<CakeEntity, ServiceError> {
        let old = tx.find_by_id(id).await?.ok_or_else(|| {
            warn!(cake_id = id, "cake_to_update_not_found");
            ServiceError::not_found("cake", id)
        })?;
        let mut replacement = self.mapper.to_entity(request);
        replacement.id = old.id;
        tx.save(replacement).await
    }

    /// Existence check and delete share one transaction.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let tx = self.repo.begin().await?;
        let result = delete_in(&tx, id).await;
        finish(tx, result).await?;
        self.counters.increment(CounterName::Delete);
        info!(cake_id = id, "cake_deleted");
        Ok(())
    }
}

async fn delete_in<T: CakeRepository>(tx: &T, id: i32) -> Result<(), ServiceError> {
    if !tx.exists_by_id(id).await? {
        warn!(cake_id = id, "cake_to_delete_not_found");
        return Err(ServiceError::not_found("cake", id));
    }
    tx.delete_by_id(id).await
}

/// Commit on success, roll back on failure. A failed rollback is logged and
/// the original error still wins.
async fn finish<T, X: CakeTransaction>(tx: X, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "transaction_rollback_failed");
            }
            Err(err)
        }
    }
}
