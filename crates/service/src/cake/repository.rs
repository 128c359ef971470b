use async_trait::async_trait;

use super::domain::CakeEntity;
use crate::errors::ServiceError;

/// Repository abstraction for cake persistence.
#[async_trait]
pub trait CakeRepository: Send + Sync {
    /// All cakes in storage order.
    async fn find_all(&self) -> Result<Vec<CakeEntity>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<CakeEntity>, ServiceError>;
    /// Insert when `entity.id` is `None`, otherwise replace the whole row.
    async fn save(&self, entity: CakeEntity) -> Result<CakeEntity, ServiceError>;
    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError>;
    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError>;
}

/// An open unit of work. Dropping it without `commit` discards its writes.
#[async_trait]
pub trait CakeTransaction: Send {
    async fn commit(self) -> Result<(), ServiceError>;
    async fn rollback(self) -> Result<(), ServiceError>;
}

/// Repository able to open a transaction scope whose handle is itself a repository.
#[async_trait]
pub trait TransactionalCakeRepository: CakeRepository {
    type Tx: CakeRepository + CakeTransaction;

    async fn begin(&self) -> Result<Self::Tx, ServiceError>;
}

/// In-memory repository for tests, benches and doc examples.
///
/// Records every call and can be told to fail a given operation.
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, HashSet};
    use std::sync::{Arc, Mutex, MutexGuard};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum RepoCall {
        FindAll,
        FindById(i32),
        Save(CakeEntity),
        ExistsById(i32),
        DeleteById(i32),
        Begin,
        Commit,
        Rollback,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum RepoOp {
        FindAll,
        FindById,
        Save,
        ExistsById,
        DeleteById,
        Begin,
        Commit,
        Rollback,
    }

    #[derive(Default)]
    struct MockState {
        rows: BTreeMap<i32, CakeEntity>,
        last_id: i32,
        calls: Vec<RepoCall>,
        failing: HashSet<RepoOp>,
    }

    impl MockState {
        fn record(&mut self, call: RepoCall, op: RepoOp) -> Result<(), ServiceError> {
            self.calls.push(call);
            if self.failing.contains(&op) {
                return Err(ServiceError::Db(format!("injected {:?} failure", op)));
            }
            Ok(())
        }

        /// Insert or replace, returning the row id, the stored row and whatever
        /// it displaced.
        fn upsert(&mut self, entity: CakeEntity) -> (i32, CakeEntity, Option<CakeEntity>) {
            let id = match entity.id {
                Some(id) => id,
                None => self.last_id + 1,
            };
            self.last_id = self.last_id.max(id);
            let saved = CakeEntity { id: Some(id), ..entity };
            let prior = self.rows.insert(id, saved.clone());
            (id, saved, prior)
        }
    }

    #[derive(Default, Clone)]
    pub struct MockCakeRepository {
        state: Arc<Mutex<MockState>>,
    }

    impl MockCakeRepository {
        /// Seed with cakes; entities without an id get the next free one.
        pub fn with_cakes(cakes: impl IntoIterator<Item = CakeEntity>) -> Self {
            let repo = Self::default();
            {
                let mut st = repo.lock();
                for mut cake in cakes {
                    let id = match cake.id {
                        Some(id) => id,
                        None => st.last_id + 1,
                    };
                    st.last_id = st.last_id.max(id);
                    cake.id = Some(id);
                    st.rows.insert(id, cake);
                }
            }
            repo
        }

        pub fn fail_on(&self, op: RepoOp) {
            self.lock().failing.insert(op);
        }

        pub fn calls(&self) -> Vec<RepoCall> {
            self.lock().calls.clone()
        }

        pub fn clear_calls(&self) {
            self.lock().calls.clear();
        }

        pub fn rows(&self) -> Vec<CakeEntity> {
            self.lock().rows.values().cloned().collect()
        }

        fn lock(&self) -> MutexGuard<'_, MockState> {
            self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }
    }

    #[async_trait]
    impl CakeRepository for MockCakeRepository {
        async fn find_all(&self) -> Result<Vec<CakeEntity>, ServiceError> {
            let mut st = self.lock();
            st.record(RepoCall::FindAll, RepoOp::FindAll)?;
            Ok(st.rows.values().cloned().collect())
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<CakeEntity>, ServiceError> {
            let mut st = self.lock();
            st.record(RepoCall::FindById(id), RepoOp::FindById)?;
            Ok(st.rows.get(&id).cloned())
        }

        async fn save(&self, entity: CakeEntity) -> Result<CakeEntity, ServiceError> {
            let mut st = self.lock();
            st.record(RepoCall::Save(entity.clone()), RepoOp::Save)?;
            Ok(st.upsert(entity).1)
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
            let mut st = self.lock();
            st.record(RepoCall::ExistsById(id), RepoOp::ExistsById)?;
            Ok(st.rows.contains_key(&id))
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
            let mut st = self.lock();
            st.record(RepoCall::DeleteById(id), RepoOp::DeleteById)?;
            st.rows.remove(&id);
            Ok(())
        }
    }

    /// Writes go straight to the shared rows. The transaction remembers the
    /// first prior value of every row it touches, and rollback puts only those
    /// rows back, leaving writes made by other callers in place.
    pub struct MockCakeTransaction {
        repo: MockCakeRepository,
        last_id: i32,
        log: Mutex<UndoLog>,
    }

    #[derive(Default)]
    struct UndoLog {
        prior: BTreeMap<i32, Option<CakeEntity>>,
        highest_allocated: Option<i32>,
    }

    impl MockCakeTransaction {
        fn log(&self) -> MutexGuard<'_, UndoLog> {
            self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
        }

        fn undo(&self, st: &mut MockState) {
            let mut log = self.log();
            for (id, prior) in std::mem::take(&mut log.prior) {
                match prior {
                    Some(row) => st.rows.insert(id, row),
                    None => st.rows.remove(&id),
                };
            }
            // hand the ids back only if nobody allocated after us
            if log.highest_allocated == Some(st.last_id) {
                let highest_row = st.rows.keys().next_back().copied().unwrap_or(0);
                st.last_id = self.last_id.max(highest_row);
            }
        }
    }

    #[async_trait]
    impl TransactionalCakeRepository for MockCakeRepository {
        type Tx = MockCakeTransaction;

        async fn begin(&self) -> Result<MockCakeTransaction, ServiceError> {
            let mut st = self.lock();
            st.record(RepoCall::Begin, RepoOp::Begin)?;
            Ok(MockCakeTransaction { repo: self.clone(), last_id: st.last_id, log: Mutex::default() })
        }
    }

    #[async_trait]
    impl CakeRepository for MockCakeTransaction {
        async fn find_all(&self) -> Result<Vec<CakeEntity>, ServiceError> {
            self.repo.find_all().await
        }

        async fn find_by_id(&self, id: i32) -> Result<Option<CakeEntity>, ServiceError> {
            self.repo.find_by_id(id).await
        }

        async fn save(&self, entity: CakeEntity) -> Result<CakeEntity, ServiceError> {
            let mut st = self.repo.lock();
            st.record(RepoCall::Save(entity.clone()), RepoOp::Save)?;
            let fresh = entity.id.is_none();
            let (id, saved, prior) = st.upsert(entity);
            let mut log = self.log();
            log.prior.entry(id).or_insert(prior);
            if fresh {
                log.highest_allocated = Some(id);
            }
            Ok(saved)
        }

        async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
            self.repo.exists_by_id(id).await
        }

        async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
            let mut st = self.repo.lock();
            st.record(RepoCall::DeleteById(id), RepoOp::DeleteById)?;
            let prior = st.rows.remove(&id);
            self.log().prior.entry(id).or_insert(prior);
            Ok(())
        }
    }

    #[async_trait]
    impl CakeTransaction for MockCakeTransaction {
        async fn commit(self) -> Result<(), ServiceError> {
            let mut st = self.repo.lock();
            if let Err(e) = st.record(RepoCall::Commit, RepoOp::Commit) {
                self.undo(&mut st);
                return Err(ServiceError::Transaction(e.to_string()));
            }
            Ok(())
        }

        /// An injected rollback failure still discards the writes, as a real
        /// backend does when the connection is dropped.
        async fn rollback(self) -> Result<(), ServiceError> {
            let mut st = self.repo.lock();
            let recorded = st.record(RepoCall::Rollback, RepoOp::Rollback);
            self.undo(&mut st);
            recorded.map_err(|e| ServiceError::Transaction(e.to_string()))
        }
    }

}
