use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait,
};

use models::cake;

use crate::cake::domain::CakeEntity;
use crate::cake::repository::{CakeRepository, CakeTransaction, TransactionalCakeRepository};
use crate::errors::ServiceError;

/// SeaORM-backed repository over any connection: the pool, or an open
/// transaction handed out by [`TransactionalCakeRepository::begin`].
pub struct SeaOrmCakeRepository<C = DatabaseConnection> {
    pub db: C,
}

impl<C> SeaOrmCakeRepository<C> {
    pub fn new(db: C) -> Self { Self { db } }
}

#[async_trait::async_trait]
impl<C> CakeRepository for SeaOrmCakeRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn find_all(&self) -> Result<Vec<CakeEntity>, ServiceError> {
        let rows = cake::Entity::find()
            .order_by_asc(cake::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CakeEntity::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CakeEntity>, ServiceError> {
        let row = cake::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(CakeEntity::from))
    }

    async fn save(&self, entity: CakeEntity) -> Result<CakeEntity, ServiceError> {
        let am = cake::ActiveModel {
            id: entity.id.map_or(NotSet, Set),
            name: Set(entity.name),
            description: Set(entity.description),
            image_url: Set(entity.image_url),
        };
        let saved = match entity.id {
            Some(_) => am.update(&self.db).await?,
            None => am.insert(&self.db).await?,
        };
        Ok(saved.into())
    }

    async fn exists_by_id(&self, id: i32) -> Result<bool, ServiceError> {
        let n = cake::Entity::find_by_id(id).count(&self.db).await?;
        Ok(n > 0)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), ServiceError> {
        cake::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionalCakeRepository for SeaOrmCakeRepository<DatabaseConnection> {
    type Tx = SeaOrmCakeRepository<DatabaseTransaction>;

    async fn begin(&self) -> Result<Self::Tx, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| ServiceError::Transaction(e.to_string()))?;
        Ok(SeaOrmCakeRepository { db: txn })
    }
}

#[async_trait::async_trait]
impl CakeTransaction for SeaOrmCakeRepository<DatabaseTransaction> {
    async fn commit(self) -> Result<(), ServiceError> {
        self.db.commit().await.map_err(|e| ServiceError::Transaction(e.to_string()))
    }

    async fn rollback(self) -> Result<(), ServiceError> {
        self.db.rollback().await.map_err(|e| ServiceError::Transaction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    fn cake(name: &str) -> CakeEntity {
        CakeEntity { id: None, name: name.into(), description: Some(format!("{name} description")), image_url: None }
    }

    #[tokio::test]
    async fn save_inserts_then_replaces() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCakeRepository::new(get_db().await?);

        let created = repo.save(cake("Sachertorte")).await?;
        let id = created.id.unwrap();
        assert_eq!(created.description.as_deref(), Some("Sachertorte description"));

        let replaced = repo
            .save(CakeEntity { id: Some(id), name: "Sacher".into(), description: None, image_url: None })
            .await?;
        assert_eq!(replaced.id, Some(id));
        assert_eq!(replaced.description, None);

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found, replaced);
        Ok(())
    }

    #[tokio::test]
    async fn find_all_is_ordered_by_id() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCakeRepository::new(get_db().await?);
        assert!(repo.find_all().await?.is_empty());

        for name in ["Babka", "Apfelstrudel", "Clafoutis"] {
            repo.save(cake(name)).await?;
        }
        let names: Vec<_> = repo.find_all().await?.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Babka", "Apfelstrudel", "Clafoutis"]);
        Ok(())
    }

    #[tokio::test]
    async fn exists_and_delete() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCakeRepository::new(get_db().await?);
        let id = repo.save(cake("Pavlova")).await?.id.unwrap();

        assert!(repo.exists_by_id(id).await?);
        assert!(!repo.exists_by_id(id + 100).await?);

        repo.delete_by_id(id).await?;
        assert!(!repo.exists_by_id(id).await?);
        assert!(repo.find_by_id(id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn rollback_discards_and_commit_keeps() -> Result<(), anyhow::Error> {
        let repo = SeaOrmCakeRepository::new(get_db().await?);
        let id = repo.save(cake("Tiramisu")).await?.id.unwrap();

        let tx = repo.begin().await?;
        tx.delete_by_id(id).await?;
        assert!(!tx.exists_by_id(id).await?);
        tx.rollback().await?;
        assert!(repo.exists_by_id(id).await?);

        let tx = repo.begin().await?;
        tx.delete_by_id(id).await?;
        tx.commit().await?;
        assert!(!repo.exists_by_id(id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn backend_errors_surface_as_db_errors() -> Result<(), anyhow::Error> {
        // no migrations: the table is missing
        let cfg = configs::DatabaseConfig { url: "sqlite::memory:".into(), ..Default::default() };
        let repo = SeaOrmCakeRepository::new(models::db::connect_with_config(&cfg).await?);
        let err = repo.find_all().await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        Ok(())
    }
}
