use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{Barber, ServiceOffering};
use crate::error::StoreError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list_barbers(&self) -> Result<Vec<Barber>, StoreError>;
    async fn list_services(&self) -> Result<Vec<ServiceOffering>, StoreError>;
    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceOffering>, StoreError>;
}

#[derive(Clone)]
pub struct PgCatalogRepository {
    db: PgPool,
}

impl PgCatalogRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    async fn list_barbers(&self) -> Result<Vec<Barber>, StoreError> {
        let rows = sqlx::query_as::<_, Barber>(
            r#"
            SELECT id, name, active
              FROM barbers
             WHERE active
             ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn list_services(&self) -> Result<Vec<ServiceOffering>, StoreError> {
        let rows = sqlx::query_as::<_, ServiceOffering>(
            r#"
            SELECT id, name, price, duration_minutes
              FROM services
             ORDER BY price ASC, name ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn find_service(&self, id: Uuid) -> Result<Option<ServiceOffering>, StoreError> {
        let row = sqlx::query_as::<_, ServiceOffering>(
            "SELECT id, name, price, duration_minutes FROM services WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }
}
