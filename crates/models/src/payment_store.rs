use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::errors::{db_err, ModelError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_store")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub store_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Payment,
    Store,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Payment => Entity::belongs_to(crate::payment::Entity)
                .from(Column::PaymentId)
                .to(crate::payment::Column::Id)
                .into(),
            Relation::Store => Entity::belongs_to(crate::store::Entity)
                .from(Column::StoreId)
                .to(crate::store::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn link<C: ConnectionTrait>(db: &C, payment_id: i64, store_ids: &[i64]) -> Result<(), ModelError> {
    if store_ids.is_empty() {
        return Ok(());
    }
    let mut ids = store_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    let rows = ids.into_iter().map(|store_id| ActiveModel { payment_id: Set(payment_id), store_id: Set(store_id) });
    Entity::insert_many(rows).exec(db).await.map_err(db_err)?;
    Ok(())
}

pub async fn store_ids<C: ConnectionTrait>(db: &C, payment_id: i64) -> Result<Vec<i64>, ModelError> {
    let rows = Entity::find()
        .filter(Column::PaymentId.eq(payment_id))
        .all(db)
        .await
        .map_err(db_err)?;
    Ok(rows.into_iter().map(|r| r.store_id).collect())
}
