// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::infrastructure::database::entities::{brand, category, country, product};
use sea_orm::sea_query::TableCreateStatement;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

fn create_table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    stmt
}

/// 创建缺失的目录表
///
/// 已存在的表保持不变
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let statements = [
        create_table(&schema, country::Entity),
        create_table(&schema, brand::Entity),
        create_table(&schema, category::Entity),
        create_table(&schema, product::Entity),
    ];
    for stmt in &statements {
        db.execute(backend.build(stmt)).await?;
    }

    info!("Catalog schema ready");
    Ok(())
}
