use sqlx::SqlitePool;
use crate::models::BonusRecord;

pub async fn fetch_by_code(pool: &SqlitePool, code: &str) -> Result<Vec<BonusRecord>, sqlx::Error> {
    sqlx::query_as::<_, BonusRecord>(
        "SELECT code, dateStr, codeName, bonusData, amount, stockDividend
         FROM stock_bonus_data
         WHERE code = ?1
         ORDER BY dateStr DESC",
    )
    .bind(code)
    .fetch_all(pool)
    .await
}

pub async fn insert_many(pool: &SqlitePool, items: &[BonusRecord]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for b in items {
        sqlx::query(
            "INSERT OR REPLACE INTO stock_bonus_data
             (code, dateStr, codeName, bonusData, amount, stockDividend)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&b.code)
        .bind(&b.date_str)
        .bind(&b.code_name)
        .bind(&b.bonus_data)
        .bind(b.amount)
        .bind(b.stock_dividend)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
