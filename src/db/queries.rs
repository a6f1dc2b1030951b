use crate::models::{CartItem, Product};
use sqlx::PgPool;

const PRODUCT_COLUMNS: &str = r#"
    product_id::BIGINT AS product_id,
    product_name,
    description,
    category,
    price::NUMERIC AS price,
    stock_quantity::BIGINT AS stock_quantity,
    unit,
    brand,
    image_url,
    COALESCE(synonyms, '{}'::TEXT[]) AS synonyms
"#;

/// 查询全部商品（按ID升序，保证索引构建顺序稳定）
pub async fn list_products(pool: &PgPool) -> Result<Vec<Product>, sqlx::Error> {
    let sql = format!("SELECT {} FROM products ORDER BY product_id", PRODUCT_COLUMNS);
    sqlx::query_as::<_, Product>(&sql).fetch_all(pool).await
}

/// 查询单个商品
pub async fn get_product(pool: &PgPool, product_id: i64) -> Result<Option<Product>, sqlx::Error> {
    let sql = format!("SELECT {} FROM products WHERE product_id = $1", PRODUCT_COLUMNS);
    sqlx::query_as::<_, Product>(&sql)
        .bind(product_id)
        .fetch_optional(pool)
        .await
}

/// 插入一行购物车记录
pub async fn insert_cart_item(
    pool: &PgPool,
    user_id: i64,
    product_id: i64,
    quantity: i64,
) -> Result<CartItem, sqlx::Error> {
    sqlx::query_as::<_, CartItem>(
        r#"
        INSERT INTO cart (user_id, product_id, quantity, added_at)
        VALUES ($1, $2, $3, now())
        RETURNING cart_id::BIGINT AS cart_id,
                  user_id::BIGINT AS user_id,
                  product_id::BIGINT AS product_id,
                  quantity::BIGINT AS quantity,
                  added_at
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_one(pool)
    .await
}

/// 查询用户购物车
pub async fn list_cart_items(pool: &PgPool, user_id: i64) -> Result<Vec<CartItem>, sqlx::Error> {
    sqlx::query_as::<_, CartItem>(
        r#"
        SELECT cart_id::BIGINT AS cart_id,
               user_id::BIGINT AS user_id,
               product_id::BIGINT AS product_id,
               quantity::BIGINT AS quantity,
               added_at
        FROM cart
        WHERE user_id = $1
        ORDER BY cart_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// 删除购物车行，返回受影响行数
pub async fn delete_cart_item(pool: &PgPool, cart_id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM cart WHERE cart_id = $1")
        .bind(cart_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
