//! End-to-end test against a real MySQL server.
//!
//! Requires `DATABASE_URL` (a `mysql://` URL, loadable from `.env`); run with
//! `cargo test -- --ignored`.

use myorm::qb::{self, MutationQb, SqlQb};
use myorm::{Database, FromRow, Model};

#[derive(Debug, FromRow, Model)]
#[orm(table = "myorm_smoke")]
struct Smoke {
    #[orm(primary_key, auto_increment)]
    id: i64,
    label: String,
}

#[tokio::test]
#[ignore = "needs a MySQL server and DATABASE_URL"]
async fn round_trip() -> myorm::OrmResult<()> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let db = Database::connect(&url)?;

    qb::create_table_for::<Smoke>()
        .if_not_exists()
        .execute(&db)
        .await?;
    qb::delete("myorm_smoke")
        .allow_delete_all(true)
        .execute(&db)
        .await?;

    let inserted = qb::insert("myorm_smoke")
        .set("label", "first")
        .execute(&db)
        .await?;
    assert_eq!(inserted, 1);

    let rows: Vec<Smoke> = qb::select("myorm_smoke").fetch_all(&db).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "first");

    let updated = qb::update("myorm_smoke")
        .set("label", "second")
        .eq("id", rows[0].id)
        .execute(&db)
        .await?;
    assert_eq!(updated, 1);

    let row: Smoke = qb::select("myorm_smoke")
        .eq("id", rows[0].id)
        .fetch_one(&db)
        .await?;
    assert_eq!(row.label, "second");

    db.disconnect().await
}
