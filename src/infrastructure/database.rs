use crate::entities::{application_files, applications, departments, payments, teachers, users};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::env;
use std::time::Duration;
use tracing::info;

pub async fn setup_database() -> anyhow::Result<DatabaseConnection> {
    let db_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    info!("📂 Database: {}", db_url);

    let mut opt = ConnectOptions::new(&db_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db).await?;

    crate::infrastructure::seed::seed_initial_data(&db).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection) -> anyhow::Result<()> {
    let db_url = env::var("DATABASE_URL")?;

    if db_url.starts_with("postgres://") {
        info!("🔄 Running SQLx migrations for PostgreSQL...");
        let pool = sqlx::PgPool::connect(&db_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
    } else {
        info!("🔄 Running SeaORM auto-migrations for SQLite/Other...");
        let builder = db.get_database_backend();
        let schema = Schema::new(builder);

        let stmts = vec![
            schema
                .create_table_from_entity(users::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(departments::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(teachers::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(applications::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(application_files::Entity)
                .if_not_exists()
                .to_owned(),
            schema
                .create_table_from_entity(payments::Entity)
                .if_not_exists()
                .to_owned(),
        ];

        for stmt in stmts {
            let stmt = builder.build(&stmt);
            db.execute(stmt).await?;
        }
    }

    Ok(())
}
