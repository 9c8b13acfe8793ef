//! First-run bootstrap
//!
//! Runs at every startup; each step only writes when its table is empty,
//! so an existing installation is left untouched.

use shared::models::{PaymentMethodCreate, ROLE_ADMIN};
use sqlx::SqlitePool;

use crate::auth::hash_password;
use crate::core::Config;
use crate::db::repository::{payment_method, role_permission, settings, user};
use crate::utils::{AppError, AppResult};

const DEFAULT_PAYMENT_METHODS: [&str; 4] = ["Cash", "Credit Card", "Debit Card", "Digital Wallet"];

pub async fn run(pool: &SqlitePool, config: &Config) -> AppResult<()> {
    seed_admin_user(pool, config).await?;
    seed_payment_methods(pool).await?;
    seed_role_permissions(pool).await?;

    // Settings singleton exists from the first boot
    settings::get_or_create(pool).await?;

    Ok(())
}

/// Create the initial admin account when no users exist.
async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> AppResult<()> {
    if user::count(pool).await? > 0 {
        return Ok(());
    }

    let password_hash = hash_password(&config.admin_password)
        .map_err(|e| AppError::internal(format!("Failed to hash admin password: {e}")))?;
    let admin = user::create(pool, "Admin", &config.admin_email, &password_hash, ROLE_ADMIN).await?;

    tracing::info!(email = %admin.email, "Created initial admin user");
    Ok(())
}

async fn seed_payment_methods(pool: &SqlitePool) -> AppResult<()> {
    if !payment_method::find_all(pool).await?.is_empty() {
        return Ok(());
    }

    for name in DEFAULT_PAYMENT_METHODS {
        payment_method::create(
            pool,
            PaymentMethodCreate {
                name: name.into(),
                enabled: true,
            },
        )
        .await?;
    }

    tracing::info!("Seeded default payment methods");
    Ok(())
}

async fn seed_role_permissions(pool: &SqlitePool) -> AppResult<()> {
    if role_permission::count(pool).await? > 0 {
        return Ok(());
    }

    role_permission::seed_defaults(pool).await?;
    tracing::info!("Seeded default role permissions");
    Ok(())
}
