use crate::errors::Result;
use crate::models::users::{entities::UserRole, requests::NewUser};
use crate::storage::Storage;
use crate::utils::{password::hash_password, random_code::generate_initial_password};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@edusystem.local";

/// 用户表为空时创建初始管理员
///
/// 密码取自 `ADMIN_PASSWORD`，未设置时随机生成并只在日志中出现一次。
/// 返回是否创建了账号。
pub async fn seed_admin(storage: &dyn Storage) -> Result<bool> {
    if storage.count_users().await? > 0 {
        return Ok(false);
    }

    let (password, generated) = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) if !password.trim().is_empty() => (password, false),
        _ => (generate_initial_password(), true),
    };

    let admin = storage
        .create_user(NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            email: DEFAULT_ADMIN_EMAIL.to_string(),
            password_hash: hash_password(&password)?,
            role: UserRole::Admin,
            display_name: Some("Administrator".to_string()),
            avatar_url: None,
            department_id: None,
        })
        .await?;

    if generated {
        tracing::warn!(
            "Created initial admin account '{}' with password: {} (change it after first login)",
            admin.username,
            password
        );
    } else {
        tracing::info!(
            "Created initial admin account '{}' from ADMIN_PASSWORD",
            admin.username
        );
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::test_support;

    #[tokio::test]
    async fn test_seed_only_on_empty_table() {
        let storage = test_support::storage().await;
        assert!(seed_admin(&storage).await.unwrap());
        assert!(!seed_admin(&storage).await.unwrap());

        let admin = storage
            .get_user_by_username_or_email(DEFAULT_ADMIN_USERNAME)
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
        assert_eq!(storage.count_users().await.unwrap(), 1);
    }
}
