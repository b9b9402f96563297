use crate::config::AppConfig;
use crate::errors::PortalError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnpqrstuvwxyz23456789";

fn hasher() -> Result<Argon2<'static>, PortalError> {
    let argon2 = &AppConfig::get().argon2;
    let params = Params::new(argon2.memory_cost, argon2.time_cost, argon2.parallelism, None)
        .map_err(|e| PortalError::validation(format!("Argon2 参数错误: {e}")))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Argon2id，参数取自配置
pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let salt = SaltString::generate(&mut OsRng);
    hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortalError::validation(format!("密码哈希失败: {e}")))
}

/// 参数从哈希串自身解析，配置变更后旧哈希仍可验证
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

/// 随机初始密码，保证同时含大写、小写字母与数字；去掉了易混淆的 0/O、1/l/I
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    loop {
        let candidate: String = (0..length)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();
        let mixed = candidate.chars().any(|c| c.is_ascii_uppercase())
            && candidate.chars().any(|c| c.is_ascii_lowercase())
            && candidate.chars().any(|c| c.is_ascii_digit());
        if mixed || length < 3 {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::account_errors;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Secret123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Secret123", &hash));
        assert!(!verify_password("secret123", &hash));
        assert!(!verify_password("Secret123", "not-a-hash"));
    }

    #[test]
    fn test_generated_password_passes_account_rules() {
        for _ in 0..20 {
            let password = generate_password(16);
            assert_eq!(password.len(), 16);
            assert!(account_errors("teacher_a", "a@school.test", &password).is_empty());
        }
        assert_ne!(generate_password(16), generate_password(16));
    }
}
