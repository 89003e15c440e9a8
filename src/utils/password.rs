use crate::config::AppConfig;
use crate::errors::PortalError;
use argon2::password_hash::{SaltString, rand_core::OsRng};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};

/// 密码校验结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordMatch {
    /// 与 Argon2 哈希匹配
    Hashed,
    /// 与历史遗留的明文值匹配，调用方应重新哈希
    Legacy,
    Mismatch,
}

impl PasswordMatch {
    pub fn is_match(self) -> bool {
        self != PasswordMatch::Mismatch
    }
}

/// 哈希密码（也用于验证码）
pub fn hash_password(password: &str) -> Result<String, PortalError> {
    let config = AppConfig::get();
    let params = Params::new(
        config.argon2.memory_cost,
        config.argon2.time_cost,
        config.argon2.parallelism,
        None,
    )
    .map_err(|e| PortalError::validation(format!("Argon2 参数错误: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PortalError::validation(format!("密码哈希失败: {e}")))?;
    Ok(hash.to_string())
}

/// 验证密码
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => false,
    }
}

/// 验证账户密码，兼容旧数据中未哈希的密码
pub fn check_password(password: &str, stored: &str) -> PasswordMatch {
    if stored.starts_with('$') {
        if verify_password(password, stored) {
            PasswordMatch::Hashed
        } else {
            PasswordMatch::Mismatch
        }
    } else if !stored.is_empty() && stored == password {
        PasswordMatch::Legacy
    } else {
        PasswordMatch::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("secret1").expect("hash should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("secret1", &hash));
        assert!(!verify_password("secret2", &hash));
    }

    #[test]
    fn test_check_password() {
        let hash = hash_password("secret1").expect("hash should succeed");
        assert_eq!(check_password("secret1", &hash), PasswordMatch::Hashed);
        assert_eq!(check_password("nope", &hash), PasswordMatch::Mismatch);
        assert_eq!(check_password("plain", "plain"), PasswordMatch::Legacy);
        assert_eq!(check_password("other", "plain"), PasswordMatch::Mismatch);
        assert_eq!(check_password("", ""), PasswordMatch::Mismatch);
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(!verify_password("x", "$not-a-phc-string"));
    }
}
