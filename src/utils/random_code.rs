use rand::{Rng, distr::Alphanumeric};

/// 加入码字符集
const JOIN_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 加入码长度
pub const JOIN_CODE_LEN: usize = 6;

/// 生成班级加入码，6 位大写字母或数字
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_CHARSET[rng.random_range(0..JOIN_CODE_CHARSET.len())] as char)
        .collect()
}

/// 生成定长数字验证码
pub fn generate_numeric_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

/// 生成字母数字随机令牌
pub fn generate_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// 加入码格式检查（不区分大小写）
pub fn is_valid_join_code(code: &str) -> bool {
    code.len() == JOIN_CODE_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_code_format() {
        for _ in 0..100 {
            let code = generate_join_code();
            assert_eq!(code.len(), JOIN_CODE_LEN);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
            assert!(is_valid_join_code(&code));
        }
    }

    #[test]
    fn test_numeric_code() {
        let code = generate_numeric_code(6);
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_token() {
        let a = generate_token(48);
        let b = generate_token(48);
        assert_eq!(a.len(), 48);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_valid_join_code() {
        assert!(is_valid_join_code("ABC123"));
        assert!(is_valid_join_code("abc123"));
        assert!(!is_valid_join_code("ABC12"));
        assert!(!is_valid_join_code("ABC-12"));
        assert!(!is_valid_join_code(""));
    }
}
