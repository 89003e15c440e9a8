//! 内存会话存储
//!
//! 会话令牌是不透明的随机串，只保存在进程内存中，重启后全部失效。
//! 过期的会话在下一次读取时被移除。

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::models::users::entities::UserRole;
use crate::utils::random_code::generate_token;

/// 会话令牌长度
pub const SESSION_TOKEN_LEN: usize = 48;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    /// 登录时选择的角色，决定本会话可以访问的接口
    pub role: UserRole,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

pub struct SessionStore {
    sessions: DashMap<String, Session>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl: chrono::Duration::seconds(ttl_secs),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// 创建会话并返回
    pub fn create(&self, user_id: i64, role: UserRole) -> Session {
        let session = Session {
            token: generate_token(SESSION_TOKEN_LEN),
            user_id,
            role,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.insert(session.token.clone(), session.clone());
        debug!("Session created for user {} as {}", user_id, role);
        session
    }

    /// 查找有效会话，过期的会话会被顺带删除
    pub fn get(&self, token: &str) -> Option<Session> {
        let session = self.sessions.get(token).map(|s| s.value().clone())?;
        if session.is_expired(Utc::now()) {
            self.sessions.remove(token);
            return None;
        }
        Some(session)
    }

    /// 撤销单个会话，不存在时返回 false
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// 撤销用户的全部会话，返回撤销数量
    pub fn revoke_user(&self, user_id: i64) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, s| s.user_id != user_id);
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
