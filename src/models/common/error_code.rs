/// 业务错误码
///
/// 0 表示成功；1xxx 为通用错误，其余按模块分段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,
    InternalServerError = 1500,

    // 认证
    AuthFailed = 2000,
    RoleNotGranted = 2001,
    EmailAlreadyRegistered = 2002,
    InvalidRole = 2003,
    InvalidEmail = 2004,
    PasswordTooShort = 2005,
    SessionInvalid = 2006,
    ResetCodeInvalid = 2010,
    ResetTooManyAttempts = 2011,
    ResetTokenInvalid = 2012,

    // 用户
    UserNotFound = 3000,

    // 班级
    ClassNotFound = 4000,
    ClassPermissionDenied = 4001,
    ClassCodeInvalid = 4002,
    ClassCreationFailed = 4003,
    ClassJoinFailed = 4004,
    NotClassMember = 4005,

    // 作业
    AssignmentNotFound = 5000,
    AssignmentCreationFailed = 5001,
    InvalidDueDate = 5002,

    // 提交
    SubmissionNotFound = 6000,
    SubmissionAlreadyExists = 6001,
    SubmissionFailed = 6002,
    GradeOutOfRange = 6003,
    InvalidSubmissionStatus = 6004,

    // 文件
    FileNotFound = 7000,
    FileTypeNotAllowed = 7001,
    FileSizeExceeded = 7002,
    FileUploadFailed = 7003,
    MultifileUploadNotAllowed = 7004,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::Conflict as i32, 1009);
        assert_eq!(ErrorCode::ResetTooManyAttempts as i32, 2011);
        assert_eq!(ErrorCode::SubmissionAlreadyExists as i32, 6001);
    }
}
