pub mod functions;
pub mod handlers;
pub mod structures;

pub use handlers::{
    __path_login, __path_logout, __path_refresh, __path_register, __path_validate_password,
    __path_verify_session, init_routes, login, logout, refresh, register, validate_password,
    verify_session,
};

pub use structures::{
    LoginRequest, PasswordValidationRequest, PasswordValidationResponse, RegisterRequest,
    SoftReason, VerifySessionResponse,
};
