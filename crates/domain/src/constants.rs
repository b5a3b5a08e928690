//! API constants
//!
//! Centralized location for endpoint paths and client defaults.

// Client defaults
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("hisris-client/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Auth endpoints
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const AUTH_REFRESH_PATH: &str = "/auth/refresh";
pub const AUTH_ME_PATH: &str = "/auth/me";
pub const AUTH_LOGOUT_PATH: &str = "/auth/logout";

// Bearer scheme used for the Authorization header
pub const BEARER_PREFIX: &str = "Bearer ";

// ADT / RIS endpoints
pub const PATIENTS_PATH: &str = "/patients";
pub const ORDERS_PATH: &str = "/orders";
pub const WORKLIST_PATH: &str = "/worklist";
pub const STUDIES_PATH: &str = "/studies";
pub const REPORTS_PATH: &str = "/reports";

// Scheduling endpoints
pub const RESOURCES_PATH: &str = "/resources";
pub const SLOTS_PATH: &str = "/slots";
pub const APPOINTMENTS_PATH: &str = "/appointments";

// Administration endpoints
pub const ADMIN_USERS_PATH: &str = "/admin/users";
