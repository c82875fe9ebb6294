//! Gateway constants
//!
//! Centralized location for endpoint paths, base URLs and token timing.

// Base URLs
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

// Endpoint paths, relative to the base URL
pub const OAUTH_PATH: &str = "oauth/v1/generate";
pub const OAUTH_GRANT_TYPE: &str = "client_credentials";
pub const C2B_REGISTER_URL_PATH: &str = "mpesa/c2b/v2/registerurl";
pub const C2B_SIMULATE_PATH: &str = "mpesa/c2b/v2/simulate";
pub const STK_PUSH_PATH: &str = "mpesa/stkpush/v1/processrequest";
pub const B2C_TOP_UP_PATH: &str = "mpesa/b2b/v1/paymentrequest";

// Token lifecycle
/// Seconds subtracted from the server-reported lifetime before a token is
/// treated as expired.
pub const TOKEN_EXPIRY_BUFFER_SECS: u64 = 300;
/// Lifetime used when `expires_in` is absent or not an integer.
pub const DEFAULT_TOKEN_LIFETIME_SECS: u64 = 3599;

// Transport
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// Decoding
/// Result code reported when the gateway sends something that is not an
/// integer or a numeric string.
pub const UNKNOWN_RESULT_CODE: i64 = -1;

// Request defaults
pub const STK_DEFAULT_DESCRIPTION: &str = "Payment";
pub const B2C_DEFAULT_REMARKS: &str = "OK";
pub const B2C_COMMAND_ID: &str = "BusinessPayToBulk";
/// Identifier type `4` is an organisation short code.
pub const B2C_SHORTCODE_IDENTIFIER_TYPE: &str = "4";
