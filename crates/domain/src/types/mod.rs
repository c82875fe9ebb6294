//! Request, response and callback models for each gateway product

pub mod auth;
pub mod b2c;
pub mod c2b;
pub mod stk_push;
pub mod value;

pub use auth::AccessTokenResponse;
pub use b2c::{B2CTopUpPayload, B2CTopUpRequest, B2CTopUpResponse, B2CTopUpResult, ReferenceItem};
pub use c2b::{
    C2BCallback, C2BCommandId, C2BResponse, C2BSimulatePayload, C2BSimulateRequest,
    C2BSimulateResponse, C2BTransactionType, C2BValidationResponse, C2BValidationResultCode,
    RegisterUrlRequest, RegisterUrlResponse, ResponseType,
};
pub use stk_push::{
    stk_password, stk_timestamp, CallbackMetadata, StkPushCallback, StkPushPayload,
    StkPushRequest, StkPushResponse, StkPushResultCode, StkPushTransactionType,
};
pub use value::{HeterogeneousValue, KeyedParameter, ParameterLookup};
