use axum::extract::FromRequest;

use super::error::ApiError;

/// JSONボディの抽出器
///
/// 本文が読めない場合も `ApiError` として400のJSON応答を返す。
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
