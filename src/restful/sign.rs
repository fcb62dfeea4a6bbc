use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use std::collections::BTreeMap;
use tracing::debug;

use super::models::RestApi;
use crate::client::BybitClient;
use crate::error::FetchError;

type HmacSha256 = Hmac<Sha256>;

impl BybitClient {
    /// 签名 GET 请求，retCode 非 0 时返回 FetchError::Api
    pub async fn get<T>(
        &self,
        request_path: &str,
        parameters: &BTreeMap<String, String>,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned + std::fmt::Debug,
    {
        let timestamp = self.get_timestamp();
        let recv_window = self.recv_window.to_string();

        let query_str = Self::build_query_string(parameters);
        let pre_sign = format!("{}{}{}{}", timestamp, self.api_key, recv_window, query_str);
        let sign = self.sign(&pre_sign);

        let url = self.build_full_url(request_path, &query_str);

        if self.debug {
            debug!(%url, ?parameters, %sign, "[GET] request");
        }

        let resp = self
            .http
            .get(&url)
            .header("X-BAPI-API-KEY", &self.api_key)
            .header("X-BAPI-TIMESTAMP", &timestamp)
            .header("X-BAPI-RECV-WINDOW", &recv_window)
            .header("X-BAPI-SIGN", sign)
            .header("Content-Type", "application/json")
            .send()
            .await?
            .text()
            .await?;

        if self.debug {
            debug!(response = %resp, "[GET] response");
        }

        let envelope = serde_json::from_str::<RestApi<T>>(&resp)?;
        if envelope.ret_code != 0 {
            return Err(FetchError::Api {
                code: envelope.ret_code,
                msg: envelope.ret_msg,
            });
        }
        Ok(envelope.result)
    }

    /// HMAC-SHA256(secret, timestamp + api_key + recv_window + query)，小写 hex
    pub(crate) fn sign(&self, message: &str) -> String {
        // HMAC 接受任意长度的 key
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 构建 query 字符串（按 key 的 ASCII 排序，value 做 URL 编码），签名与请求共用
    pub(crate) fn build_query_string(params: &BTreeMap<String, String>) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 构建完整 URL（含 query 参数）
    fn build_full_url(&self, path: &str, query_str: &str) -> String {
        if query_str.is_empty() {
            format!("{}{}", self.domain, path)
        } else {
            format!("{}{}?{}", self.domain, path, query_str)
        }
    }

    pub fn get_timestamp(&self) -> String {
        chrono::Utc::now().timestamp_millis().to_string()
    }
}
