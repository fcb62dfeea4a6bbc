use thiserror::Error;

/// 拉取持仓失败
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("exchange returned retCode {code}: {msg}")]
    Api { code: i64, msg: String },

    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid {field} for {symbol}: {value:?}")]
    InvalidField {
        symbol: String,
        field: &'static str,
        value: String,
    },
}

/// 消息推送失败
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("telegram rejected message ({status}): {description}")]
    Rejected { status: u16, description: String },
}

/// 退化计算（除零）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputationError {
    #[error("zero cost basis for {symbol}")]
    ZeroCostBasis { symbol: String },

    #[error("zero total size for {symbol}")]
    ZeroSize { symbol: String },
}

/// 单轮轮询中可能出现的全部错误，在循环边界统一处理
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("fetch: {0}")]
    Fetch(#[from] FetchError),

    #[error("delivery: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("computation: {0}")]
    Computation(#[from] ComputationError),
}

/// 快照文件读写失败
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_error_wraps_kinds() {
        let err: TrackerError = FetchError::Api {
            code: 10003,
            msg: "API key is invalid.".into(),
        }
        .into();
        assert!(matches!(err, TrackerError::Fetch(_)));
        assert_eq!(
            err.to_string(),
            "fetch: exchange returned retCode 10003: API key is invalid."
        );

        let err: TrackerError = ComputationError::ZeroCostBasis {
            symbol: "BTCUSDT".into(),
        }
        .into();
        assert!(matches!(err, TrackerError::Computation(_)));
    }

    #[test]
    fn test_delivery_rejected_message() {
        let err = DeliveryError::Rejected {
            status: 400,
            description: "Bad Request: chat not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "telegram rejected message (400): Bad Request: chat not found"
        );
    }
}
