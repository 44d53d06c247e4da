use crate::cycle::ForecastCycle;
use crate::error::ForecastError;
use crate::model::{ForecastItem, GridCell};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::ForecastProvider;

/// 단기예보 (village forecast) endpoint of the KMA open-data portal.
pub const DEFAULT_BASE_URL: &str =
    "https://apis.data.go.kr/1360000/VilageFcstInfoService_2.0/getVilageFcst";

/// `resultCode` value the provider uses for an accepted request.
const RESULT_OK: &str = "00";

/// HTTP client for the KMA short-term forecast API.
///
/// Carries no timeout of its own: the fetch deadline is owned by
/// [`crate::service::ForecastService`], which cancels the in-flight
/// request by dropping the future.
#[derive(Debug, Clone)]
pub struct KmaProvider {
    service_key: String,
    base_url: String,
    http: Client,
}

impl KmaProvider {
    pub fn new(service_key: String) -> Self {
        Self::with_base_url(service_key, DEFAULT_BASE_URL.to_string())
    }

    /// Provider pointed at a non-default endpoint (mock servers, proxies).
    pub fn with_base_url(service_key: String, base_url: String) -> Self {
        Self {
            service_key,
            base_url,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ForecastProvider for KmaProvider {
    async fn fetch_items(
        &self,
        cell: GridCell,
        cycle: &ForecastCycle,
    ) -> Result<Vec<ForecastItem>, ForecastError> {
        let base_date = cycle.base_date();
        let base_time = cycle.base_time();
        let nx = cell.nx.to_string();
        let ny = cell.ny.to_string();

        tracing::debug!(%base_date, %base_time, %nx, %ny, "requesting forecast batch");

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("serviceKey", self.service_key.as_str()),
                ("pageNo", "1"),
                ("numOfRows", "1000"),
                ("dataType", "JSON"),
                ("base_date", base_date.as_str()),
                ("base_time", base_time.as_str()),
                ("nx", nx.as_str()),
                ("ny", ny.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "forecast request failed");
            return Err(ForecastError::Provider {
                status: status.as_u16(),
            });
        }

        let envelope: ApiResponse = res.json().await?;
        let header = envelope.response.header;
        if header.result_code != RESULT_OK {
            tracing::warn!(
                code = %header.result_code,
                message = %header.result_msg,
                %base_date,
                %base_time,
                nx = cell.nx,
                ny = cell.ny,
                "provider rejected forecast request"
            );
            return Err(ForecastError::Rejected {
                code: header.result_code,
                message: header.result_msg,
            });
        }

        Ok(envelope
            .response
            .body
            .and_then(|body| body.items)
            .and_then(|items| items.item)
            .map(ItemPayload::into_vec)
            .unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    response: ResponseEnvelope,
}

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    header: ResponseHeader,
    // Absent on rejections.
    #[serde(default)]
    body: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ResponseHeader {
    #[serde(rename = "resultCode")]
    result_code: String,
    #[serde(rename = "resultMsg", default)]
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    items: Option<ItemContainer>,
    #[serde(rename = "totalCount", default)]
    #[allow(dead_code)]
    total_count: u32,
}

#[derive(Debug, Deserialize)]
struct ItemContainer {
    #[serde(default)]
    item: Option<ItemPayload>,
}

/// The portal returns a bare object instead of a one-element array when
/// a page holds a single item. Resolved to a uniform `Vec` here, at the
/// parse boundary, so nothing downstream sees the ambiguity.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemPayload {
    Many(Vec<ForecastItem>),
    One(Box<ForecastItem>),
}

impl ItemPayload {
    fn into_vec(self) -> Vec<ForecastItem> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![*item],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    #[test]
    fn item_list_shape_parses() {
        let json = serde_json::json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL_SERVICE" },
                "body": {
                    "dataType": "JSON",
                    "items": { "item": [
                        { "baseDate": "20260830", "baseTime": "0800",
                          "category": "TMP", "fcstDate": "20260830",
                          "fcstTime": "1400", "fcstValue": "26", "nx": 60, "ny": 127 }
                    ]},
                    "numOfRows": 1000, "pageNo": 1, "totalCount": 1
                }
            }
        });
        let parsed: ApiResponse = serde_json::from_value(json).unwrap();
        let items = parsed
            .response
            .body
            .unwrap()
            .items
            .unwrap()
            .item
            .unwrap()
            .into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, Category::Tmp);
        assert_eq!(items[0].fcst_value, "26");
    }

    #[test]
    fn bare_object_shape_normalizes_to_one_element() {
        let json = serde_json::json!({
            "response": {
                "header": { "resultCode": "00", "resultMsg": "NORMAL_SERVICE" },
                "body": {
                    "items": { "item":
                        { "category": "TMN", "fcstDate": "20260830",
                          "fcstTime": "0600", "fcstValue": "15.0" }
                    },
                    "totalCount": 1
                }
            }
        });
        let parsed: ApiResponse = serde_json::from_value(json).unwrap();
        let items = parsed
            .response
            .body
            .unwrap()
            .items
            .unwrap()
            .item
            .unwrap()
            .into_vec();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, Category::Tmn);
    }

    #[test]
    fn rejection_without_body_parses() {
        let json = serde_json::json!({
            "response": {
                "header": { "resultCode": "30", "resultMsg": "SERVICE_KEY_IS_NOT_REGISTERED_ERROR" }
            }
        });
        let parsed: ApiResponse = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.response.header.result_code, "30");
        assert!(parsed.response.body.is_none());
    }
}
