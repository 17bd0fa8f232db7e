//! Binance 마켓 게이트웨이.
//!
//! 네 가지 마켓 유형(현물/선물/마진/알파)의 시세·캔들스틱 조회와
//! 서명이 필요한 계좌 잔고 조회를 하나의 클라이언트로 제공합니다.
//!
//! 엔드포인트 선택은 이 모듈 안에서만 일어나며, 호출자는
//! `MarketType`/`AccountSection`만 전달합니다.

use async_trait::async_trait;
use chrono::DateTime;
use coinwatch_core::crypto::ApiCredentials;
use coinwatch_core::{
    AccountSection, AssetBalance, BalanceSnapshot, Kline, KlineInterval, MarketType, MarketsConfig,
    Pair, PriceQuote,
};
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use sha2::Sha256;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error};

use crate::traits::{AccountDataSource, GatewayResult, MarketDataSource};
use crate::GatewayError;

type HmacSha256 = Hmac<Sha256>;

/// 서명 요청의 수신 윈도우 (밀리초).
const RECV_WINDOW_MS: u64 = 5000;

// ============================================================================
// API 응답 타입
// ============================================================================

#[derive(Debug, Deserialize)]
struct BinancePrice {
    price: String,
}

#[derive(Debug, Deserialize)]
struct BinanceKline(
    i64,    // 0: Open time
    String, // 1: Open
    String, // 2: High
    String, // 3: Low
    String, // 4: Close
    String, // 5: Volume
    #[allow(dead_code)] serde_json::Value, // 6: Close time
    #[allow(dead_code)] serde_json::Value, // 7: Quote asset volume
    #[allow(dead_code)] serde_json::Value, // 8: Number of trades
    #[allow(dead_code)] serde_json::Value, // 9: Taker buy base volume
    #[allow(dead_code)] serde_json::Value, // 10: Taker buy quote volume
    #[allow(dead_code)] serde_json::Value, // 11: Ignore
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceSpotBalance {
    asset: String,
    free: String,
    locked: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceSpotAccount {
    balances: Vec<BinanceSpotBalance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceFundingAsset {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceAlphaAssetDetail {
    available_balance: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceFuturesAsset {
    asset: String,
    wallet_balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceFuturesAccount {
    assets: Vec<BinanceFuturesAsset>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceError {
    code: i32,
    msg: String,
}

// ============================================================================
// Binance 게이트웨이
// ============================================================================

/// Binance 마켓 게이트웨이.
///
/// 자격증명을 보관하지 않으며, 계좌 조회 시 호출마다 주입받습니다.
pub struct BinanceGateway {
    markets: MarketsConfig,
    client: Client,
}

impl BinanceGateway {
    /// 새 게이트웨이 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `GatewayError::NetworkError`를 반환합니다.
    pub fn new(markets: MarketsConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(markets.request_timeout())
            .build()
            .map_err(|e| GatewayError::NetworkError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { markets, client })
    }

    /// 마켓 유형별 현재가 엔드포인트.
    fn price_endpoint(market: MarketType) -> &'static str {
        match market {
            MarketType::Futures => "/fapi/v1/ticker/price",
            MarketType::Margin => "/sapi/v1/margin/market-price",
            MarketType::Spot | MarketType::Alpha => "/api/v3/ticker/price",
        }
    }

    /// 마켓 유형별 캔들스틱 엔드포인트.
    fn klines_endpoint(market: MarketType) -> &'static str {
        match market {
            MarketType::Futures => "/fapi/v1/klines",
            _ => "/api/v3/klines",
        }
    }

    /// 현재 타임스탬프(밀리초) 반환.
    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("Time went backwards")
            .as_millis() as u64
    }

    /// HMAC-SHA256으로 쿼리 문자열 서명.
    fn sign(secret_key: &str, query: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes()).expect("Invalid key");
        mac.update(query.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// 파라미터에서 쿼리 문자열 생성.
    fn build_query(params: &[(&str, String)]) -> String {
        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: for<'de> Deserialize<'de>>(
        &self,
        market: MarketType,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> GatewayResult<T> {
        let url = format!("{}{}", self.markets.base_url(market), endpoint);
        let query = Self::build_query(params);

        let full_url = if query.is_empty() {
            url
        } else {
            format!("{}?{}", url, query)
        };

        debug!("GET {}", full_url);

        let response = self.client.get(&full_url).send().await?;

        self.handle_response(response).await
    }

    /// 서명된 GET 요청 (인증 필요).
    async fn signed_get<T: for<'de> Deserialize<'de>>(
        &self,
        market: MarketType,
        endpoint: &str,
        params: &[(&str, String)],
        credentials: &ApiCredentials,
    ) -> GatewayResult<T> {
        let url = format!("{}{}", self.markets.base_url(market), endpoint);

        let mut all_params = params.to_vec();
        all_params.push(("timestamp", Self::timestamp_ms().to_string()));
        all_params.push(("recvWindow", RECV_WINDOW_MS.to_string()));

        let query = Self::build_query(&all_params);
        let signature = Self::sign(&credentials.secret_key, &query);
        let full_url = format!("{}?{}&signature={}", url, query, signature);

        debug!("GET (signed) {}", endpoint);

        let response = self
            .client
            .get(&full_url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// 서명된 POST 요청.
    async fn signed_post<T: for<'de> Deserialize<'de>>(
        &self,
        market: MarketType,
        endpoint: &str,
        params: &[(&str, String)],
        credentials: &ApiCredentials,
    ) -> GatewayResult<T> {
        let url = format!("{}{}", self.markets.base_url(market), endpoint);

        let mut all_params = params.to_vec();
        all_params.push(("timestamp", Self::timestamp_ms().to_string()));
        all_params.push(("recvWindow", RECV_WINDOW_MS.to_string()));

        let query = Self::build_query(&all_params);
        let signature = Self::sign(&credentials.secret_key, &query);
        let body = format!("{}&signature={}", query, signature);

        debug!("POST (signed) {}", endpoint);

        let response = self
            .client
            .post(&url)
            .header("X-MBX-APIKEY", &credentials.api_key)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> GatewayResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                error!("Failed to parse response: {} - Body: {}", e, body);
                GatewayError::ParseError(e.to_string())
            })
        } else {
            // 에러 응답 파싱 시도
            if let Ok(error) = serde_json::from_str::<BinanceError>(&body) {
                Err(Self::map_error_code(error.code, &error.msg))
            } else {
                Err(GatewayError::ApiError {
                    code: status.as_u16() as i32,
                    message: body,
                })
            }
        }
    }

    /// Binance 에러 코드를 GatewayError로 매핑.
    fn map_error_code(code: i32, msg: &str) -> GatewayError {
        match code {
            -1003 => GatewayError::RateLimited,
            -1121 => GatewayError::InvalidSymbol(msg.to_string()),
            -1002 | -2014 | -2015 => GatewayError::Unauthorized(msg.to_string()),
            _ => GatewayError::ApiError {
                code,
                message: msg.to_string(),
            },
        }
    }

    /// 업스트림이 반환한 가격 문자열을 Decimal로 파싱.
    fn parse_price(s: &str) -> GatewayResult<Decimal> {
        s.parse()
            .map_err(|_| GatewayError::ParseError(format!("Invalid decimal: {}", s)))
    }

    /// 현물 계좌 잔고 조회.
    async fn fetch_spot_assets(
        &self,
        credentials: &ApiCredentials,
    ) -> GatewayResult<Vec<AssetBalance>> {
        let resp: BinanceSpotAccount = self
            .signed_get(MarketType::Spot, "/api/v3/account", &[], credentials)
            .await?;

        let mut assets = Vec::new();
        for b in resp.balances {
            let amount = Self::parse_price(&b.free)? + Self::parse_price(&b.locked)?;
            if amount > Decimal::ZERO {
                assets.push(AssetBalance {
                    asset: b.asset,
                    amount,
                });
            }
        }
        Ok(assets)
    }

    /// 자금 계좌 잔고 조회.
    async fn fetch_funding_assets(
        &self,
        credentials: &ApiCredentials,
    ) -> GatewayResult<Vec<AssetBalance>> {
        let resp: Vec<BinanceFundingAsset> = self
            .signed_post(
                MarketType::Spot,
                "/sapi/v1/asset/get-funding-asset",
                &[],
                credentials,
            )
            .await?;

        let mut assets = Vec::new();
        for a in resp {
            let amount = Self::parse_price(&a.free)?;
            if amount > Decimal::ZERO {
                assets.push(AssetBalance {
                    asset: a.asset,
                    amount,
                });
            }
        }
        Ok(assets)
    }

    /// 알파 토큰 계좌 잔고 조회.
    async fn fetch_alpha_assets(
        &self,
        credentials: &ApiCredentials,
    ) -> GatewayResult<Vec<AssetBalance>> {
        let resp: BTreeMap<String, BinanceAlphaAssetDetail> = self
            .signed_get(
                MarketType::Alpha,
                "/sapi/v1/asset/assetDetail",
                &[],
                credentials,
            )
            .await?;

        let mut assets = Vec::new();
        for (asset, detail) in resp {
            let amount = Self::parse_price(detail.available_balance.as_deref().unwrap_or("0"))?;
            if amount > Decimal::ZERO {
                assets.push(AssetBalance { asset, amount });
            }
        }
        Ok(assets)
    }

    /// 선물 계좌 잔고 조회.
    async fn fetch_futures_assets(
        &self,
        credentials: &ApiCredentials,
    ) -> GatewayResult<Vec<AssetBalance>> {
        let resp: BinanceFuturesAccount = self
            .signed_get(MarketType::Futures, "/fapi/v2/account", &[], credentials)
            .await?;

        let mut assets = Vec::new();
        for a in resp.assets {
            let amount = Self::parse_price(&a.wallet_balance)?;
            if amount > Decimal::ZERO {
                assets.push(AssetBalance {
                    asset: a.asset,
                    amount,
                });
            }
        }
        Ok(assets)
    }

    /// 현물 + 자금 계좌를 자산별로 합산.
    fn merge_assets(lists: Vec<Vec<AssetBalance>>) -> Vec<AssetBalance> {
        let mut merged: BTreeMap<String, Decimal> = BTreeMap::new();
        for list in lists {
            for balance in list {
                *merged.entry(balance.asset).or_default() += balance.amount;
            }
        }
        merged
            .into_iter()
            .map(|(asset, amount)| AssetBalance { asset, amount })
            .collect()
    }
}

#[async_trait]
impl MarketDataSource for BinanceGateway {
    async fn get_price(&self, pair: &Pair, market: MarketType) -> GatewayResult<PriceQuote> {
        let resp: BinancePrice = self
            .public_get(
                market,
                Self::price_endpoint(market),
                &[("symbol", pair.as_str().to_string())],
            )
            .await?;

        let price = Self::parse_price(&resp.price)?;

        Ok(PriceQuote::new(pair.clone(), market, price))
    }

    async fn get_klines(
        &self,
        pair: &Pair,
        market: MarketType,
        interval: KlineInterval,
        limit: u32,
    ) -> GatewayResult<Vec<Kline>> {
        let resp: Vec<BinanceKline> = self
            .public_get(
                market,
                Self::klines_endpoint(market),
                &[
                    ("symbol", pair.as_str().to_string()),
                    ("interval", interval.to_binance_interval().to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        resp.into_iter()
            .map(|k| {
                Ok(Kline {
                    open_time: DateTime::from_timestamp_millis(k.0)
                        .ok_or_else(|| GatewayError::ParseError(format!("Invalid open time: {}", k.0)))?,
                    open: Self::parse_price(&k.1)?,
                    high: Self::parse_price(&k.2)?,
                    low: Self::parse_price(&k.3)?,
                    close: Self::parse_price(&k.4)?,
                    volume: Self::parse_price(&k.5)?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl AccountDataSource for BinanceGateway {
    async fn get_account_balances(
        &self,
        credentials: &ApiCredentials,
        section: AccountSection,
    ) -> GatewayResult<BalanceSnapshot> {
        let assets = match section {
            AccountSection::Spot => self.fetch_spot_assets(credentials).await?,
            AccountSection::Funding => self.fetch_funding_assets(credentials).await?,
            AccountSection::Alpha => self.fetch_alpha_assets(credentials).await?,
            AccountSection::Futures => self.fetch_futures_assets(credentials).await?,
            AccountSection::Overview => {
                let spot = self.fetch_spot_assets(credentials).await?;
                let funding = self.fetch_funding_assets(credentials).await?;
                Self::merge_assets(vec![spot, funding])
            }
        };

        Ok(BalanceSnapshot::from_assets(section, assets))
    }
}
