//! 자격증명 암호화 모듈.
//!
//! AES-256-GCM으로 사용자 API 자격증명을 봉인/개봉합니다.
//!
//! ## 보안 고려사항
//! - 마스터 키는 설정에서 주입되며 프로세스 수명 동안 변경되지 않습니다
//! - 봉인마다 고유한 12바이트 nonce를 새로 생성합니다
//! - 두 비밀값(API 키, 시크릿 키)은 하나의 JSON 페이로드로 직렬화되어
//!   단일 메시지로 봉인됩니다 (동일 키에서의 nonce 재사용 방지)

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 암호화 에러.
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Invalid master key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid nonce length: expected 12 bytes, got {0}")]
    InvalidNonceLength(usize),

    #[error("Base64 decode error: {0}")]
    Base64DecodeError(#[from] base64::DecodeError),
}

/// AES-256-GCM nonce 크기 (바이트).
pub const NONCE_SIZE: usize = 12;

/// AES-256 키 크기 (바이트).
pub const KEY_SIZE: usize = 32;

/// 사용자 API 자격증명 (평문).
///
/// 계좌 조회 호출 경로에서만 일시적으로 존재하며,
/// 로그나 응답에 평문으로 노출되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCredentials {
    pub api_key: String,
    pub secret_key: String,
}

impl ApiCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

/// 봉인된 자격증명 레코드 (저장 형태).
#[derive(Debug, Clone)]
pub struct SealedCredentials {
    /// AES-256-GCM 암호문 (인증 태그 포함)
    pub ciphertext: Vec<u8>,
    /// 봉인에 사용된 nonce
    pub nonce: [u8; NONCE_SIZE],
}

/// 자격증명 암호화 관리자.
///
/// 마스터 키는 설정에서 한 번 로드되어 생성자에 주입됩니다.
pub struct CredentialEncryptor {
    cipher: Aes256Gcm,
}

impl CredentialEncryptor {
    /// Base64로 인코딩된 32바이트 마스터 키로 생성합니다.
    pub fn new(master_key: &SecretString) -> Result<Self, CryptoError> {
        use base64::Engine;
        let key_bytes =
            base64::engine::general_purpose::STANDARD.decode(master_key.expose_secret())?;

        if key_bytes.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength(key_bytes.len()));
        }

        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(Self { cipher })
    }

    /// 랜덤 nonce 생성.
    fn generate_nonce() -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);
        nonce
    }

    /// 자격증명을 봉인합니다. 호출마다 새 nonce가 생성됩니다.
    pub fn seal(&self, credentials: &ApiCredentials) -> Result<SealedCredentials, CryptoError> {
        let payload = serde_json::to_vec(credentials)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        let nonce_bytes = Self::generate_nonce();
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, payload.as_slice())
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

        Ok(SealedCredentials {
            ciphertext,
            nonce: nonce_bytes,
        })
    }

    /// 봉인된 자격증명을 개봉합니다.
    ///
    /// 암호문 변조, 잘못된 마스터 키 모두 `DecryptionFailed`로 실패합니다.
    pub fn open(&self, ciphertext: &[u8], nonce: &[u8]) -> Result<ApiCredentials, CryptoError> {
        if nonce.len() != NONCE_SIZE {
            return Err(CryptoError::InvalidNonceLength(nonce.len()));
        }

        let nonce = Nonce::from_slice(nonce);
        let payload = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

        serde_json::from_slice(&payload).map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
    }
}

/// 새 마스터 키를 생성합니다 (초기 설정용).
pub fn generate_master_key() -> String {
    use base64::Engine;
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    base64::engine::general_purpose::STANDARD.encode(key)
}
