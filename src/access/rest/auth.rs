//! Login handshake for the REST strategy.
//!
//! Session establishment is a three-step exchange, run once per connect: the
//! SSO probe admits the session cookie, the server hands out its public key,
//! and the password goes back encrypted. No retry and no refresh; an expired
//! session surfaces as ordinary request failures on later calls.

use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::StatusCode;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use rsa::{Pkcs1v15Encrypt, RsaPublicKey};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::info;

use super::transport::RestTransport;
use crate::error::{DbAccessError, DbResult};

/// Marker the webapp answers with on a successful login.
const LOGIN_SUCCESS: &str = "login_success";

/// Login request body. Wire names are the webapp's; the domain rides along
/// empty in the corporate SSO flow this layer speaks.
#[derive(Serialize)]
struct LoginRequest<'a> {
    usr: &'a str,
    pwd: String,
    dom: &'a str,
}

/// Run the full handshake on the transport's session.
pub async fn login(transport: &RestTransport, user: &str, password: &SecretString) -> DbResult<()> {
    // SSO/Kerberos negotiation happens at the HTTP layer; a 200 from the
    // probe means the SSO gate admitted us and the session cookie is in the
    // jar, reused by every later call.
    match transport.get_status("loggedin").await {
        Ok(StatusCode::OK) => {}
        Ok(status) => {
            return Err(DbAccessError::Authentication(format!(
                "SSO probe rejected with HTTP {}",
                status
            )));
        }
        Err(e) => {
            return Err(DbAccessError::Authentication(format!(
                "cannot reach API server: {}",
                e
            )));
        }
    }

    let pubkey = fetch_public_key(transport).await?;

    let request = LoginRequest {
        usr: user,
        pwd: encrypt_password(password.expose_secret(), &pubkey)?,
        dom: "",
    };
    let body = transport
        .post_raw("login", &request)
        .await
        .map_err(|e| DbAccessError::Authentication(format!("login request failed: {}", e)))?;

    if body.get("data").and_then(|data| data.as_str()) == Some(LOGIN_SUCCESS) {
        info!("logged in as {}", user);
        Ok(())
    } else {
        Err(DbAccessError::Authentication("login rejected".to_string()))
    }
}

/// Fetch the server's PEM public key. The `getPubKey` endpoint answers with
/// a bare `{pubKey}` body, not the envelope.
async fn fetch_public_key(transport: &RestTransport) -> DbResult<String> {
    let body = transport
        .get_raw("getPubKey")
        .await
        .map_err(|e| DbAccessError::Authentication(format!("failed to get public key: {}", e)))?;
    body.get("pubKey")
        .and_then(|key| key.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            DbAccessError::Authentication("public key missing from server response".to_string())
        })
}

/// Encrypt a plaintext credential with the server-supplied public key:
/// PKCS#1 v1.5 padding, ciphertext base64-encoded for transport.
///
/// Accepts the key in SubjectPublicKeyInfo or PKCS#1 PEM form; webapp
/// deployments have shipped both.
pub fn encrypt_password(password: &str, pubkey_pem: &str) -> DbResult<String> {
    let key = RsaPublicKey::from_public_key_pem(pubkey_pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pubkey_pem))
        .map_err(|e| {
            DbAccessError::Authentication(format!("cannot parse server public key: {}", e))
        })?;

    let ciphertext = key
        .encrypt(
            &mut rsa::rand_core::OsRng,
            Pkcs1v15Encrypt,
            password.as_bytes(),
        )
        .map_err(|e| DbAccessError::Authentication(format!("cannot encrypt password: {}", e)))?;

    Ok(STANDARD.encode(ciphertext))
}
