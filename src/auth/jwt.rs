use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before unix epoch")
        .as_secs() as usize
}

pub struct TokenIdentity {
    pub user_id: u64,
    pub email: String,
    pub role: u8,
    pub agency_id: u64,
    pub member_id: Option<u64>,
}

fn build_claims(identity: &TokenIdentity, token_type: TokenType, ttl: usize) -> Claims {
    Claims {
        user_id: identity.user_id,
        sub: identity.email.clone(),
        role: identity.role,
        agency_id: identity.agency_id,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        member_id: identity.member_id,
    }
}

pub fn generate_access_token(
    identity: &TokenIdentity,
    secret: &str,
    ttl: usize,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = build_claims(identity, TokenType::Access, ttl);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_refresh_token(
    identity: &TokenIdentity,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
    let claims = build_claims(identity, TokenType::Refresh, ttl);

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
