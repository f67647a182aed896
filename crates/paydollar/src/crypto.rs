//! Request signing and static-token decryption.

use aes::Aes256;
use base64::Engine;
use cbc::{
    cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit},
    Decryptor,
};
use error_stack::ResultExt;
use masking::{PeekInterface, Secret};
use ring::digest;

use crate::errors::{CustomResult, PaydollarError};

const AES_256_KEY_LENGTH: usize = 32;
const AES_BLOCK_LENGTH: usize = 16;

/// Computes the secure hash authenticating a direct-payment request.
///
/// The input is the pipe-joined string
/// `merchant|orderRef|currCode|amount|payType|secret` in exactly that order,
/// hashed with SHA-1. The algorithm is a wire-compatibility constant: the
/// processor recomputes the same digest on its side, so it cannot be swapped
/// for a stronger hash.
pub fn secure_hash(
    merchant_id: &str,
    order_ref: &str,
    curr_code: &str,
    amount: &str,
    pay_type: &str,
    secret: &Secret<String>,
) -> String {
    let payload = [
        merchant_id,
        order_ref,
        curr_code,
        amount,
        pay_type,
        secret.peek(),
    ]
    .join("|");
    let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, payload.as_bytes());
    hex::encode(digest.as_ref())
}

/// Decrypts a base64-encoded, AES-256-CBC encrypted static token.
///
/// The plaintext is submitted to the processor as a live credential token, so
/// every failure mode (malformed base64, wrong key or IV, corrupted
/// ciphertext, non-UTF-8 plaintext) must surface as a
/// [`PaydollarError::DecryptionFailed`] instead of returning garbage.
pub fn decrypt_static_token(
    ciphertext_base64: &str,
    key: &Secret<String>,
    iv: &Secret<String>,
) -> CustomResult<Secret<String>, PaydollarError> {
    let ciphertext = base64::engine::general_purpose::STANDARD
        .decode(ciphertext_base64)
        .change_context(PaydollarError::DecryptionFailed)
        .attach_printable("static token is not valid base64")?;

    let decryptor = Decryptor::<Aes256>::new(
        &sized_key::<AES_256_KEY_LENGTH>(key.peek().as_bytes()).into(),
        &sized_key::<AES_BLOCK_LENGTH>(iv.peek().as_bytes()).into(),
    );
    let plaintext = decryptor
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| PaydollarError::DecryptionFailed)
        .attach_printable("block decryption or unpadding failed")?;

    String::from_utf8(plaintext)
        .change_context(PaydollarError::DecryptionFailed)
        .attach_printable("decrypted token is not valid UTF-8")
        .map(Secret::new)
}

// Caller-supplied key material is zero-padded or truncated to the cipher's
// expected length.
fn sized_key<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut key = [0u8; N];
    let len = bytes.len().min(N);
    key[..len].copy_from_slice(&bytes[..len]);
    key
}
