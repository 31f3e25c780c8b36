use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey, VerifyOnly, ecdsa::Signature};

use crate::error::{LedgerError, LedgerResult};
use crate::transaction::Transaction;

/// Checks that a transaction really comes from the holder of `public_key`
/// before it is admitted to the pending pool.
pub trait TransactionAuthenticator {
    fn verify(&self, tx: &Transaction, signature_hex: &str, public_key_hex: &str)
    -> LedgerResult<()>;
}

/// ECDSA over secp256k1. The signed message is the SHA-256 of the
/// transaction's canonical encoding, and the transaction's `sender` must be
/// the address of the signing key.
pub struct Secp256k1Authenticator {
    secp: Secp256k1<VerifyOnly>,
}

impl Default for Secp256k1Authenticator {
    fn default() -> Self {
        Self {
            secp: Secp256k1::verification_only(),
        }
    }
}

impl TransactionAuthenticator for Secp256k1Authenticator {
    fn verify(
        &self,
        tx: &Transaction,
        signature_hex: &str,
        public_key_hex: &str,
    ) -> LedgerResult<()> {
        let address = pubkey_to_address_hex(public_key_hex)?;
        if tx.sender != address {
            return Err(auth("sender does not match public key"));
        }

        let sig_bytes = hex::decode(signature_hex).map_err(|_| auth("invalid signature hex"))?;
        let sig = Signature::from_der(&sig_bytes).map_err(|_| auth("invalid DER signature"))?;
        let pk = parse_pubkey(public_key_hex)?;

        let msg = Message::from_digest(tx.sighash());
        self.secp
            .verify_ecdsa(&msg, &sig, &pk)
            .map_err(|_| auth("signature does not verify"))
    }
}

/// Generate a new secp256k1 keypair and return (priv_hex, pub_hex_compressed, address_hex).
/// Address is simply the hex of the compressed public key.
pub fn generate_keypair_hex() -> (String, String, String) {
    let secp = Secp256k1::new();
    let (sk, pk) = secp.generate_keypair(&mut OsRng);
    let sk_hex = hex::encode(sk.secret_bytes());
    let pk_hex = hex::encode(pk.serialize()); // compressed (33 bytes)
    let address = pk_hex.clone();
    (sk_hex, pk_hex, address)
}

/// Derive address (hex of compressed pubkey) from a given hex pubkey.
pub fn pubkey_to_address_hex(pubkey_hex: &str) -> LedgerResult<String> {
    Ok(hex::encode(parse_pubkey(pubkey_hex)?.serialize()))
}

/// Sign `tx` with a hex secret key; returns the hex DER signature.
pub fn sign_transaction(tx: &Transaction, secret_key_hex: &str) -> LedgerResult<String> {
    let secp = Secp256k1::signing_only();
    let sk_bytes = hex::decode(secret_key_hex).map_err(|_| auth("invalid secret key hex"))?;
    let sk = SecretKey::from_slice(&sk_bytes).map_err(|_| auth("invalid secret key bytes"))?;

    let msg = Message::from_digest(tx.sighash());
    let sig = secp.sign_ecdsa(&msg, &sk);
    Ok(hex::encode(sig.serialize_der().to_vec()))
}

fn parse_pubkey(pubkey_hex: &str) -> LedgerResult<PublicKey> {
    let bytes = hex::decode(pubkey_hex).map_err(|_| auth("invalid pubkey hex"))?;
    PublicKey::from_slice(&bytes).map_err(|_| auth("invalid pubkey bytes"))
}

fn auth(msg: &str) -> LedgerError {
    LedgerError::Authentication(msg.to_string())
}
