//! Ed25519 signing and verification of messages and blocks.
//!
//! A block signature covers exactly the 32 bytes of its content hash.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use lattice_types::{Account, Block, PrivateKey, PublicKey, Signature};

/// Sign a message with a private key.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Public keys that are not valid curve points never verify.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// Sign `block` in place.
pub fn sign_block(block: &mut Block, private_key: &PrivateKey) {
    let signature = sign_message(block.hash().as_bytes(), private_key);
    block.set_signature(signature);
}

/// Check `block`'s signature against the given signer account.
pub fn verify_block_signature(block: &Block, signer: &Account) -> bool {
    verify_signature(
        block.hash().as_bytes(),
        &block.signature(),
        &signer.public_key(),
    )
}
