//! Software secp256r1 key
//!
//! Lives next to device keys in a keyring; signs ECDSA over SHA-256 in
//! process.

use crate::codec::{KeyRecord, TaggedKind};
use crate::error::{KeyError, SekeyResult};
use crate::model::{KeyMaterialError, PublicKey, Secp256r1PublicKey};
use crate::ports::PrivateKey;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use rand::{rng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored form of a local key: the secret scalar, hex encoded
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "LocalKeyRepr", into = "LocalKeyRepr")]
pub struct LocalKeyRecord {
    signing_key: SigningKey,
}

#[derive(Serialize, Deserialize)]
struct LocalKeyRepr {
    #[serde(with = "hex")]
    secret: Vec<u8>,
}

impl TryFrom<LocalKeyRepr> for LocalKeyRecord {
    type Error = KeyMaterialError;

    fn try_from(repr: LocalKeyRepr) -> Result<Self, Self::Error> {
        if repr.secret.len() != 32 {
            return Err(KeyMaterialError::InvalidLength {
                expected: 32,
                actual: repr.secret.len(),
            });
        }
        let signing_key =
            SigningKey::from_slice(&repr.secret).map_err(|_| KeyMaterialError::InvalidScalar)?;
        Ok(Self { signing_key })
    }
}

impl From<LocalKeyRecord> for LocalKeyRepr {
    fn from(record: LocalKeyRecord) -> Self {
        Self {
            secret: record.signing_key.to_bytes().to_vec(),
        }
    }
}

impl LocalKeyRecord {
    pub fn public_key(&self) -> Secp256r1PublicKey {
        Secp256r1PublicKey::from(self.signing_key.verifying_key())
    }
}

impl PartialEq for LocalKeyRecord {
    fn eq(&self, other: &Self) -> bool {
        self.signing_key.verifying_key() == other.signing_key.verifying_key()
    }
}

impl Eq for LocalKeyRecord {}

impl fmt::Debug for LocalKeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalKeyRecord([REDACTED])")
    }
}

#[derive(Clone)]
pub struct LocalKey {
    signing_key: SigningKey,
}

impl LocalKey {
    pub fn generate() -> Self {
        loop {
            let mut secret_bytes = [0u8; 32];
            rng().fill_bytes(&mut secret_bytes);
            if let Ok(signing_key) = SigningKey::from_slice(&secret_bytes) {
                return Self { signing_key };
            }
        }
    }

    pub fn from_record(record: &LocalKeyRecord) -> Self {
        Self {
            signing_key: record.signing_key.clone(),
        }
    }

    pub fn public_key(&self) -> Secp256r1PublicKey {
        Secp256r1PublicKey::from(self.signing_key.verifying_key())
    }

    pub fn to_record(&self) -> LocalKeyRecord {
        LocalKeyRecord {
            signing_key: self.signing_key.clone(),
        }
    }

    pub(crate) fn secret_bytes(&self) -> Vec<u8> {
        self.signing_key.to_bytes().to_vec()
    }
}

impl fmt::Debug for LocalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalKey {{ public_key: {:?} }}", self.public_key())
    }
}

impl PrivateKey for LocalKey {
    fn kind(&self) -> &'static str {
        LocalKeyRecord::TAG
    }

    fn public_key(&self) -> PublicKey {
        LocalKey::public_key(self).into()
    }

    fn sign(&self, message: &[u8]) -> SekeyResult<Vec<u8>> {
        let signature: Signature =
            self.signing_key
                .try_sign(message)
                .map_err(|e| KeyError::Signing {
                    reason: e.to_string(),
                })?;
        Ok(signature.to_bytes().to_vec())
    }

    /// Software keys cannot drift from their public key
    fn validate_key(&self) -> SekeyResult<()> {
        Ok(())
    }

    fn to_record(&self) -> KeyRecord {
        LocalKey::to_record(self).into()
    }
}
