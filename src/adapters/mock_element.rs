//! Mock secure element for testing keys against the capability interface
//!
//! Clones share state, so a test can keep one clone to steer the device after
//! handing another to the code under test.

use crate::error::{DeviceError, SekeyResult};
use crate::model::fixtures::random_signing_key;
use crate::model::Secp256r1PublicKey;
use crate::ports::SecureElement;
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct MockState {
    public_key: Result<Vec<u8>, DeviceError>,
    sign_failure: Option<DeviceError>,
    public_key_reads: usize,
    sign_calls: usize,
}

#[derive(Debug, Clone)]
pub struct MockElement {
    signing_key: SigningKey,
    state: Arc<Mutex<MockState>>,
}

impl MockElement {
    pub fn new() -> Self {
        Self::with_signing_key(random_signing_key())
    }

    pub fn with_signing_key(signing_key: SigningKey) -> Self {
        let public_key = Secp256r1PublicKey::from(signing_key.verifying_key());
        Self {
            signing_key,
            state: Arc::new(Mutex::new(MockState {
                public_key: Ok(public_key.as_bytes().to_vec()),
                sign_failure: None,
                public_key_reads: 0,
                sign_calls: 0,
            })),
        }
    }

    /// Public key of the key this mock signs with
    pub fn expected_public_key(&self) -> Secp256r1PublicKey {
        Secp256r1PublicKey::from(self.signing_key.verifying_key())
    }

    /// Make the device report different public key bytes from now on
    pub fn set_public_key(&self, public_key: Vec<u8>) {
        self.state.lock().unwrap().public_key = Ok(public_key);
    }

    pub fn fail_public_key(&self, error: DeviceError) {
        self.state.lock().unwrap().public_key = Err(error);
    }

    pub fn fail_sign(&self, error: DeviceError) {
        self.state.lock().unwrap().sign_failure = Some(error);
    }

    pub fn public_key_reads(&self) -> usize {
        self.state.lock().unwrap().public_key_reads
    }

    pub fn sign_calls(&self) -> usize {
        self.state.lock().unwrap().sign_calls
    }
}

impl SecureElement for MockElement {
    fn public_key(&mut self) -> SekeyResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.public_key_reads += 1;
        Ok(state.public_key.clone()?)
    }

    fn sign(&mut self, message: &[u8]) -> SekeyResult<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        state.sign_calls += 1;
        if let Some(error) = state.sign_failure.clone() {
            return Err(error.into());
        }

        let signature: Signature = self.signing_key.sign(message);
        Ok(signature.to_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract_tests_for;
    use crate::ports::contract_tests::secure_element_contract;

    contract_tests_for!(
        mock_element_contract,
        make = MockElement::new,
        tests = {
            test_public_key_is_uncompressed_point => secure_element_contract::test_public_key_is_uncompressed_point,
            test_public_key_is_stable => secure_element_contract::test_public_key_is_stable,
            test_sign_success => secure_element_contract::test_sign_success,
            test_sign_keeps_public_key => secure_element_contract::test_sign_keeps_public_key,
        }
    );

    #[test]
    fn test_clones_share_state() {
        let control = MockElement::new();
        let mut device = control.clone();

        control.fail_public_key(DeviceError::NotFound);
        assert!(device.public_key().is_err());
        assert_eq!(control.public_key_reads(), 1);
    }
}
