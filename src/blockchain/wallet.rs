//! Source wallet and transaction signing.
//!
//! # Security
//! - The seed phrase is loaded from configuration or the environment only
//! - Seeds and sub-seeds are never logged or serialized
//! - Derived secrets are zeroized when dropped

use crate::blockchain::identity::{IdentityScheme, PublicKey, QubicScheme, SeedPhrase, Signature};
use crate::blockchain::types::{PipelineError, PipelineResult};

/// Signs digests for a source identity using an [`IdentityScheme`].
#[derive(Debug, Clone, Default)]
pub struct Signer<S = QubicScheme> {
    scheme: S,
}

impl<S: IdentityScheme> Signer<S> {
    pub fn new(scheme: S) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Sign a 32-byte digest with the key derived from `seed`.
    ///
    /// Fails with [`PipelineError::Signing`] on a malformed seed, a public key
    /// that is not a curve point, or a digest of the wrong length.
    pub fn sign(
        &self,
        seed: &SeedPhrase,
        public_key: &PublicKey,
        digest: &[u8],
    ) -> PipelineResult<Signature> {
        let digest: &[u8; 32] = digest.try_into().map_err(|_| {
            PipelineError::Signing(format!("digest must be 32 bytes, got {}", digest.len()))
        })?;

        let sub_seed = self
            .scheme
            .derive_sub_seed(seed)
            .map_err(|e| PipelineError::Signing(e.to_string()))?;

        self.scheme
            .sign(&sub_seed, public_key, digest)
            .map_err(|e| PipelineError::Signing(e.to_string()))
    }

    pub fn verify(&self, public_key: &PublicKey, digest: &[u8; 32], signature: &Signature) -> bool {
        self.scheme.verify(public_key, digest, signature)
    }
}

/// Seed phrase paired with the public key it derives.
pub struct Wallet {
    seed: SeedPhrase,
    source: PublicKey,
    identity: String,
}

impl Wallet {
    /// Derive the source identity from a seed phrase.
    pub fn from_seed<S: IdentityScheme + ?Sized>(
        scheme: &S,
        seed: SeedPhrase,
    ) -> PipelineResult<Self> {
        let source = scheme
            .public_key_from_seed(&seed)
            .map_err(|e| PipelineError::Signing(e.to_string()))?;
        let identity = scheme.encode_identity(&source);
        Ok(Self {
            seed,
            source,
            identity,
        })
    }

    /// Build a wallet and check that `seed` derives `identity`.
    pub fn from_parts<S: IdentityScheme + ?Sized>(
        scheme: &S,
        seed: SeedPhrase,
        identity: &str,
    ) -> PipelineResult<Self> {
        let expected = scheme
            .decode_identity(identity)
            .map_err(|e| PipelineError::Signing(format!("source identity: {}", e)))?;

        let wallet = Self::from_seed(scheme, seed)?;
        if wallet.source != expected {
            return Err(PipelineError::Signing(
                "seed does not derive the configured source identity".into(),
            ));
        }

        tracing::info!(source = %wallet.identity, "Wallet initialized");
        Ok(wallet)
    }

    pub fn seed(&self) -> &SeedPhrase {
        &self.seed
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.source
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("identity", &self.identity)
            .field("seed", &self.seed)
            .finish()
    }
}
