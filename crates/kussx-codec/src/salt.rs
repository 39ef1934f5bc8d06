use rand::RngCore;

const GENERATED_SALT_BYTES: usize = 16;

/// Secret material parameterizing the key codec.
///
/// Keys only decode back to their counter under the salt that encoded them,
/// so a salt that is not persisted by configuration is lost on restart.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(Vec<u8>);

impl Salt {
    /// Draws a fresh salt from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; GENERATED_SALT_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes).into_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<String> for Salt {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for Salt {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for Salt {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Salt").field(&"<redacted>").finish()
    }
}
