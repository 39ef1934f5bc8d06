use crate::error::CodecError;
use crate::salt::Salt;
use harsh::Harsh;
use kussx_core::ShortKey;
use typed_builder::TypedBuilder;

/// Configures a [`KeyCodec`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct CodecSettings {
    #[builder(setter(into))]
    pub salt: Salt,
    /// Keys are padded up to this many characters. `0` yields the shortest
    /// possible keys.
    #[builder(default = 0)]
    pub min_length: usize,
}

/// A salted bijection between non-negative integers and short alphanumeric
/// keys (Hashids).
///
/// The salt makes the mapping unpredictable from the outside: consecutive
/// counter values produce unrelated-looking keys.
#[derive(Debug, Clone)]
pub struct KeyCodec {
    harsh: Harsh,
}

impl KeyCodec {
    pub fn new(settings: CodecSettings) -> Result<Self, CodecError> {
        let harsh = Harsh::builder()
            .salt(settings.salt.as_bytes().to_vec())
            .length(settings.min_length)
            .build()
            .map_err(|err| CodecError::InvalidConfig(err.to_string()))?;
        Ok(Self { harsh })
    }

    /// Shorthand for a codec with default settings and the given salt.
    pub fn with_salt(salt: impl Into<Salt>) -> Result<Self, CodecError> {
        Self::new(CodecSettings::builder().salt(salt).build())
    }

    /// Encodes `value` into its key. Deterministic for a fixed salt.
    pub fn encode(&self, value: u64) -> ShortKey {
        ShortKey::new_unchecked(self.harsh.encode(&[value]))
    }

    /// Recovers the value `key` was encoded from.
    pub fn decode(&self, key: &str) -> Result<u64, CodecError> {
        let malformed = |reason: String| CodecError::MalformedKey {
            key: key.to_string(),
            reason,
        };

        let values = self
            .harsh
            .decode(key)
            .map_err(|err| malformed(err.to_string()))?;

        let [value] = values.as_slice() else {
            return Err(malformed(format!(
                "expected a single value, found {}",
                values.len()
            )));
        };

        // Hashids decoding is lenient; only canonical keys round-trip.
        if self.harsh.encode(&[*value]) != key {
            return Err(malformed("not produced under this salt".to_string()));
        }

        Ok(*value)
    }
}
