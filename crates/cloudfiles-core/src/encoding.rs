//! Serde helpers for the JSON wire form.
//!
//! File bytes travel as standard base64 strings, the same shape clients
//! produce when they JSON-encode a byte array.

/// `#[serde(with = "base64_bytes")]` for [`bytes::Bytes`] fields.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &Bytes, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Bytes, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map(Bytes::from)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Blob {
        #[serde(with = "super::base64_bytes")]
        data: Bytes,
    }

    #[test]
    fn test_encodes_as_base64() {
        let blob = Blob {
            data: Bytes::from_static(b"hello"),
        };
        let json = serde_json::to_string(&blob).unwrap();
        assert_eq!(json, r#"{"data":"aGVsbG8="}"#);
    }

    #[test]
    fn test_null_decodes_as_empty() {
        let blob: Blob = serde_json::from_str(r#"{"data":null}"#).unwrap();
        assert!(blob.data.is_empty());
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(serde_json::from_str::<Blob>(r#"{"data":"***"}"#).is_err());
    }
}
