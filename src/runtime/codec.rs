//! Strict single-document YAML decoding.

use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;
use serde_yaml::Value;

use crate::runtime::error::LoadError;

/// Decode exactly one YAML document into `T`.
///
/// Strict regardless of how `T` is declared: a mapping key repeated at any
/// level, or a field `T` does not know, fails with [`LoadError::Decode`].
/// Input without any document (or a null one) decodes to `T::default()`. A
/// second document, even an empty `---`, fails the whole load with
/// [`LoadError::MultipleDocuments`].
pub fn decode_single_document<T>(raw: &[u8]) -> Result<T, LoadError>
where
    T: DeserializeOwned + Default,
{
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let mut documents = serde_yaml::Deserializer::from_slice(raw);

    // Going through Value rejects duplicate keys before T sees the document.
    let tree = match documents.next() {
        Some(document) => Value::deserialize(document)?,
        None => return Ok(T::default()),
    };

    if documents.next().is_some() {
        return Err(LoadError::MultipleDocuments);
    }

    if tree.is_null() {
        return Ok(T::default());
    }

    let mut ignored = Vec::new();
    let value = serde_ignored::deserialize(tree, |path| ignored.push(path.to_string()))?;

    if let Some(path) = ignored.first() {
        let path = path.trim_start_matches('.');
        return Err(LoadError::Decode(serde_yaml::Error::custom(format!(
            "unknown field `{path}`"
        ))));
    }

    Ok(value)
}
