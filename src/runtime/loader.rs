//! The extension point embedding components implement.

use crate::runtime::error::LoadError;

/// Turns one raw configuration document into a typed snapshot.
///
/// Implementations decode (usually with
/// [`decode_single_document`](crate::runtime::codec::decode_single_document))
/// and run whatever semantic validation the embedding process requires.
/// A returned error fails the whole load; nothing is partially applied.
pub trait Loader<T>: Send + Sync {
    fn load(&self, raw: &[u8]) -> Result<T, LoadError>;
}

impl<T, F> Loader<T> for F
where
    F: Fn(&[u8]) -> Result<T, LoadError> + Send + Sync,
{
    fn load(&self, raw: &[u8]) -> Result<T, LoadError> {
        self(raw)
    }
}
