use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, OnceLock, PoisonError};

/// Looks up (or computes and stores) a per-type value in a process-wide cache.
///
/// Statics inside generic trait methods are shared by every implementor, so
/// entries are keyed by `TypeId`.
fn cached<V: Copy>(
    cache: &'static OnceLock<Mutex<HashMap<TypeId, V>>>,
    type_id: TypeId,
    compute: impl FnOnce() -> V,
) -> V {
    let cache = cache.get_or_init(|| Mutex::new(HashMap::new()));
    let mut guard = cache.lock().unwrap_or_else(PoisonError::into_inner);
    *guard.entry(type_id).or_insert_with(compute)
}

/// FNV-1a, stable across builds and toolchains so that independently
/// compiled clients and servers agree on hashes.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .iter()
        .fold(OFFSET, |hash, byte| (hash ^ u64::from(*byte)).wrapping_mul(PRIME))
}

/// Message that can travel over the remoting endpoint.
///
/// Automatically implemented for every
/// `Serialize + DeserializeOwned + Send + Sync + 'static` type.
///
/// ## Example
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use sitelet_common::SiteletMessage;
///
/// #[derive(Serialize, Deserialize)]
/// struct Ping;
///
/// assert_eq!(Ping::short_name(), "Ping");
/// ```
pub trait SiteletMessage: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Full type name, including the module path.
    fn type_name() -> &'static str {
        static CACHE: OnceLock<Mutex<HashMap<TypeId, &'static str>>> = OnceLock::new();
        cached(&CACHE, TypeId::of::<Self>(), || std::any::type_name::<Self>())
    }

    /// Type name without the module path.
    ///
    /// Example: `"ReverseString"` (from `"sitelet_common::api::ReverseString"`)
    fn short_name() -> &'static str {
        static CACHE: OnceLock<Mutex<HashMap<TypeId, &'static str>>> = OnceLock::new();
        cached(&CACHE, TypeId::of::<Self>(), || {
            let full_name = Self::type_name();
            full_name.rsplit("::").next().unwrap_or(full_name)
        })
    }

    /// Hash of the short type name.
    ///
    /// Two types with the same short name share a hash; the server refuses
    /// to register both.
    fn schema_hash() -> u64 {
        static CACHE: OnceLock<Mutex<HashMap<TypeId, u64>>> = OnceLock::new();
        cached(&CACHE, TypeId::of::<Self>(), || {
            fnv1a(Self::short_name().as_bytes())
        })
    }
}

impl<T> SiteletMessage for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Marks a type as a request with an associated response type.
///
/// # Example
///
/// ```rust
/// use serde::{Serialize, Deserialize};
/// use sitelet_common::RequestMessage;
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// struct Echo(String);
///
/// impl RequestMessage for Echo {
///     type ResponseMessage = String;
/// }
///
/// assert_eq!(Echo::request_name(), "Echo");
/// ```
pub trait RequestMessage: SiteletMessage + Clone + Debug {
    /// The response type for the request.
    type ResponseMessage: SiteletMessage + Clone + Debug;

    /// Request name, derived from the short type name.
    fn request_name() -> &'static str {
        Self::short_name()
    }
}

/// Reply sent instead of a response when the server could not serve a request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RemoteFault {
    /// Human readable reason.
    pub message: String,
}

impl RemoteFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct MessageA {
        data: String,
    }

    #[derive(Serialize, Deserialize)]
    struct MessageB {
        data: String,
    }

    #[test]
    fn test_short_name_strips_module_path() {
        assert!(MessageA::type_name().ends_with("::MessageA"));
        assert_eq!(MessageA::short_name(), "MessageA");
    }

    #[test]
    fn test_schema_hash_is_cached_and_distinct() {
        let hash_a1 = MessageA::schema_hash();
        let hash_a2 = MessageA::schema_hash();
        let hash_b = MessageB::schema_hash();

        assert_eq!(hash_a1, hash_a2);
        assert_ne!(hash_a1, hash_b);
    }

    #[test]
    fn test_schema_hash_depends_only_on_short_name() {
        mod module1 {
            use serde::{Deserialize, Serialize};
            #[derive(Serialize, Deserialize)]
            pub struct UserMessage {
                pub message: String,
            }
        }

        mod module2 {
            use serde::{Deserialize, Serialize};
            #[derive(Serialize, Deserialize)]
            pub struct UserMessage {
                pub user_id: u32,
            }
        }

        assert_eq!(
            module1::UserMessage::schema_hash(),
            module2::UserMessage::schema_hash()
        );
        assert_ne!(
            module1::UserMessage::type_name(),
            module2::UserMessage::type_name()
        );
    }

    #[test]
    fn test_schema_hash_is_fnv1a_of_short_name() {
        // Reference value for FNV-1a 64 of "a".
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(MessageA::schema_hash(), fnv1a(b"MessageA"));
    }

    #[test]
    fn test_request_name_matches_short_name() {
        #[derive(Clone, Debug, Serialize, Deserialize)]
        struct ListPages;

        impl RequestMessage for ListPages {
            type ResponseMessage = Vec<String>;
        }

        assert_eq!(ListPages::request_name(), "ListPages");
    }
}
