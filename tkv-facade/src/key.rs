//! # Store Keys
//!
//! A key is any ordered value with a stable byte encoding. Strings and byte
//! buffers encode as themselves; integers encode as decimal text so they
//! line up with keys written by other Redis clients.
//!
//! `Option::None` is the only missing key. An empty string or byte buffer is
//! an ordinary key, as it is for the store itself.

use std::borrow::Cow;
use std::fmt;

/// A key usable with the facade.
pub trait StoreKey: Ord + fmt::Debug {
    /// Returns the bytes sent to the store for this key.
    fn key_bytes(&self) -> Cow<'_, [u8]>;

    /// Returns true when there is no key at all.
    fn is_null(&self) -> bool {
        false
    }
}

impl StoreKey for str {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl StoreKey for String {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl StoreKey for [u8] {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl StoreKey for Vec<u8> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_slice())
    }
}

impl<T: StoreKey + ?Sized> StoreKey for &T {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        (**self).key_bytes()
    }

    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<T: StoreKey> StoreKey for Option<T> {
    fn key_bytes(&self) -> Cow<'_, [u8]> {
        match self {
            Some(key) => key.key_bytes(),
            None => Cow::Borrowed(&[]),
        }
    }

    fn is_null(&self) -> bool {
        self.as_ref().map_or(true, StoreKey::is_null)
    }
}

macro_rules! integer_keys {
    ($($ty:ty),*) => {
        $(
            impl StoreKey for $ty {
                fn key_bytes(&self) -> Cow<'_, [u8]> {
                    Cow::Owned(self.to_string().into_bytes())
                }
            }
        )*
    };
}

integer_keys!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_keys_encode_verbatim() {
        assert_eq!(&*"user:1".key_bytes(), b"user:1");
        assert_eq!(&*String::from("user:1").key_bytes(), b"user:1");
        assert_eq!(&*b"raw".to_vec().key_bytes(), b"raw");
    }

    #[test]
    fn integer_keys_encode_as_decimal() {
        assert_eq!(&*42u64.key_bytes(), b"42");
        assert_eq!(&*(-7i32).key_bytes(), b"-7");
    }

    #[test]
    fn only_none_is_null() {
        let missing: Option<String> = None;
        assert!(missing.is_null());
        assert!(!Some(9u8).is_null());
        assert_eq!(&*Some(9u8).key_bytes(), b"9");
        assert!(!"".is_null());
        assert!(!Vec::<u8>::new().is_null());
        assert!(Some(String::new()).key_bytes().is_empty());
    }
}
