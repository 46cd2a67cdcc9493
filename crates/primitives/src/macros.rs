/// Generates impls for newtypes over an owned byte string.
///
/// This must be a newtype a la `struct Foo(Vec<u8>);`. The wrapper is
/// displayed as lowercase hex.
macro_rules! impl_opaque_bytes_wrapper {
    ($target:ident) => {
        impl $target {
            pub fn new(v: Vec<u8>) -> Self {
                Self(v)
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }

            pub fn into_inner(self) -> Vec<u8> {
                self.0
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::std::convert::From<Vec<u8>> for $target {
            fn from(value: Vec<u8>) -> Self {
                Self(value)
            }
        }

        impl ::std::convert::From<&[u8]> for $target {
            fn from(value: &[u8]) -> Self {
                Self(value.to_vec())
            }
        }

        impl ::std::convert::From<&str> for $target {
            fn from(value: &str) -> Self {
                Self(value.as_bytes().to_vec())
            }
        }

        impl ::std::convert::From<$target> for Vec<u8> {
            fn from(value: $target) -> Vec<u8> {
                value.0
            }
        }

        impl ::std::convert::AsRef<[u8]> for $target {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl ::core::fmt::Debug for $target {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}({})", stringify!($target), ::hex::encode(&self.0))
            }
        }

        impl ::core::fmt::Display for $target {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&::hex::encode(&self.0))
            }
        }
    };
}
