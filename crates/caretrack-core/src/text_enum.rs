//! `text_enum!` generates the string mapping for enums stored in `TEXT`
//! columns guarded by a `CHECK (... IN (...))` constraint.
//!
//! The generated `as_str` values must stay in sync with the serde
//! `rename_all` attribute on the enum and with the schema DDL.

macro_rules! text_enum {
  ($ty:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
    impl $ty {
      /// Every variant, in declaration order.
      pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

      /// The value stored in the database column.
      pub fn as_str(self) -> &'static str {
        match self {
          $($ty::$variant => $text),+
        }
      }
    }

    impl std::fmt::Display for $ty {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl std::str::FromStr for $ty {
      type Err = $crate::Error;

      fn from_str(s: &str) -> $crate::Result<Self> {
        match s {
          $($text => Ok($ty::$variant),)+
          other => Err($crate::Error::UnknownVariant {
            kind:  $kind,
            value: other.to_owned(),
          }),
        }
      }
    }
  };
}

pub(crate) use text_enum;
