//! Defines helper macros for generating domain port error enums.
//!
//! Each variant becomes a `thiserror` variant with the given message and a
//! snake_case constructor whose field parameters accept `impl Into<T>`.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    define_port_error! {
        pub enum SampleLedgerError {
            Closed => "ledger closed",
            Connection { message: String } => "ledger connection failed: {message}",
            Rejected { status: u16 } => "ledger rejected with {status}",
            Detailed { status: u16, description: String } => "{status}: {description}",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(SampleLedgerError::closed(), SampleLedgerError::Closed);
        assert_eq!(SampleLedgerError::closed().to_string(), "ledger closed");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = SampleLedgerError::connection("refused");
        assert_eq!(err.to_string(), "ledger connection failed: refused");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = SampleLedgerError::rejected(503_u16);
        assert_eq!(err.to_string(), "ledger rejected with 503");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = SampleLedgerError::detailed(400_u16, "bad amount");
        assert_eq!(err.to_string(), "400: bad amount");
    }
}
