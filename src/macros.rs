//! Declarative helpers for registering records and building value maps.

/// Implements [`Record`](crate::mapper::Record) for a struct with plain fields.
///
/// Every listed field must implement [`ToValue`](crate::types::ToValue) and
/// [`FromValue`](crate::types::FromValue). Unlisted fields are never bound or
/// read. `field => "column"` overrides the column name.
///
/// ```
/// #[derive(Debug, Default)]
/// struct Person {
///     first_name: String,
///     last_name: String,
///     email: Vec<String>,
/// }
///
/// cqlx::record!(Person { first_name, last_name, email => "emails" });
/// ```
#[macro_export]
macro_rules! record {
    (@def $field:ident) => {
        $crate::mapper::FieldDef::new(stringify!($field))
    };
    (@def $field:ident => $column:literal) => {
        $crate::mapper::FieldDef::new(stringify!($field)).rename($column)
    };
    ($ty:ty { $($field:ident $(=> $column:literal)?),* $(,)? }) => {
        impl $crate::mapper::Fields for $ty {
            fn field(&self, ident: &str) -> ::std::option::Option<$crate::types::Value> {
                match ident {
                    $(stringify!($field) => ::std::option::Option::Some(
                        $crate::types::ToValue::to_value(&self.$field),
                    ),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn set_field(
                &mut self,
                ident: &str,
                value: $crate::types::Value,
            ) -> ::std::result::Result<(), $crate::types::ValueTypeError> {
                match ident {
                    $(stringify!($field) => {
                        self.$field = $crate::types::FromValue::from_value(value)?;
                    })*
                    _ => {}
                }
                ::std::result::Result::Ok(())
            }
        }

        impl $crate::mapper::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::mapper::FieldDef> {
                ::std::vec![$($crate::record!(@def $field $(=> $column)?)),*]
            }
        }
    };
}

/// Builds a [`ValueMap`](crate::binder::ValueMap) from `column => value` pairs.
///
/// ```
/// let map = cqlx::values! { "first_name" => "Patricia", "age" => 42 };
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! values {
    () => {
        $crate::binder::ValueMap::new()
    };
    ($($column:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::binder::ValueMap::new();
        $(
            map.insert(
                ::std::string::String::from($column),
                $crate::types::ToValue::to_value(&$value),
            );
        )+
        map
    }};
}

#[cfg(test)]
mod tests {
    use crate::mapper::{Fields, Mapping};
    use crate::types::Value;

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        user_id: i64,
        display_name: Option<String>,
    }

    crate::record!(Account { user_id, display_name => "name" });

    #[test]
    fn test_record_macro_mapping() {
        let mapping = Mapping::build::<Account>().unwrap();
        assert_eq!(mapping.columns().collect::<Vec<_>>(), vec!["user_id", "name"]);
    }

    #[test]
    fn test_record_macro_access() {
        let mut account = Account::default();
        account.set_field("user_id", Value::BigInt(9)).unwrap();
        assert_eq!(account.user_id, 9);
        assert_eq!(account.field("display_name"), Some(Value::Null));
        assert_eq!(account.field("missing"), None);
    }

    #[test]
    fn test_values_macro() {
        let map = crate::values! { "a" => 1i32, "b" => "x" };
        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(map.get("b"), Some(&Value::Text("x".into())));
        assert!(crate::values! {}.is_empty());
    }
}
