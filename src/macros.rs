//! The [`cbor!`](crate::cbor) macro for building [`CborValue`](crate::CborValue)
//! trees with literal syntax.

/// Builds a [`CborValue`](crate::CborValue) from JSON-like literal syntax.
///
/// Map keys may be string or integer literals, matching CBOR's keyed-map
/// conventions.
///
/// # Examples
///
/// ```rust
/// use cbor_codec::cbor;
///
/// let claims = cbor!({
///     1: "coap://as.example.com",
///     2: "erikw",
///     "scopes": ["read", "write"],
///     "active": true,
/// });
/// assert!(claims.is_map());
/// ```
#[macro_export]
macro_rules! cbor {
    // Handle null
    (null) => {
        $crate::CborValue::Null
    };

    // Handle true
    (true) => {
        $crate::CborValue::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::CborValue::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::CborValue::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::CborValue::Array(vec![$($crate::cbor!($elem)),*])
    };

    // Handle empty map
    ({}) => {
        $crate::CborValue::Map($crate::CborMap::new())
    };

    // Handle non-empty map
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::CborMap::new();
        $(
            map.insert($crate::Key::from($key), $crate::cbor!($value));
        )*
        $crate::CborValue::Map(map)
    }};

    // Fallback for any other expression
    ($other:expr) => {
        $crate::to_value(&$other).unwrap_or($crate::CborValue::Null)
    };
}

#[cfg(test)]
mod tests {
    use crate::{CborMap, CborValue, Key};

    #[test]
    fn cbor_macro_primitives() {
        assert_eq!(cbor!(null), CborValue::Null);
        assert_eq!(cbor!(true), CborValue::Bool(true));
        assert_eq!(cbor!(false), CborValue::Bool(false));
        assert_eq!(cbor!(42), CborValue::Integer(42));
        assert_eq!(cbor!(3.5), CborValue::Float(3.5));
        assert_eq!(cbor!("hello"), CborValue::Text("hello".to_string()));
    }

    #[test]
    fn cbor_macro_arrays() {
        assert_eq!(cbor!([]), CborValue::Array(vec![]));

        let arr = cbor!([1, 2, 3]);
        match arr {
            CborValue::Array(vec) => {
                assert_eq!(vec.len(), 3);
                assert_eq!(vec[0], CborValue::Integer(1));
                assert_eq!(vec[2], CborValue::Integer(3));
            }
            _ => panic!("expected array"),
        }
    }

    #[test]
    fn cbor_macro_maps() {
        assert_eq!(cbor!({}), CborValue::Map(CborMap::new()));

        let obj = cbor!({
            "name": "Alice",
            1: 30
        });

        match obj {
            CborValue::Map(map) => {
                assert_eq!(map.len(), 2);
                assert_eq!(
                    map.get(&Key::from("name")),
                    Some(&CborValue::Text("Alice".to_string()))
                );
                assert_eq!(map.get(&Key::from(1)), Some(&CborValue::Integer(30)));
            }
            _ => panic!("expected map"),
        }
    }

    #[test]
    fn cbor_macro_nesting() {
        let value = cbor!({
            "items": [1, [2, 3], {"inner": null}]
        });
        let map = value.as_map().unwrap();
        let items = map.get_text("items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 3);
    }
}
