/// Declares a CRD object: a serde struct whose fields are all optional, and a `ToAttribute`
/// impl that describes the same fields as a nested object attribute. Each field names its
/// json property; the attribute name is the rust field name. Doc comments on fields become
/// attribute descriptions.
///
/// ```ignore
/// schema_object! {
///     /// TLS settings
///     pub struct TlsConfig {
///         /// Disable target certificate validation.
///         insecure_skip_verify: bool => "insecureSkipVerify",
///         server_name: String => "serverName",
///     }
/// }
/// ```
macro_rules! schema_object {
    (
        $(#[doc = $struct_doc:literal])*
        pub struct $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $field:ident : $ty:ty => $json:literal
            ),* $(,)?
        }
    ) => {
        $(#[doc = $struct_doc])*
        #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
        pub struct $name {
            $(
                $(#[doc = $doc])*
                #[serde(rename = $json, default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
        }

        impl $crate::schema::ToAttribute for $name {
            fn attribute_type() -> $crate::schema::AttributeType {
                $crate::schema::AttributeType::Object(vec![
                    $(
                        $crate::schema::Attribute::computed(
                            stringify!($field),
                            <$ty as $crate::schema::ToAttribute>::attribute_type(),
                        )
                        .with_json_name($json)
                        .with_description(concat!($($doc),*)),
                    )*
                ])
            }
        }
    };
}

/// Implements `ToAttribute` for types whose values are kept in state as raw json
macro_rules! dynamic_attributes {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::schema::ToAttribute for $ty {
                fn attribute_type() -> $crate::schema::AttributeType {
                    $crate::schema::AttributeType::Dynamic
                }
            }
        )*
    };
}
