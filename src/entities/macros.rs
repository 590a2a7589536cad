//! Macros for reducing boilerplate when defining entities

/// Implement [`Entity`](crate::core::entity::Entity) for a serde struct
///
/// The struct must have a `pub id: String` field and its serde field names
/// must match the schema keys. The schema is built once and cached.
///
/// # Example
/// ```rust,ignore
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Token {
///     pub id: String,
///     pub token: String,
/// }
///
/// impl_entity!(Token, "tokens", {
///     "id" => FieldSpec::required(FieldType::String),
///     "token" => FieldSpec::required(FieldType::String),
/// });
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ident, $collection:expr, { $($field:literal => $spec:expr),* $(,)? }) => {
        impl $crate::core::entity::Entity for $type {
            const COLLECTION: &'static str = $collection;

            fn schema() -> &'static $crate::core::field::FieldSchema {
                static SCHEMA: ::std::sync::OnceLock<$crate::core::field::FieldSchema> =
                    ::std::sync::OnceLock::new();
                SCHEMA.get_or_init(|| {
                    $crate::core::field::FieldSchema::new([$(($field, $spec)),*])
                })
            }
        }
    };
}
