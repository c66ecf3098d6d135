use heck::ToSnakeCase;

/// Converts an identifier to `snake_case`.
///
/// Runs of capitals are kept together, so `HTTPResponse` becomes
/// `http_response` and `UserID` becomes `user_id`.
pub fn snake_case(src: &str) -> String {
    src.to_snake_case()
}

/// Pluralizes the last word of a `snake_case` identifier.
pub fn pluralize(src: &str) -> String {
    match src.rsplit_once('_') {
        Some((head, last)) => format!("{head}_{}", pluralizer::pluralize(last, 2, false)),
        None => pluralizer::pluralize(src, 2, false),
    }
}

/// Derives a table name from a type name.
pub fn table_name(type_name: &str, singular: bool) -> String {
    let snake = snake_case(type_name);

    if singular {
        snake
    } else {
        pluralize(&snake)
    }
}
