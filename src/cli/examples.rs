// Canned example queries offered by the console

/// Starter queries shown by /examples and /help.
pub const EXAMPLE_QUERIES: &[&str] = &[
    "SELECT * FROM users;",
    "CREATE users SET name = \"John Doe\", age = 30;",
    "UPDATE users SET age = 31 WHERE name = \"John Doe\";",
    "DELETE users WHERE name = \"John Doe\";",
    "INFO FOR DB;",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_examples_are_terminated_statements() {
        for example in EXAMPLE_QUERIES {
            assert!(example.ends_with(';'), "unterminated example: {}", example);
        }
    }
}
