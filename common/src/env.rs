pub fn get_env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok()?;

    let parsed = value
        .parse::<usize>()
        .unwrap_or_else(|_| panic!("{} must be a valid number", key));

    Some(parsed)
}
