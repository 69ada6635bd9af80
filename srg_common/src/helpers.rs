/// Interpret an optional string as a boolean flag. Unset values and unrecognised
/// spellings resolve to `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    value.map_or(default, |v| match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    })
}
